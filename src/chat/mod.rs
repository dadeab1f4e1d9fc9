// ABOUTME: Chat message ingest: per-room dispatch and the translate/persist/broadcast pipeline
// ABOUTME: Re-exports the orchestrator, its report types, and the room dispatcher
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Chat Ingest
//!
//! An inbound message moves through these stages, in order:
//!
//! 1. translate with the room's history as context (falls back on failure)
//! 2. persist the original text (failure is logged and rolled back)
//! 3. record the turn in history
//! 4. broadcast the translation to every other room member
//!
//! [`RoomDispatcher`] runs at most one ingest per room at a time.

mod dispatcher;
mod orchestrator;

pub use dispatcher::RoomDispatcher;
pub use orchestrator::{IngestReport, MessageIngestOrchestrator, PersistOutcome};

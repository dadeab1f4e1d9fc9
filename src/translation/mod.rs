// ABOUTME: Context-aware translation pipeline for chat messages
// ABOUTME: Bundles history buffers, anchor selection, prompt building, and the translator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Translation
//!
//! Each chat message is translated with a window of recent conversation as
//! context. The most recent turn from a different speaker is the *anchor*:
//! the model is asked to keep its translation consistent with it.

/// Anchor selection
pub mod context;
/// Bounded history buffers
pub mod history;
/// Prompt construction
pub mod prompt;
/// Provider-backed translator
pub mod translator;

pub use context::select_anchor;
pub use history::{ConversationTurn, HistoryBuffer, HistoryStore};
pub use prompt::TranslationRequest;
pub use translator::{TranslationOutcome, Translator};

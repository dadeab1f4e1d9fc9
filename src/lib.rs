// ABOUTME: Main library entry point for the Parley chat relay
// ABOUTME: Room-based WebSocket chat with context-aware LLM translation and SQLite persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Parley Server
//!
//! Relays chat messages between users grouped into rooms, translating each
//! message into the receiver's language before delivery. A sliding window of
//! recent conversation is sent to the model as context.
//!
//! ## Architecture
//!
//! - **Translation**: bounded history, anchor selection, prompt building, and a
//!   translator that never fails (it falls back to a fixed string)
//! - **Rooms**: connection membership and event fan-out
//! - **Chat**: the ingest pipeline and the per-room dispatcher that serializes it
//! - **Database**: `SQLite` message store with transactional appends
//! - **LLM**: provider trait and the Gemini implementation
//! - **Routes / WebSocket**: axum HTTP surface and socket event loop
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use parley_server::config::ServerConfig;
//! use parley_server::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Parley configured on {}", config.bind_address());
//!     Ok(())
//! }
//! ```

/// Chat ingest pipeline and per-room dispatch
pub mod chat;

/// Environment-driven configuration
pub mod config;

/// Protocol event names and defaults
pub mod constants;

/// `SQLite` room and message storage
pub mod database;

/// Unified error handling
pub mod errors;

/// LLM provider abstraction and Gemini client
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Socket wire protocol
pub mod protocol;

/// Room membership and broadcast
pub mod rooms;

/// HTTP routes
pub mod routes;

/// Server assembly and startup
pub mod server;

/// Context-aware translation
pub mod translation;

/// `WebSocket` connection handling
pub mod websocket;

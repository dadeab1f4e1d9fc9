// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Re-exports the environment-driven server, LLM, and translation configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for Parley Server
//!
//! All settings come from environment variables; see [`environment::ServerConfig::from_env`].

/// Environment and server configuration
pub mod environment;

pub use environment::{
    DatabaseConfig, Environment, HistoryScope, LlmConfig, RoomConfig, ServerConfig,
    TranslationConfig,
};

// ABOUTME: Application constants grouped by domain (protocol events, translation, server defaults)
// ABOUTME: Single source for wire event names, fallback text, and environment defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Hardcoded values that define the wire protocol and the defaults used when
//! an environment variable is absent.

/// Socket event names exchanged with clients
pub mod events {
    /// Inbound: join a room
    pub const JOIN_CHAT: &str = "join-chat";
    /// Inbound: leave a room
    pub const LEAVE_CHAT: &str = "leave-chat";
    /// Inbound: send a chat message to a room
    pub const OUTGOING: &str = "outgoing";
    /// Outbound: room presence announcement
    pub const JOINED_CHAT: &str = "joined-chat";
    /// Outbound: translated chat message
    pub const MESSAGE: &str = "message";
    /// Outbound: request rejected
    pub const ERROR: &str = "error";
}

/// Translation pipeline constants
pub mod translation {
    /// Number of turns kept in a history buffer
    pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

    /// Target language when the client does not send one
    pub const DEFAULT_LANGUAGE: &str = "en";

    /// Text delivered in place of a translation when the provider call fails
    pub const FALLBACK_TEXT: &str = "Translation error occurred.";

    /// Anchor block used when no peer has spoken yet
    pub const NO_CONTEXT_PLACEHOLDER: &str = "No previous context.";
}

/// LLM provider defaults
pub mod llm {
    /// Gemini REST API base URL
    pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Model used for translations
    pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

    /// Sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 1.0;

    /// Nucleus sampling probability
    pub const DEFAULT_TOP_P: f32 = 0.95;

    /// Top-k sampling
    pub const DEFAULT_TOP_K: u32 = 64;

    /// Upper bound on generated tokens
    pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

    /// MIME type requested from the model
    pub const RESPONSE_MIME_TYPE: &str = "text/plain";

    /// HTTP request timeout for provider calls
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
}

/// Server defaults
pub mod server {
    /// Bind address
    pub const DEFAULT_HOST: &str = "0.0.0.0";

    /// HTTP/WebSocket port
    pub const DEFAULT_HTTP_PORT: u16 = 5000;

    /// SQLite database location
    pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/parley.db";

    /// Service name used in logs and health responses
    pub const SERVICE_NAME: &str = "parley-server";
}

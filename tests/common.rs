// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, in-memory databases, a scripted LLM provider, and message builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `parley_server`

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use anyhow::Result;
use async_trait::async_trait;
use parley_server::{
    config::ServerConfig,
    database::{ChatMessageRecord, Database, MessageStore, NewChatMessage, RoomRecord},
    errors::{AppError, AppResult},
    llm::{ChatRequest, ChatResponse, LlmProvider},
    protocol::InboundMessage,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Arc::new(Database::new("sqlite::memory:").await?);
    Ok(database)
}

/// Configuration suitable for tests (API key set, defaults otherwise)
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.llm.api_key = Some("test-key".to_owned());
    config.host = "127.0.0.1".to_owned();
    config
}

/// Build a validated inbound message
pub fn inbound(room_id: &str, sender: &str, message: &str, language: &str) -> InboundMessage {
    InboundMessage {
        room_id: room_id.to_owned(),
        timestamp: "2025-01-01T10:00:00Z".to_owned(),
        message: message.to_owned(),
        sender_id: format!("{sender}-id"),
        sender_username: sender.to_owned(),
        selected_language: language.to_owned(),
    }
}

// ============================================================================
// Scripted LLM provider
// ============================================================================

/// LLM provider that replays scripted replies and records every request
pub struct MockProvider {
    replies: Mutex<VecDeque<AppResult<String>>>,
    default_reply: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    /// Provider answering every request with `default_reply`
    pub fn new(default_reply: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_reply: default_reply.to_owned(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn push_reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(text.to_owned()));
    }

    /// Queue a failure
    pub fn push_error(&self, error: AppError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Text of the final (instruction) message of request `index`
    pub fn instruction(&self, index: usize) -> String {
        self.requests()[index]
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn display_name(&self) -> &'static str {
        "Mock Provider"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    fn available_models(&self) -> &'static [&'static str] {
        &["mock-model"]
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.default_reply.clone()));
        next.map(|content| ChatResponse {
            content,
            model: "mock-model".to_owned(),
            usage: None,
            finish_reason: Some("STOP".to_owned()),
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

// ============================================================================
// Failing store
// ============================================================================

/// Message store whose every write fails
pub struct FailingStore;

#[async_trait]
impl MessageStore for FailingStore {
    async fn find_room(&self, room_id: &str) -> AppResult<Option<RoomRecord>> {
        Ok(Some(RoomRecord {
            id: "1".to_owned(),
            room_id: room_id.to_owned(),
            created_at: String::new(),
            updated_at: String::new(),
        }))
    }

    async fn create_room(&self, _room_id: &str) -> AppResult<RoomRecord> {
        Err(AppError::database("disk full"))
    }

    async fn append_message(
        &self,
        _room: &RoomRecord,
        _message: &NewChatMessage,
    ) -> AppResult<ChatMessageRecord> {
        Err(AppError::database("disk full"))
    }

    async fn list_messages(&self, _room_id: &str) -> AppResult<Vec<ChatMessageRecord>> {
        Ok(Vec::new())
    }
}

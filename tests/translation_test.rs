// ABOUTME: Tests for the context-aware translator over a scripted LLM provider
// ABOUTME: Validates prompt contents, first-line normalization, and fallback on provider failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::MockProvider;
use parley_server::config::LlmConfig;
use parley_server::constants::translation::{FALLBACK_TEXT, NO_CONTEXT_PLACEHOLDER};
use parley_server::errors::{AppError, ErrorCode};
use parley_server::llm::MessageRole;
use parley_server::translation::{ConversationTurn, TranslationOutcome, Translator};

fn translator(provider: &Arc<MockProvider>) -> Translator {
    Translator::new(provider.clone(), &LlmConfig::default())
}

#[tokio::test]
async fn test_returns_first_line_of_reply() {
    common::init_test_logging();
    let provider = Arc::new(MockProvider::new("unused"));
    provider.push_reply("Bonjour\nExtra line");

    let outcome = translator(&provider)
        .translate("Hello", "fr", "alice", &[])
        .await;

    assert!(matches!(&outcome, TranslationOutcome::Translated(text) if text == "Bonjour"));
    assert_eq!(outcome.text(), "Bonjour");
}

#[tokio::test]
async fn test_reply_is_trimmed_before_taking_first_line() {
    let provider = Arc::new(MockProvider::new("unused"));
    provider.push_reply("\n\n  Hola  \nsegunda");

    let outcome = translator(&provider)
        .translate("Hello", "es", "alice", &[])
        .await;

    assert_eq!(outcome.text(), "Hola");
}

#[tokio::test]
async fn test_provider_failure_yields_fallback() {
    common::init_test_logging();
    let provider = Arc::new(MockProvider::new("unused"));
    provider.push_error(AppError::new(ErrorCode::ExternalServiceUnavailable, "timeout"));

    let outcome = translator(&provider)
        .translate("Hello", "fr", "alice", &[])
        .await;

    assert!(outcome.is_fallback());
    assert_eq!(outcome.text(), FALLBACK_TEXT);
    let TranslationOutcome::Fallback { error } = outcome else {
        panic!("expected fallback");
    };
    assert_eq!(error.code, ErrorCode::ExternalServiceUnavailable);
}

#[tokio::test]
async fn test_blank_reply_yields_fallback() {
    let provider = Arc::new(MockProvider::new("unused"));
    provider.push_reply("   \n  ");

    let outcome = translator(&provider)
        .translate("Hello", "fr", "alice", &[])
        .await;

    assert_eq!(outcome.text(), FALLBACK_TEXT);
}

#[tokio::test]
async fn test_empty_history_uses_placeholder() {
    let provider = Arc::new(MockProvider::new("Bonjour"));

    translator(&provider)
        .translate("Hello", "fr", "alice", &[])
        .await;

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].messages.len(), 1);
    let instruction = provider.instruction(0);
    assert!(instruction.contains(NO_CONTEXT_PLACEHOLDER));
    assert!(instruction.contains("Translate this new message from alice into fr: Hello"));
    assert!(!instruction.contains("Original:"));
}

#[tokio::test]
async fn test_history_and_anchor_are_sent() {
    let provider = Arc::new(MockProvider::new("Ça va bien"));
    let history = vec![
        ConversationTurn::new("bob", "Comment ça va ?", "How are you?", "1"),
        ConversationTurn::new("alice", "Hi", "Salut", "2"),
    ];

    translator(&provider)
        .translate("I am fine", "fr", "alice", &history)
        .await;

    let request = &provider.requests()[0];
    assert_eq!(request.messages.len(), 3);
    assert!(request.messages.iter().all(|m| m.role == MessageRole::User));
    assert_eq!(request.messages[0].content, "Comment ça va ?");
    assert_eq!(request.messages[1].content, "Hi");

    let instruction = provider.instruction(0);
    assert!(instruction.contains("Original: Comment ça va ?\nTranslation: How are you?"));
    assert!(!instruction.contains(NO_CONTEXT_PLACEHOLDER));
}

#[tokio::test]
async fn test_generation_settings_come_from_config() {
    let provider = Arc::new(MockProvider::new("ok"));
    let config = LlmConfig {
        model: "gemini-2.0-flash".to_owned(),
        temperature: 0.2,
        top_k: 10,
        ..LlmConfig::default()
    };

    Translator::new(provider.clone(), &config)
        .translate("Hello", "de", "alice", &[])
        .await;

    let request = &provider.requests()[0];
    assert_eq!(request.model.as_deref(), Some("gemini-2.0-flash"));
    assert_eq!(request.temperature, Some(0.2));
    assert_eq!(request.top_k, Some(10));
    assert_eq!(request.top_p, Some(0.95));
    assert_eq!(request.max_tokens, Some(8192));
}

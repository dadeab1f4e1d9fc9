// ABOUTME: Tests for environment-driven server configuration
// ABOUTME: Validates defaults, overrides, parse failures, validation rules, and secret redaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use parley_server::config::{Environment, HistoryScope, ServerConfig};
use serial_test::serial;

const MANAGED_VARS: &[&str] = &[
    "HOST",
    "HTTP_PORT",
    "ENVIRONMENT",
    "DATABASE_URL",
    "GEMINI_API_KEY",
    "GEMINI_MODEL",
    "GEMINI_BASE_URL",
    "LLM_TEMPERATURE",
    "LLM_TOP_P",
    "LLM_TOP_K",
    "LLM_MAX_OUTPUT_TOKENS",
    "LLM_REQUEST_TIMEOUT_SECS",
    "TRANSLATION_HISTORY_SIZE",
    "TRANSLATION_HISTORY_SCOPE",
    "DEFAULT_LANGUAGE",
    "ROOM_AUTO_CREATE",
];

fn clear_env() {
    for var in MANAGED_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_when_environment_is_empty() {
    clear_env();

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 5000);
    assert_eq!(config.bind_address(), "0.0.0.0:5000");
    assert_eq!(config.environment, Environment::Development);
    assert!(config.llm.api_key.is_none());
    assert_eq!(config.llm.model, "gemini-1.5-flash");
    assert!((config.llm.temperature - 1.0).abs() < f32::EPSILON);
    assert_eq!(config.llm.top_k, 64);
    assert_eq!(config.llm.max_output_tokens, 8192);
    assert_eq!(config.translation.history_capacity, 10);
    assert_eq!(config.translation.history_scope, HistoryScope::PerRoom);
    assert_eq!(config.translation.default_language, "en");
    assert!(!config.rooms.auto_create);
}

#[test]
#[serial]
fn test_overrides_are_applied() {
    clear_env();
    env::set_var("HOST", "127.0.0.1");
    env::set_var("HTTP_PORT", "8088");
    env::set_var("ENVIRONMENT", "production");
    env::set_var("GEMINI_API_KEY", "abc123");
    env::set_var("GEMINI_MODEL", "gemini-2.0-flash");
    env::set_var("TRANSLATION_HISTORY_SIZE", "4");
    env::set_var("TRANSLATION_HISTORY_SCOPE", "global");
    env::set_var("DEFAULT_LANGUAGE", "fr");
    env::set_var("ROOM_AUTO_CREATE", "true");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.bind_address(), "127.0.0.1:8088");
    assert!(config.environment.is_production());
    assert_eq!(config.llm.api_key.as_deref(), Some("abc123"));
    assert_eq!(config.llm.model, "gemini-2.0-flash");
    assert_eq!(config.translation.history_capacity, 4);
    assert_eq!(config.translation.history_scope, HistoryScope::Global);
    assert_eq!(config.translation.default_language, "fr");
    assert!(config.rooms.auto_create);
}

#[test]
#[serial]
fn test_blank_api_key_is_treated_as_missing() {
    clear_env();
    env::set_var("GEMINI_API_KEY", "   ");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert!(config.llm.api_key.is_none());
}

#[test]
#[serial]
fn test_invalid_port_is_rejected() {
    clear_env();
    env::set_var("HTTP_PORT", "not-a-port");

    let error = ServerConfig::from_env().unwrap_err();
    clear_env();

    assert!(format!("{error:#}").contains("HTTP_PORT"));
}

#[test]
#[serial]
fn test_zero_history_size_is_rejected() {
    clear_env();
    env::set_var("TRANSLATION_HISTORY_SIZE", "0");

    let error = ServerConfig::from_env().unwrap_err();
    clear_env();

    assert!(error.to_string().contains("TRANSLATION_HISTORY_SIZE"));
}

#[test]
#[serial]
fn test_unknown_history_scope_is_rejected() {
    clear_env();
    env::set_var("TRANSLATION_HISTORY_SCOPE", "per_galaxy");

    let result = ServerConfig::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
fn test_history_scope_parsing_accepts_aliases() {
    assert_eq!("per_room".parse::<HistoryScope>().unwrap(), HistoryScope::PerRoom);
    assert_eq!("per-room".parse::<HistoryScope>().unwrap(), HistoryScope::PerRoom);
    assert_eq!(" GLOBAL ".parse::<HistoryScope>().unwrap(), HistoryScope::Global);
    assert_eq!(HistoryScope::Global.to_string(), "global");
}

#[test]
fn test_summary_and_debug_never_expose_api_key() {
    let mut config = ServerConfig::default();
    config.llm.api_key = Some("very-secret-key".to_owned());

    let summary = config.summary();
    assert!(summary.contains("Configured"));
    assert!(!summary.contains("very-secret-key"));
    assert!(!format!("{config:?}").contains("very-secret-key"));
}

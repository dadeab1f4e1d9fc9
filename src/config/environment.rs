// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses bind address, database URL, Gemini credentials, and translation tuning from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management for production deployment

use crate::constants::{llm, server, translation};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment type for logging and safety defaults
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    /// Local development
    Development,
    /// Production deployment
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// How conversation history is partitioned across rooms
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistoryScope {
    /// One bounded buffer per room
    #[default]
    PerRoom,
    /// A single buffer shared by every room in the process
    Global,
}

impl FromStr for HistoryScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "per_room" | "per-room" | "room" => Ok(Self::PerRoom),
            "global" | "shared" => Ok(Self::Global),
            other => Err(anyhow::anyhow!(
                "Unknown history scope '{other}' (expected 'per_room' or 'global')"
            )),
        }
    }
}

impl fmt::Display for HistoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerRoom => write!(f, "per_room"),
            Self::Global => write!(f, "global"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL
    pub url: String,
}

/// Gemini provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key; required by the server binary, optional for library use
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// REST base URL (overridable for tests and proxies)
    pub base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling probability
    pub top_p: f32,
    /// Top-k sampling
    pub top_k: u32,
    /// Maximum generated tokens
    pub max_output_tokens: u32,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl LlmConfig {
    /// Request timeout as a `Duration`
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: llm::DEFAULT_MODEL.to_owned(),
            base_url: llm::GEMINI_API_BASE_URL.to_owned(),
            temperature: llm::DEFAULT_TEMPERATURE,
            top_p: llm::DEFAULT_TOP_P,
            top_k: llm::DEFAULT_TOP_K,
            max_output_tokens: llm::DEFAULT_MAX_OUTPUT_TOKENS,
            request_timeout_secs: llm::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Translation pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Turns kept per history buffer
    pub history_capacity: usize,
    /// Partitioning of history across rooms
    pub history_scope: HistoryScope,
    /// Target language when the client omits one
    pub default_language: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            history_capacity: translation::DEFAULT_HISTORY_CAPACITY,
            history_scope: HistoryScope::default(),
            default_language: translation::DEFAULT_LANGUAGE.to_owned(),
        }
    }
}

/// Room behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Create a room's message collection on first message instead of failing persistence
    pub auto_create: bool,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP and WebSocket port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Translation provider configuration
    pub llm: LlmConfig,
    /// Translation pipeline configuration
    pub translation: TranslationConfig,
    /// Room behaviour
    pub rooms: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: server::DEFAULT_HOST.to_owned(),
            http_port: server::DEFAULT_HTTP_PORT,
            environment: Environment::default(),
            database: DatabaseConfig {
                url: server::DEFAULT_DATABASE_URL.to_owned(),
            },
            llm: LlmConfig::default(),
            translation: TranslationConfig::default(),
            rooms: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or if
    /// the resulting configuration fails validation
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            host: env_var_or("HOST", server::DEFAULT_HOST),
            http_port: parse_env("HTTP_PORT", server::DEFAULT_HTTP_PORT)?,
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            database: DatabaseConfig {
                url: env_var_or("DATABASE_URL", server::DEFAULT_DATABASE_URL),
            },
            llm: LlmConfig {
                api_key: env::var(GEMINI_API_KEY_ENV)
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                model: env_var_or("GEMINI_MODEL", llm::DEFAULT_MODEL),
                base_url: env_var_or("GEMINI_BASE_URL", llm::GEMINI_API_BASE_URL),
                temperature: parse_env("LLM_TEMPERATURE", llm::DEFAULT_TEMPERATURE)?,
                top_p: parse_env("LLM_TOP_P", llm::DEFAULT_TOP_P)?,
                top_k: parse_env("LLM_TOP_K", llm::DEFAULT_TOP_K)?,
                max_output_tokens: parse_env(
                    "LLM_MAX_OUTPUT_TOKENS",
                    llm::DEFAULT_MAX_OUTPUT_TOKENS,
                )?,
                request_timeout_secs: parse_env(
                    "LLM_REQUEST_TIMEOUT_SECS",
                    llm::DEFAULT_REQUEST_TIMEOUT_SECS,
                )?,
            },
            translation: TranslationConfig {
                history_capacity: parse_env(
                    "TRANSLATION_HISTORY_SIZE",
                    translation::DEFAULT_HISTORY_CAPACITY,
                )?,
                history_scope: parse_env("TRANSLATION_HISTORY_SCOPE", HistoryScope::PerRoom)?,
                default_language: env_var_or("DEFAULT_LANGUAGE", translation::DEFAULT_LANGUAGE),
            },
            rooms: RoomConfig {
                auto_create: parse_env("ROOM_AUTO_CREATE", false)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error if a value is outside its accepted range
    pub fn validate(&self) -> Result<()> {
        if self.translation.history_capacity == 0 {
            return Err(anyhow::anyhow!(
                "TRANSLATION_HISTORY_SIZE must be at least 1"
            ));
        }
        if self.llm.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "LLM_REQUEST_TIMEOUT_SECS must be at least 1"
            ));
        }
        if self.translation.default_language.trim().is_empty() {
            return Err(anyhow::anyhow!("DEFAULT_LANGUAGE cannot be empty"));
        }
        if self.llm.api_key.is_none() {
            warn!("{GEMINI_API_KEY_ENV} is not set; the server binary will refuse to start");
        }
        Ok(())
    }

    /// Socket address string for binding
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Parley Server Configuration:\n\
             - Bind: {}\n\
             - Environment: {}\n\
             - Database: {}\n\
             - Gemini Model: {}\n\
             - Gemini API Key: {}\n\
             - LLM Timeout: {}s\n\
             - History: {} turns ({})\n\
             - Default Language: {}\n\
             - Room Auto-Create: {}",
            self.bind_address(),
            self.environment,
            self.database.url,
            self.llm.model,
            if self.llm.api_key.is_some() {
                "Configured"
            } else {
                "Missing"
            },
            self.llm.request_timeout_secs,
            self.translation.history_capacity,
            self.translation.history_scope,
            self.translation.default_language,
            if self.rooms.auto_create {
                "Enabled"
            } else {
                "Disabled"
            },
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid {key} value: '{raw}'")),
        Err(_) => Ok(default),
    }
}

// ABOUTME: Translation requester that calls the LLM provider with conversation context
// ABOUTME: Normalizes the model reply to its first line and degrades to a fixed fallback on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::history::ConversationTurn;
use super::prompt::TranslationRequest;
use crate::config::LlmConfig;
use crate::constants::translation::FALLBACK_TEXT;
use crate::errors::AppError;
use crate::llm::{ChatRequest, LlmProvider};

/// Result of one translation attempt; always yields deliverable text
#[derive(Debug)]
pub enum TranslationOutcome {
    /// Provider returned a usable translation
    Translated(String),
    /// Provider call failed; the fallback string is delivered instead
    Fallback {
        /// Why the provider call failed
        error: AppError,
    },
}

impl TranslationOutcome {
    /// Text to deliver to peers
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Translated(text) => text,
            Self::Fallback { .. } => FALLBACK_TEXT,
        }
    }

    /// Whether the fallback was used
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Sampling settings applied to every translation request
#[derive(Debug, Clone)]
struct GenerationSettings {
    model: String,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl From<&LlmConfig> for GenerationSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Context-aware translator over any [`LlmProvider`]
#[derive(Clone)]
pub struct Translator {
    provider: Arc<dyn LlmProvider>,
    settings: GenerationSettings,
}

impl Translator {
    /// Create a translator using the generation settings from `config`
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            settings: GenerationSettings::from(config),
        }
    }

    /// Translate `message` into `target_language` using `history` as context
    ///
    /// Never fails: provider errors are logged and turned into
    /// [`TranslationOutcome::Fallback`].
    #[instrument(skip(self, message, history), fields(provider = self.provider.name(), turns = history.len()))]
    pub async fn translate(
        &self,
        message: &str,
        target_language: &str,
        sender_username: &str,
        history: &[ConversationTurn],
    ) -> TranslationOutcome {
        let request = TranslationRequest::new(message, target_language, sender_username, history);
        debug!(has_anchor = request.anchor.is_some(), "Built translation request");

        let chat_request = ChatRequest::new(request.to_messages())
            .with_model(self.settings.model.clone())
            .with_temperature(self.settings.temperature)
            .with_sampling(self.settings.top_p, self.settings.top_k)
            .with_max_tokens(self.settings.max_output_tokens);

        let result = self
            .provider
            .complete(&chat_request)
            .await
            .and_then(|response| {
                first_line(&response.content).map(str::to_owned).ok_or_else(|| {
                    AppError::external_service(self.provider.display_name(), "Empty translation")
                })
            });

        match result {
            Ok(text) => TranslationOutcome::Translated(text),
            Err(error) => {
                warn!(code = ?error.code, error = %error, "Translation failed, using fallback text");
                TranslationOutcome::Fallback { error }
            }
        }
    }
}

/// First line of the trimmed reply, `None` if nothing remains
fn first_line(raw: &str) -> Option<&str> {
    raw.trim()
        .lines()
        .next()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_drops_trailing_lines() {
        assert_eq!(first_line("Bonjour\nExtra line"), Some("Bonjour"));
        assert_eq!(first_line("  \n Hola \r\nmore"), Some("Hola"));
        assert_eq!(first_line("   "), None);
    }

    #[test]
    fn test_fallback_text() {
        let outcome = TranslationOutcome::Fallback {
            error: AppError::internal("boom"),
        };
        assert_eq!(outcome.text(), FALLBACK_TEXT);
        assert!(outcome.is_fallback());
    }
}

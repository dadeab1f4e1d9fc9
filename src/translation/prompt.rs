// ABOUTME: Prompt construction for context-aware chat translation
// ABOUTME: Turns history, anchor, and the new message into an LLM conversation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::context::select_anchor;
use super::history::ConversationTurn;
use crate::constants::translation::NO_CONTEXT_PLACEHOLDER;
use crate::llm::ChatMessage;

/// Everything needed to ask the model for one translation
#[derive(Debug, Clone)]
pub struct TranslationRequest<'a> {
    /// Turns preceding this message, oldest first
    pub prior_turns: &'a [ConversationTurn],
    /// Most recent turn from another sender
    pub anchor: Option<&'a ConversationTurn>,
    /// Language code to translate into
    pub target_language: &'a str,
    /// Sender of the new message
    pub sender_username: &'a str,
    /// Text to translate
    pub message: &'a str,
}

impl<'a> TranslationRequest<'a> {
    /// Build a request, resolving the anchor from `prior_turns`
    #[must_use]
    pub fn new(
        message: &'a str,
        target_language: &'a str,
        sender_username: &'a str,
        prior_turns: &'a [ConversationTurn],
    ) -> Self {
        Self {
            prior_turns,
            anchor: select_anchor(prior_turns, sender_username),
            target_language,
            sender_username,
            message,
        }
    }

    /// Two-line anchor block, or the placeholder when nobody else has spoken
    #[must_use]
    pub fn anchor_block(&self) -> String {
        self.anchor.map_or_else(
            || NO_CONTEXT_PLACEHOLDER.to_owned(),
            |turn| {
                format!(
                    "Original: {}\nTranslation: {}",
                    turn.original_message, turn.translated_message
                )
            },
        )
    }

    /// Instruction sent as the final user turn
    #[must_use]
    pub fn instruction(&self) -> String {
        let anchor = self.anchor_block();
        format!(
            "Here is the chat history:\n{anchor}\n\n\
             Translate this new message from {sender} into {language}: {message}\n\n\
             Consider the last peer's message:\n{anchor}\n\n\
             Keep the translation semantically consistent with the last peer's message. \
             Preserve the tone of the sender's message. \
             Reply with the translation only, without any description or extra information.",
            sender = self.sender_username,
            language = self.target_language,
            message = self.message,
        )
    }

    /// Prior turns as user messages followed by the instruction
    #[must_use]
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        let mut messages: Vec<ChatMessage> = self
            .prior_turns
            .iter()
            .map(|turn| ChatMessage::user(turn.original_message.clone()))
            .collect();
        messages.push(ChatMessage::user(self.instruction()));
        messages
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_block_formats_peer_turn() {
        let history = vec![ConversationTurn::new("bob", "Hola", "Hello", "1")];
        let request = TranslationRequest::new("Hi", "es", "alice", &history);
        assert_eq!(request.anchor_block(), "Original: Hola\nTranslation: Hello");
        assert!(request.instruction().contains("from alice into es: Hi"));
    }

    #[test]
    fn test_messages_end_with_instruction() {
        let history = vec![
            ConversationTurn::new("bob", "one", "uno", "1"),
            ConversationTurn::new("alice", "two", "dos", "2"),
        ];
        let request = TranslationRequest::new("three", "es", "alice", &history);
        let messages = request.to_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "one");
        assert_eq!(messages[1].content, "two");
        assert!(messages[2].content.contains("Original: one"));
    }
}

// ABOUTME: Anchor selection for context-aware translation
// ABOUTME: Picks the most recent turn spoken by someone other than the current sender
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::history::ConversationTurn;

/// Most recent turn whose sender differs from `sender_username`
///
/// With more than two participants this is the latest *other* speaker, not
/// necessarily the person being answered.
#[must_use]
pub fn select_anchor<'a>(
    history: &'a [ConversationTurn],
    sender_username: &str,
) -> Option<&'a ConversationTurn> {
    history
        .iter()
        .rev()
        .find(|turn| turn.sender_username != sender_username)
}

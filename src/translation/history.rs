// ABOUTME: Bounded conversation history that seeds translation context
// ABOUTME: FIFO-evicting turn buffers keyed per room or shared process-wide
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::config::HistoryScope;
use crate::constants::translation::DEFAULT_HISTORY_CAPACITY;

/// One exchanged message together with the translation that was delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Display name of the sender
    pub sender_username: String,
    /// Text as the sender wrote it
    pub original_message: String,
    /// Text delivered to peers (a translation or the fallback string)
    pub translated_message: String,
    /// Client-supplied timestamp, kept verbatim
    pub timestamp: String,
}

impl ConversationTurn {
    /// Create a new turn
    #[must_use]
    pub fn new(
        sender_username: impl Into<String>,
        original_message: impl Into<String>,
        translated_message: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            sender_username: sender_username.into(),
            original_message: original_message.into(),
            translated_message: translated_message.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// Ordered log of the most recent turns, oldest first
///
/// Never holds more than `capacity` turns; recording past capacity drops the
/// oldest entry.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    turns: VecDeque<ConversationTurn>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer. A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a turn, evicting the oldest one on overflow
    pub fn record(&mut self, turn: ConversationTurn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// All turns in chronological order
    #[must_use]
    pub fn all(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }

    /// Number of turns held
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the buffer holds no turns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Maximum number of turns held
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Owner of every history buffer in the process
///
/// With [`HistoryScope::PerRoom`] each room id selects its own buffer. With
/// [`HistoryScope::Global`] the room id is ignored and all rooms share one.
#[derive(Debug)]
pub struct HistoryStore {
    scope: HistoryScope,
    capacity: usize,
    buffers: Mutex<HashMap<String, HistoryBuffer>>,
}

const GLOBAL_KEY: &str = "";

impl HistoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new(scope: HistoryScope, capacity: usize) -> Self {
        Self {
            scope,
            capacity,
            buffers: Mutex::new(HashMap::new()),
        }
    }

    /// Partitioning in effect
    #[must_use]
    pub const fn scope(&self) -> HistoryScope {
        self.scope
    }

    fn key<'a>(&self, room_id: &'a str) -> &'a str {
        match self.scope {
            HistoryScope::PerRoom => room_id,
            HistoryScope::Global => GLOBAL_KEY,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, HistoryBuffer>> {
        // A panic while holding the lock cannot leave a buffer half-written
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the turns visible to `room_id`, oldest first
    #[must_use]
    pub fn snapshot(&self, room_id: &str) -> Vec<ConversationTurn> {
        self.lock()
            .get(self.key(room_id))
            .map(HistoryBuffer::all)
            .unwrap_or_default()
    }

    /// Record a turn in the buffer for `room_id`
    pub fn record(&self, room_id: &str, turn: ConversationTurn) {
        let key = self.key(room_id).to_owned();
        let capacity = self.capacity;
        self.lock()
            .entry(key)
            .or_insert_with(|| HistoryBuffer::new(capacity))
            .record(turn);
    }

    /// Number of turns visible to `room_id`
    #[must_use]
    pub fn len(&self, room_id: &str) -> usize {
        self.lock()
            .get(self.key(room_id))
            .map_or(0, HistoryBuffer::len)
    }

    /// Drop the buffer for `room_id` (the shared buffer under global scope)
    pub fn clear(&self, room_id: &str) {
        let key = self.key(room_id).to_owned();
        self.lock().remove(&key);
    }

    /// Forget a room nobody is in any more
    ///
    /// Under global scope the shared buffer outlives every room and this is a
    /// no-op. Returns whether a buffer was dropped.
    pub fn release(&self, room_id: &str) -> bool {
        match self.scope {
            HistoryScope::PerRoom => self.lock().remove(room_id).is_some(),
            HistoryScope::Global => false,
        }
    }

    /// Number of buffers held
    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.lock().len()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(HistoryScope::default(), DEFAULT_HISTORY_CAPACITY)
    }
}

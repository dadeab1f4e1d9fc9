// ABOUTME: Message ingest pipeline tying translation, persistence, history, and fan-out together
// ABOUTME: Each stage failure is recorded in the report and never aborts delivery
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::database::{ChatMessageRecord, MessageStore, NewChatMessage, RoomRecord};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::protocol::{InboundMessage, ServerEvent};
use crate::rooms::{ConnectionId, RoomChannelManager};
use crate::translation::{ConversationTurn, HistoryStore, TranslationOutcome, Translator};

/// Result of the persistence stage
#[derive(Debug)]
pub enum PersistOutcome {
    /// Message written
    Stored(ChatMessageRecord),
    /// Write failed and was rolled back
    Failed(AppError),
}

impl PersistOutcome {
    /// Whether the message was written
    #[must_use]
    pub const fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_))
    }
}

/// What happened to one inbound message
#[derive(Debug)]
pub struct IngestReport {
    /// Translation stage result
    pub translation: TranslationOutcome,
    /// Persistence stage result
    pub persistence: PersistOutcome,
    /// Number of peers the translated message was handed to
    pub delivered: usize,
}

/// Runs one inbound message through translate, persist, record, broadcast
pub struct MessageIngestOrchestrator {
    translator: Translator,
    store: Arc<dyn MessageStore>,
    history: Arc<HistoryStore>,
    rooms: RoomChannelManager,
    auto_create_rooms: bool,
}

impl MessageIngestOrchestrator {
    /// Create an orchestrator over the given collaborators
    #[must_use]
    pub fn new(
        translator: Translator,
        store: Arc<dyn MessageStore>,
        history: Arc<HistoryStore>,
        rooms: RoomChannelManager,
    ) -> Self {
        Self {
            translator,
            store,
            history,
            rooms,
            auto_create_rooms: false,
        }
    }

    /// Create missing room collections on first message instead of failing persistence
    #[must_use]
    pub const fn with_auto_create_rooms(mut self, enabled: bool) -> Self {
        self.auto_create_rooms = enabled;
        self
    }

    /// History shared with this orchestrator
    #[must_use]
    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Room registry used for delivery
    #[must_use]
    pub const fn rooms(&self) -> &RoomChannelManager {
        &self.rooms
    }

    /// Ingest one message; `origin` is excluded from delivery
    ///
    /// Callers must not run two ingests for the same room concurrently when
    /// history is per room; the room dispatcher guarantees this.
    #[instrument(
        skip_all,
        fields(
            room_id = %message.room_id,
            sender = %message.sender_username,
            language = %message.selected_language,
        )
    )]
    pub async fn ingest(
        &self,
        message: InboundMessage,
        origin: Option<ConnectionId>,
    ) -> IngestReport {
        let history = self.history.snapshot(&message.room_id);

        let translation = self
            .translator
            .translate(
                &message.message,
                &message.selected_language,
                &message.sender_username,
                &history,
            )
            .await;
        debug!(fallback = translation.is_fallback(), "Translation stage complete");

        let persistence = match self.persist(&message).await {
            Ok(record) => PersistOutcome::Stored(record),
            Err(e) => {
                error!(code = ?e.code, error = %e, "Failed to persist chat message");
                PersistOutcome::Failed(e)
            }
        };

        self.history.record(
            &message.room_id,
            ConversationTurn::new(
                message.sender_username.clone(),
                message.message.clone(),
                translation.text(),
                message.timestamp.clone(),
            ),
        );

        let event = ServerEvent::Message {
            message: translation.text().to_owned(),
            timestamp: message.timestamp,
            sender_username: message.sender_username,
        };
        let delivered = self.rooms.broadcast(&message.room_id, &event, origin);

        info!(
            delivered,
            stored = persistence.is_stored(),
            fallback = translation.is_fallback(),
            "Message ingested"
        );

        IngestReport {
            translation,
            persistence,
            delivered,
        }
    }

    async fn persist(&self, message: &InboundMessage) -> AppResult<ChatMessageRecord> {
        let room = self.resolve_room(&message.room_id).await?;
        self.store
            .append_message(&room, &NewChatMessage::from(message))
            .await
    }

    async fn resolve_room(&self, room_id: &str) -> AppResult<RoomRecord> {
        if let Some(room) = self.store.find_room(room_id).await? {
            return Ok(room);
        }
        if !self.auto_create_rooms {
            return Err(AppError::not_found(format!("Room {room_id}")).with_resource_id(room_id));
        }
        match self.store.create_room(room_id).await {
            Ok(room) => {
                info!(room_id, "Created room on first message");
                Ok(room)
            }
            // Lost a creation race; the room exists now
            Err(e) if e.code == ErrorCode::ResourceAlreadyExists => self
                .store
                .find_room(room_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Room {room_id}"))),
            Err(e) => Err(e),
        }
    }
}

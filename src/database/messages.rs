// ABOUTME: Room message store with transactional appends and chronological listing
// ABOUTME: Defines the MessageStore trait and its SQLite implementation on Database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use super::transactions::{retry_transaction, SqliteTransactionGuard};
use super::Database;
use crate::errors::{AppError, AppResult};
use crate::protocol::InboundMessage;

const APPEND_MAX_ATTEMPTS: u32 = 3;

// ============================================================================
// Database Record Types
// ============================================================================

/// A room's message collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Row id
    pub id: String,
    /// Room id used on the wire
    pub room_id: String,
    /// When the room was created (RFC 3339)
    pub created_at: String,
    /// When a message was last appended (RFC 3339)
    pub updated_at: String,
}

/// A persisted chat message (original text, never the translation)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    /// Row id
    pub id: String,
    /// Room the message belongs to
    pub room_id: String,
    /// Original text
    pub content: String,
    /// Client timestamp
    pub timestamp: String,
    /// Sender id
    pub sender_id: String,
    /// Sender display name
    pub sender_username: String,
    /// When the row was written (RFC 3339)
    pub created_at: String,
}

/// Fields supplied when appending a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    /// Original text
    pub content: String,
    /// Client timestamp
    pub timestamp: String,
    /// Sender id
    pub sender_id: String,
    /// Sender display name
    pub sender_username: String,
}

impl From<&InboundMessage> for NewChatMessage {
    fn from(message: &InboundMessage) -> Self {
        Self {
            content: message.message.clone(),
            timestamp: message.timestamp.clone(),
            sender_id: message.sender_id.clone(),
            sender_username: message.sender_username.clone(),
        }
    }
}

// ============================================================================
// Store Trait
// ============================================================================

/// Persistence for rooms and their messages
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Look up a room's collection
    async fn find_room(&self, room_id: &str) -> AppResult<Option<RoomRecord>>;

    /// Create a room's collection; fails with `RESOURCE_ALREADY_EXISTS` if present
    async fn create_room(&self, room_id: &str) -> AppResult<RoomRecord>;

    /// Append a message and bump the room's `updated_at` in one transaction
    async fn append_message(
        &self,
        room: &RoomRecord,
        message: &NewChatMessage,
    ) -> AppResult<ChatMessageRecord>;

    /// Messages of a room in the order they were appended
    async fn list_messages(&self, room_id: &str) -> AppResult<Vec<ChatMessageRecord>>;
}

fn room_from_row(row: &SqliteRow) -> RoomRecord {
    RoomRecord {
        id: row.get("id"),
        room_id: row.get("room_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl Database {
    async fn try_append(
        &self,
        room: &RoomRecord,
        message: &NewChatMessage,
    ) -> AppResult<ChatMessageRecord> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to begin transaction: {e}")).with_source(e)
            })?;
        let mut guard = SqliteTransactionGuard::new(tx);

        sqlx::query(
            r"
            INSERT INTO chat_messages (id, room_id, content, timestamp, sender_id, sender_username, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&id)
        .bind(&room.room_id)
        .bind(&message.content)
        .bind(&message.timestamp)
        .bind(&message.sender_id)
        .bind(&message.sender_username)
        .bind(&now)
        .execute(guard.executor()?)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to add message: {e}")).with_source(e)
        })?;

        let updated = sqlx::query("UPDATE rooms SET updated_at = $1 WHERE room_id = $2")
            .bind(&now)
            .bind(&room.room_id)
            .execute(guard.executor()?)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to update room: {e}")).with_source(e)
            })?;

        if updated.rows_affected() == 0 {
            return Err(
                AppError::not_found(format!("Room {}", room.room_id)).with_resource_id(&room.room_id)
            );
        }

        guard.commit().await?;

        Ok(ChatMessageRecord {
            id,
            room_id: room.room_id.clone(),
            content: message.content.clone(),
            timestamp: message.timestamp.clone(),
            sender_id: message.sender_id.clone(),
            sender_username: message.sender_username.clone(),
            created_at: now,
        })
    }
}

#[async_trait]
impl MessageStore for Database {
    async fn find_room(&self, room_id: &str) -> AppResult<Option<RoomRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, room_id, created_at, updated_at
            FROM rooms
            WHERE room_id = $1
            ",
        )
        .bind(room_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get room: {e}")))?;

        Ok(row.as_ref().map(room_from_row))
    }

    async fn create_room(&self, room_id: &str) -> AppResult<RoomRecord> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO rooms (id, room_id, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ",
        )
        .bind(&id)
        .bind(room_id)
        .bind(&now)
        .execute(self.pool())
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::already_exists(format!("Room {room_id}")).with_resource_id(room_id)
            }
            _ => AppError::database(format!("Failed to create room: {e}")),
        })?;

        debug!(room_id, "Room created");
        Ok(RoomRecord {
            id,
            room_id: room_id.to_owned(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn append_message(
        &self,
        room: &RoomRecord,
        message: &NewChatMessage,
    ) -> AppResult<ChatMessageRecord> {
        retry_transaction(|| self.try_append(room, message), APPEND_MAX_ATTEMPTS).await
    }

    async fn list_messages(&self, room_id: &str) -> AppResult<Vec<ChatMessageRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, room_id, content, timestamp, sender_id, sender_username, created_at
            FROM chat_messages
            WHERE room_id = $1
            ORDER BY rowid ASC
            ",
        )
        .bind(room_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list messages: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|r| ChatMessageRecord {
                id: r.get("id"),
                room_id: r.get("room_id"),
                content: r.get("content"),
                timestamp: r.get("timestamp"),
                sender_id: r.get("sender_id"),
                sender_username: r.get("sender_username"),
                created_at: r.get("created_at"),
            })
            .collect())
    }
}

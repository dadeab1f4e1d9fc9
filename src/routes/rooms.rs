// ABOUTME: Room route handlers for creating rooms and reading their message history
// ABOUTME: Provides REST endpoints over the message store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Room routes
//!
//! A room must exist in the store before messages sent to it are persisted
//! (unless auto-creation is enabled). These endpoints create rooms and list
//! what has been stored.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::{ChatMessageRecord, MessageStore};
use crate::errors::AppError;

/// Response for message listing
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponse {
    /// Room id
    pub room_id: String,
    /// Messages, oldest first
    pub messages: Vec<ChatMessageRecord>,
    /// Number of messages returned
    pub total: usize,
}

/// Room routes implementation
pub struct RoomRoutes;

impl RoomRoutes {
    /// Create room routes backed by `store`
    pub fn routes(store: Arc<dyn MessageStore>) -> Router {
        Router::new()
            .route("/rooms/:room_id", post(Self::create_room))
            .route("/rooms/:room_id/messages", get(Self::list_messages))
            .with_state(store)
    }

    /// Create a room's message collection
    async fn create_room(
        State(store): State<Arc<dyn MessageStore>>,
        Path(room_id): Path<String>,
    ) -> Result<Response, AppError> {
        if room_id.trim().is_empty() {
            return Err(AppError::invalid_input("Room id cannot be empty"));
        }
        let room = store.create_room(&room_id).await?;
        info!(room_id = %room.room_id, "Room created via API");
        Ok((StatusCode::CREATED, Json(room)).into_response())
    }

    /// List a room's stored messages
    async fn list_messages(
        State(store): State<Arc<dyn MessageStore>>,
        Path(room_id): Path<String>,
    ) -> Result<Response, AppError> {
        if store.find_room(&room_id).await?.is_none() {
            return Err(AppError::not_found(format!("Room {room_id}")).with_resource_id(room_id));
        }
        let messages = store.list_messages(&room_id).await?;
        let response = MessageListResponse {
            total: messages.len(),
            room_id,
            messages,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}

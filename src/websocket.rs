// ABOUTME: WebSocket connection handling for chat rooms
// ABOUTME: Runs per-connection read and write loops and routes client events to rooms and ingest
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! `WebSocket` support for chat rooms
//!
//! Each connection gets a writer task fed by an unbounded channel that is
//! registered with the [`RoomChannelManager`]. The read loop parses client
//! events; a bad frame produces an `error` event and the connection stays open.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chat::RoomDispatcher;
use crate::errors::AppResult;
use crate::protocol::{ClientEvent, ServerEvent};
use crate::rooms::{ConnectionId, RoomChannelManager};

/// Accepts chat connections and routes their events
#[derive(Clone)]
pub struct ChatSocketManager {
    rooms: RoomChannelManager,
    dispatcher: RoomDispatcher,
    default_language: String,
}

impl ChatSocketManager {
    /// Create a manager over a room registry and dispatcher
    #[must_use]
    pub fn new(
        rooms: RoomChannelManager,
        dispatcher: RoomDispatcher,
        default_language: impl Into<String>,
    ) -> Self {
        Self {
            rooms,
            dispatcher,
            default_language: default_language.into(),
        }
    }

    /// Room registry
    #[must_use]
    pub const fn rooms(&self) -> &RoomChannelManager {
        &self.rooms
    }

    /// Handle incoming WebSocket connection until it closes
    pub async fn handle_connection(&self, ws: WebSocket) {
        let (mut ws_tx, mut ws_rx) = ws.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

        let connection_id = Uuid::new_v4();
        self.rooms.register(connection_id, tx);
        info!(%connection_id, "WebSocket connection opened");

        let ws_send_task = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let frame = match event.to_frame() {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(%connection_id, error = %e, "Failed to serialize outbound event");
                        continue;
                    }
                };
                if ws_tx.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
        });

        while let Some(msg) = ws_rx.next().await {
            match msg {
                Ok(Message::Text(text)) => self.handle_frame(connection_id, &text),
                Ok(Message::Close(_)) | Err(_) => break,
                _ => {}
            }
        }

        for room_id in self.rooms.disconnect(connection_id) {
            self.dispatcher.release_idle_room(&room_id);
        }
        ws_send_task.abort();
        info!(%connection_id, "WebSocket connection closed");
    }

    /// Process one text frame from `connection_id`
    pub fn handle_frame(&self, connection_id: ConnectionId, frame: &str) {
        if let Err(e) = self.dispatch_event(connection_id, frame) {
            warn!(%connection_id, code = ?e.code, error = %e, "Rejected client event");
            self.rooms.send_to(connection_id, ServerEvent::from(&e));
        }
    }

    fn dispatch_event(&self, connection_id: ConnectionId, frame: &str) -> AppResult<()> {
        let event = ClientEvent::parse(frame)?;
        debug!(%connection_id, event = event.name(), "Client event");

        match event {
            ClientEvent::JoinChat(payload) => {
                let room_id = payload.room_id()?;
                self.rooms.join(connection_id, &room_id);
            }
            ClientEvent::LeaveChat(payload) => {
                let room_id = payload.room_id()?;
                if self.rooms.leave(connection_id, &room_id) {
                    self.dispatcher.release_idle_room(&room_id);
                }
            }
            ClientEvent::Outgoing(payload) => {
                let message = payload.validate(&self.default_language)?;
                // Completion is observed through the broadcast, not the report
                drop(self.dispatcher.submit(message, Some(connection_id)));
            }
        }
        Ok(())
    }
}

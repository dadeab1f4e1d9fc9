// ABOUTME: WebSocket route handler for chat room connections
// ABOUTME: Upgrades GET /ws and hands the socket to the chat socket manager
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::{debug, info};

use crate::websocket::ChatSocketManager;

/// WebSocket routes implementation
pub struct WebSocketRoutes;

impl WebSocketRoutes {
    /// Create the `/ws` route with an injected `ChatSocketManager`
    pub fn routes(manager: Arc<ChatSocketManager>) -> Router {
        Router::new()
            .route("/ws", get(Self::handle_websocket))
            .with_state(manager)
    }

    async fn handle_websocket(
        ws: WebSocketUpgrade,
        State(manager): State<Arc<ChatSocketManager>>,
    ) -> impl IntoResponse {
        info!("New WebSocket connection request");

        ws.on_upgrade(move |socket: WebSocket| async move {
            debug!("WebSocket upgraded, delegating to manager");
            manager.handle_connection(socket).await;
        })
    }
}

// ABOUTME: Server assembly wiring the store, translator, rooms, and dispatcher into an axum app
// ABOUTME: Builds the HTTP router with tracing and CORS layers and serves it with graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server
//!
//! [`ServerResources`] owns every long-lived component. [`ServerResources::router`]
//! builds the axum application; [`serve`] runs it until ctrl-c.

use std::sync::Arc;

use axum::Router;
use http::{header, Method};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use crate::chat::{MessageIngestOrchestrator, RoomDispatcher};
use crate::config::ServerConfig;
use crate::database::MessageStore;
use crate::errors::{AppError, AppResult};
use crate::llm::LlmProvider;
use crate::rooms::RoomChannelManager;
use crate::routes::{HealthRoutes, RoomRoutes, WebSocketRoutes};
use crate::translation::{HistoryStore, Translator};
use crate::websocket::ChatSocketManager;

/// Long-lived server components
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Message persistence
    pub store: Arc<dyn MessageStore>,
    /// Conversation history
    pub history: Arc<HistoryStore>,
    /// Room membership registry
    pub rooms: RoomChannelManager,
    /// Per-room ingest queues
    pub dispatcher: RoomDispatcher,
    /// WebSocket connection handler
    pub sockets: Arc<ChatSocketManager>,
}

impl ServerResources {
    /// Wire components together from configuration
    #[must_use]
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn MessageStore>,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        let history = Arc::new(HistoryStore::new(
            config.translation.history_scope,
            config.translation.history_capacity,
        ));
        let rooms = RoomChannelManager::new();
        let translator = Translator::new(provider, &config.llm);

        let orchestrator = MessageIngestOrchestrator::new(
            translator,
            Arc::clone(&store),
            Arc::clone(&history),
            rooms.clone(),
        )
        .with_auto_create_rooms(config.rooms.auto_create);
        let dispatcher = RoomDispatcher::new(Arc::new(orchestrator));

        let sockets = Arc::new(ChatSocketManager::new(
            rooms.clone(),
            dispatcher.clone(),
            config.translation.default_language.clone(),
        ));

        Self {
            config: Arc::new(config),
            store,
            history,
            rooms,
            dispatcher,
            sockets,
        }
    }

    /// Build the HTTP application
    #[must_use]
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN]);

        Router::new()
            .merge(HealthRoutes::routes())
            .merge(RoomRoutes::routes(Arc::clone(&self.store)))
            .merge(WebSocketRoutes::routes(Arc::clone(&self.sockets)))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(cors)
    }
}

/// Bind the configured address and serve until ctrl-c
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn serve(resources: &ServerResources) -> AppResult<()> {
    let address = resources.config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::config(format!("Failed to bind {address}: {e}")).with_source(e))?;
    info!(%address, "Parley server listening");

    serve_on(listener, resources.router()).await
}

/// Serve `router` on an already-bound listener until ctrl-c
///
/// # Errors
///
/// Returns an error if the server fails
pub async fn serve_on(listener: TcpListener, router: Router) -> AppResult<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")).with_source(e))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

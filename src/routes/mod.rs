// ABOUTME: Route module organization for Parley Server HTTP endpoints
// ABOUTME: Groups health, room, and WebSocket routes by domain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for Parley Server
//!
//! Each domain module contains only route definitions and thin handlers that
//! delegate to the store or the socket manager.

/// Health check routes
pub mod health;
/// Room creation and message history routes
pub mod rooms;
/// WebSocket routes for chat connections
pub mod websocket;

pub use health::HealthRoutes;
pub use rooms::{MessageListResponse, RoomRoutes};
pub use websocket::WebSocketRoutes;

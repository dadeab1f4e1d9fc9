// ABOUTME: Room membership registry and event fan-out for chat connections
// ABOUTME: Tracks which connections are in which rooms and delivers events to room members
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Room Channel Manager
//!
//! Each connection registers an outbound channel; joining a room adds the
//! connection to that room's member set. Delivery is fire-and-forget: a closed
//! channel is logged and skipped, never retried.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::protocol::ServerEvent;

/// Identifier assigned to each socket connection
pub type ConnectionId = Uuid;

#[derive(Debug)]
struct ConnectionEntry {
    sender: UnboundedSender<ServerEvent>,
    rooms: HashSet<String>,
}

/// Registry of connections and their room memberships
#[derive(Debug, Clone, Default)]
pub struct RoomChannelManager {
    connections: Arc<DashMap<ConnectionId, ConnectionEntry>>,
    rooms: Arc<DashMap<String, HashSet<ConnectionId>>>,
}

impl RoomChannelManager {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the outbound channel for a connection
    pub fn register(&self, connection_id: ConnectionId, sender: UnboundedSender<ServerEvent>) {
        self.connections.insert(
            connection_id,
            ConnectionEntry {
                sender,
                rooms: HashSet::new(),
            },
        );
        debug!(%connection_id, "Connection registered");
    }

    /// Add a connection to a room and announce it to every member, joiner included
    ///
    /// Returns the number of members the announcement reached.
    pub fn join(&self, connection_id: ConnectionId, room_id: &str) -> usize {
        if let Some(mut entry) = self.connections.get_mut(&connection_id) {
            entry.rooms.insert(room_id.to_owned());
        } else {
            warn!(%connection_id, room_id, "Join from unregistered connection");
        }
        self.rooms
            .entry(room_id.to_owned())
            .or_default()
            .insert(connection_id);

        info!(%connection_id, room_id, "Connection joined room");
        self.emit_to_room(room_id, &ServerEvent::joined(room_id))
    }

    /// Remove a connection from a room; returns whether it was a member
    pub fn leave(&self, connection_id: ConnectionId, room_id: &str) -> bool {
        if let Some(mut entry) = self.connections.get_mut(&connection_id) {
            entry.rooms.remove(room_id);
        }
        let removed = self.remove_member(room_id, connection_id);
        if removed {
            info!(%connection_id, room_id, "Connection left room");
        }
        removed
    }

    /// Drop a connection and every membership it holds
    ///
    /// Returns the rooms the connection was a member of.
    pub fn disconnect(&self, connection_id: ConnectionId) -> Vec<String> {
        let Some((_, entry)) = self.connections.remove(&connection_id) else {
            return Vec::new();
        };
        for room_id in &entry.rooms {
            self.remove_member(room_id, connection_id);
        }
        debug!(%connection_id, rooms = entry.rooms.len(), "Connection disconnected");
        entry.rooms.into_iter().collect()
    }

    fn remove_member(&self, room_id: &str, connection_id: ConnectionId) -> bool {
        let removed = self
            .rooms
            .get_mut(room_id)
            .is_some_and(|mut members| members.remove(&connection_id));
        self.rooms.remove_if(room_id, |_, members| members.is_empty());
        removed
    }

    /// Deliver `event` to every member of `room_id` except `exclude`
    ///
    /// Returns the number of members the event was handed to.
    pub fn broadcast(
        &self,
        room_id: &str,
        event: &ServerEvent,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let recipients: Vec<ConnectionId> = self
            .rooms
            .get(room_id)
            .map(|members| {
                members
                    .iter()
                    .copied()
                    .filter(|id| Some(*id) != exclude)
                    .collect()
            })
            .unwrap_or_default();

        let delivered = recipients
            .into_iter()
            .filter(|id| self.send_to(*id, event.clone()))
            .count();

        debug!(room_id, event = event.name(), delivered, "Broadcast to room");
        delivered
    }

    /// Deliver `event` to every member of `room_id`
    pub fn emit_to_room(&self, room_id: &str, event: &ServerEvent) -> usize {
        self.broadcast(room_id, event, None)
    }

    /// Deliver `event` to a single connection; returns whether it was handed off
    pub fn send_to(&self, connection_id: ConnectionId, event: ServerEvent) -> bool {
        let Some(entry) = self.connections.get(&connection_id) else {
            return false;
        };
        if let Err(e) = entry.sender.send(event) {
            warn!(%connection_id, event = e.0.name(), "Connection channel closed, skipping delivery");
            return false;
        }
        true
    }

    /// Current members of `room_id`
    #[must_use]
    pub fn members(&self, room_id: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether `room_id` has at least one member
    #[must_use]
    pub fn is_active(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Number of rooms with at least one member
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of registered connections
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

// ABOUTME: Per-room FIFO dispatch of inbound chat messages to a single worker task per room
// ABOUTME: Serializes ingest within a room; idle workers exit and empty rooms drop their history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::SendError, UnboundedSender};
use tokio::sync::oneshot;
use tracing::{debug, error, trace, warn};

use super::orchestrator::{IngestReport, MessageIngestOrchestrator};
use crate::protocol::InboundMessage;
use crate::rooms::ConnectionId;

struct IngestJob {
    message: InboundMessage,
    origin: Option<ConnectionId>,
    reply: oneshot::Sender<IngestReport>,
}

/// Queues inbound messages per room and ingests them in arrival order
#[derive(Clone)]
pub struct RoomDispatcher {
    orchestrator: Arc<MessageIngestOrchestrator>,
    queues: Arc<DashMap<String, UnboundedSender<IngestJob>>>,
}

impl RoomDispatcher {
    /// Create a dispatcher with no running workers
    #[must_use]
    pub fn new(orchestrator: Arc<MessageIngestOrchestrator>) -> Self {
        Self {
            orchestrator,
            queues: Arc::new(DashMap::new()),
        }
    }

    /// Orchestrator the workers run
    #[must_use]
    pub fn orchestrator(&self) -> &Arc<MessageIngestOrchestrator> {
        &self.orchestrator
    }

    /// Queue a message for its room
    ///
    /// The receiver resolves once the message has been broadcast; dropping it
    /// does not cancel the ingest. Must be called inside a tokio runtime.
    pub fn submit(
        &self,
        message: InboundMessage,
        origin: Option<ConnectionId>,
    ) -> oneshot::Receiver<IngestReport> {
        let (reply, receiver) = oneshot::channel();
        let room_id = message.room_id.clone();
        let job = IngestJob {
            message,
            origin,
            reply,
        };

        // Send while holding the entry; a worker's idle check takes the same lock
        let mut sender = self
            .queues
            .entry(room_id.clone())
            .or_insert_with(|| self.spawn_worker(&room_id));

        if let Err(SendError(job)) = sender.send(job) {
            warn!(%room_id, "Room worker stopped, restarting");
            *sender = self.spawn_worker(&room_id);
            if sender.send(job).is_err() {
                error!(%room_id, "Failed to queue message on restarted room worker");
            }
        }
        drop(sender);

        receiver
    }

    /// Number of rooms with a running worker
    #[must_use]
    pub fn active_rooms(&self) -> usize {
        self.queues.len()
    }

    /// Release translation history for `room_id` once it has no members
    /// and no queued messages
    ///
    /// Returns whether a history buffer was dropped.
    pub fn release_idle_room(&self, room_id: &str) -> bool {
        if self.queues.contains_key(room_id) {
            return false;
        }
        release_if_empty(&self.orchestrator, room_id)
    }

    fn spawn_worker(&self, room_id: &str) -> UnboundedSender<IngestJob> {
        let (tx, mut rx) = mpsc::unbounded_channel::<IngestJob>();
        let own_tx = tx.clone();
        let orchestrator = Arc::clone(&self.orchestrator);
        let queues = Arc::clone(&self.queues);
        let room_id = room_id.to_owned();

        tokio::spawn(async move {
            debug!(%room_id, "Room worker started");
            while let Some(job) = rx.recv().await {
                let report = orchestrator.ingest(job.message, job.origin).await;
                if job.reply.send(report).is_err() {
                    trace!(%room_id, "Ingest report dropped by caller");
                }

                let drained = queues
                    .remove_if(&room_id, |_, queued| {
                        queued.same_channel(&own_tx) && rx.is_empty()
                    })
                    .is_some();
                if drained {
                    release_if_empty(&orchestrator, &room_id);
                    break;
                }
            }
            debug!(%room_id, "Room worker stopped");
        });

        tx
    }
}

fn release_if_empty(orchestrator: &MessageIngestOrchestrator, room_id: &str) -> bool {
    if orchestrator.rooms().is_active(room_id) {
        return false;
    }
    let released = orchestrator.history().release(room_id);
    if released {
        debug!(%room_id, "Released history of empty room");
    }
    released
}

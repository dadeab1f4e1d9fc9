// ABOUTME: WebSocket wire protocol for chat rooms using an event/data JSON envelope
// ABOUTME: Parses inbound client events and serializes outbound server events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Socket Protocol
//!
//! Every text frame carries one envelope:
//!
//! ```json
//! {"event": "outgoing", "data": {"rid": "room42", "message": "Hello", ...}}
//! ```
//!
//! Inbound payload fields are optional at the serde level so that a missing
//! field can be reported by name instead of as a generic parse failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::events;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Events sent by clients
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Join a room
    JoinChat(RoomPayload),
    /// Leave a room
    LeaveChat(RoomPayload),
    /// Send a message to a room
    Outgoing(OutgoingPayload),
}

impl ClientEvent {
    /// Parse a text frame
    ///
    /// # Errors
    ///
    /// Returns `INVALID_FORMAT` for malformed JSON or an unknown event name
    pub fn parse(frame: &str) -> AppResult<Self> {
        serde_json::from_str(frame)
            .map_err(|e| AppError::new(ErrorCode::InvalidFormat, format!("Invalid event: {e}")))
    }

    /// Wire name of the event
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::JoinChat(_) => events::JOIN_CHAT,
            Self::LeaveChat(_) => events::LEAVE_CHAT,
            Self::Outgoing(_) => events::OUTGOING,
        }
    }
}

/// Payload of `join-chat` and `leave-chat`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomPayload {
    /// Room id
    pub rid: Option<Value>,
}

impl RoomPayload {
    /// Room id as text
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` when `rid` is absent
    pub fn room_id(&self) -> AppResult<String> {
        required_text(self.rid.as_ref(), "rid")
    }
}

/// Payload of `outgoing`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutgoingPayload {
    /// Room id
    pub rid: Option<Value>,
    /// Client timestamp (string or number)
    pub timestamp: Option<Value>,
    /// Message text
    pub message: Option<Value>,
    /// Sender id (string or number)
    pub sender_id: Option<Value>,
    /// Sender display name
    pub sender_username: Option<Value>,
    /// Target language code
    pub selected_language: Option<Value>,
}

impl OutgoingPayload {
    /// Check required fields and apply the language default
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` naming the first absent field, or
    /// `INVALID_FORMAT` when a field is an object or array
    pub fn validate(&self, default_language: &str) -> AppResult<InboundMessage> {
        let selected_language = match self.selected_language.as_ref() {
            None | Some(Value::Null) => default_language.to_owned(),
            Some(value) => {
                let language = scalar_text(value, "selected_language")?;
                if language.trim().is_empty() {
                    default_language.to_owned()
                } else {
                    language
                }
            }
        };

        Ok(InboundMessage {
            room_id: required_text(self.rid.as_ref(), "rid")?,
            timestamp: required_text(self.timestamp.as_ref(), "timestamp")?,
            message: required_text(self.message.as_ref(), "message")?,
            sender_id: required_text(self.sender_id.as_ref(), "sender_id")?,
            sender_username: required_text(self.sender_username.as_ref(), "sender_username")?,
            selected_language,
        })
    }
}

/// A validated chat message on its way into the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Room id
    pub room_id: String,
    /// Client timestamp as text
    pub timestamp: String,
    /// Original text
    pub message: String,
    /// Sender id as text
    pub sender_id: String,
    /// Sender display name
    pub sender_username: String,
    /// Target language code
    pub selected_language: String,
}

fn required_text(value: Option<&Value>, field: &str) -> AppResult<String> {
    match value {
        None | Some(Value::Null) => Err(AppError::missing_field(field)),
        Some(value) => scalar_text(value, field),
    }
}

fn scalar_text(value: &Value, field: &str) -> AppResult<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Err(AppError::missing_field(field)),
        Value::Array(_) | Value::Object(_) => Err(AppError::new(
            ErrorCode::InvalidFormat,
            format!("Field {field} must be a string or number"),
        )
        .with_resource_id(field)),
    }
}

/// Events sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Presence announcement after a join
    JoinedChat {
        /// "<room> is now online."
        msg: String,
    },
    /// A translated chat message
    Message {
        /// Translated text
        message: String,
        /// Client timestamp of the original message
        timestamp: String,
        /// Sender display name
        sender_username: String,
    },
    /// A rejected inbound event
    Error {
        /// Stable error code
        code: ErrorCode,
        /// Human-readable reason
        message: String,
    },
}

impl ServerEvent {
    /// Presence announcement for `room_id`
    #[must_use]
    pub fn joined(room_id: &str) -> Self {
        Self::JoinedChat {
            msg: format!("{room_id} is now online."),
        }
    }

    /// Wire name of the event
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::JoinedChat { .. } => events::JOINED_CHAT,
            Self::Message { .. } => events::MESSAGE,
            Self::Error { .. } => events::ERROR,
        }
    }

    /// Serialize to a text frame
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_frame(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<&AppError> for ServerEvent {
    fn from(error: &AppError) -> Self {
        Self::Error {
            code: error.code,
            message: error.message.clone(),
        }
    }
}

//! WebSocket message DTOs.
//!
//! Field names and order are part of the wire format consumed by existing
//! clients and must not change.

use serde::{Deserialize, Serialize};

/// `type` tag of server-generated notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    UserInactive,
    Error,
}

/// Chat message fanned out to the other sessions in a room
///
/// `{"id":"..","username":"..","messageContent":"..","ts":<millis>}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub username: String,
    #[serde(rename = "messageContent")]
    pub message_content: String,
    pub ts: i64,
}

/// Notification that a user was evicted for inactivity
///
/// `{"type":"userInactive","user":".."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInactiveMessage {
    pub r#type: MessageType,
    pub user: String,
}

/// Error notice sent back to the sender only
///
/// `{"type":"error","message":".."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub r#type: MessageType,
    pub message: String,
}

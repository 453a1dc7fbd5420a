//! Conversion logic between DTOs and domain entities.

use crate::domain::{BroadcastMessage, Username};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&BroadcastMessage> for dto::ChatMessage {
    fn from(model: &BroadcastMessage) -> Self {
        Self {
            id: model.id.clone(),
            username: model.username.as_str().to_string(),
            message_content: model.content.clone(),
            ts: model.timestamp.value(),
        }
    }
}

impl From<&Username> for dto::UserInactiveMessage {
    fn from(username: &Username) -> Self {
        Self {
            r#type: dto::MessageType::UserInactive,
            user: username.as_str().to_string(),
        }
    }
}

impl dto::ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            r#type: dto::MessageType::Error,
            message: message.into(),
        }
    }
}

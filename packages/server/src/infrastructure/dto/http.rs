//! HTTP API response DTOs.

use chrono::TimeZone;
use serde::Serialize;

use crate::domain::StoredMessage;
use roomcast_shared::time::format_timestamp_in;

/// Error body returned by the HTTP endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponseDto {
    pub error: String,
}

/// Render one history entry as `"[<local-timestamp>] <username>: <message>"`
///
/// Timestamps outside the representable range fall back to the raw millisecond value.
pub fn format_history_line<Tz: TimeZone>(message: &StoredMessage, tz: &Tz) -> String {
    let time = format_timestamp_in(message.timestamp, tz)
        .unwrap_or_else(|| message.timestamp.to_string());
    format!("[{}] {}: {}", time, message.username, message.content)
}

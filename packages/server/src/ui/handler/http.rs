//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Local;

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{ErrorResponseDto, format_history_line},
    ui::state::AppState,
    usecase::HistoryError,
};

type ApiError = (StatusCode, Json<ErrorResponseDto>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponseDto {
            error: error.to_string(),
        }),
    )
}

fn parse_room_id(room_id: String) -> Result<RoomId, ApiError> {
    RoomId::new(room_id).map_err(|e| api_error(StatusCode::BAD_REQUEST, e))
}

impl From<HistoryError> for ApiError {
    fn from(e: HistoryError) -> Self {
        let status = match e {
            HistoryError::Log(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HistoryError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        };
        api_error(status, e)
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get the chat history of a room as formatted lines
pub async fn get_chat_history(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let room_id = parse_room_id(room_id)?;
    let history = state
        .chat_history_usecase
        .history(&room_id)
        .await
        .inspect_err(|e| tracing::warn!("Failed to read history of room '{}': {}", room_id, e))?;

    // Domain Model から DTO への変換
    let lines = history
        .iter()
        .map(|message| format_history_line(message, &Local))
        .collect();
    Ok(Json(lines))
}

/// Delete the chat history of a room
pub async fn clear_chat_history(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let room_id = parse_room_id(room_id)?;
    state
        .chat_history_usecase
        .clear(&room_id)
        .await
        .inspect_err(|e| tracing::warn!("Failed to clear history of room '{}': {}", room_id, e))?;
    Ok(StatusCode::NO_CONTENT)
}

//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{RoomId, Session, Username},
    infrastructure::{
        dto::websocket::ErrorMessage,
        message_pusher::{OUTBOUND_QUEUE_CAPACITY, WebSocketSessionSink},
    },
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    /// 表示名。省略時・空文字のときは "anonymous"
    pub username: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert String -> RoomId (Domain Model)
    let room_id = match RoomId::new(room_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Rejecting WebSocket connection: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };
    let username = Username::from_query(query.username);

    tracing::debug!(
        "Upgrading connection for '{}' in room '{}'",
        username,
        room_id
    );
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room_id, username)))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// Broadcasts only enqueue into the bounded channel. A send to a client whose queue stays
/// full is cut off by the registry's per-send timeout.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    room_id: RoomId,
    username: Username,
) {
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
    let session = Session::new(username, Arc::new(WebSocketSessionSink::new(tx)));

    state
        .connection_handler
        .on_open(session.clone(), &room_id)
        .await;

    // Spawn a task to push messages from the room to this client
    let mut send_task = pusher_loop(rx, sender);

    // Spawn a task to receive messages from this client.
    // Frames are handled one at a time so messages from one connection stay in order.
    let handler = state.connection_handler.clone();
    let recv_session = session.clone();
    let recv_room_id = room_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on session '{}': {}", recv_session.id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!(
                        "Received text from '{}' in room '{}'",
                        recv_session.username,
                        recv_room_id
                    );
                    if let Err(e) = handler
                        .on_message(&recv_session, &recv_room_id, text.to_string())
                        .await
                    {
                        tracing::warn!(
                            "Dropping message from '{}' in room '{}': {}",
                            recv_session.username,
                            recv_room_id,
                            e
                        );
                        notify_error(&recv_session, &e.to_string()).await;
                    }
                }
                Message::Ping(_) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::debug!("Session '{}' requested close", recv_session.id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.connection_handler.on_close(&session, &room_id).await;
}

/// 送信者本人にだけエラーフレームを返す
async fn notify_error(session: &Session, message: &str) {
    let frame = match serde_json::to_string(&ErrorMessage::new(message)) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!("Failed to encode error frame: {}", e);
            return;
        }
    };
    if let Err(e) = session.send(&frame).await {
        tracing::debug!("Could not deliver error frame to '{}': {}", session.id, e);
    }
}

//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::usecase::{ChatHistoryUseCase, ConnectionHandler};

use super::{
    handler::{clear_chat_history, get_chat_history, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Build the application router
///
/// - `GET /{room_id}?username=<name>`: WebSocket endpoint for a room
/// - `GET /chat/{room_id}`, `DELETE /chat/{room_id}`: chat history
/// - `GET /api/health`: health check
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route(
            "/chat/{room_id}",
            get(get_chat_history).delete(clear_chat_history),
        )
        // WebSocket エンドポイント
        .route("/{room_id}", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Room broadcast server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(coordinator, chat_history_usecase);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    connection_handler: Arc<dyn ConnectionHandler>,
    chat_history_usecase: Arc<ChatHistoryUseCase>,
}

impl Server {
    pub fn new(
        connection_handler: Arc<dyn ConnectionHandler>,
        chat_history_usecase: Arc<ChatHistoryUseCase>,
    ) -> Self {
        Self {
            connection_handler,
            chat_history_usecase,
        }
    }

    /// Run the server until a shutdown signal is received
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app_state = Arc::new(AppState {
            connection_handler: self.connection_handler,
            chat_history_usecase: self.chat_history_usecase,
        });
        let app = router(app_state);

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Roomcast server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/<room_id>?username=<name>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

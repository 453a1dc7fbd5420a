//! Shared application state.

use std::sync::Arc;

use crate::usecase::{ChatHistoryUseCase, ConnectionHandler};

/// Shared application state
pub struct AppState {
    /// 接続ライフサイクルのフック（RoomCoordinator）
    pub connection_handler: Arc<dyn ConnectionHandler>,
    /// ChatHistoryUseCase（チャット履歴の取得・削除）
    pub chat_history_usecase: Arc<ChatHistoryUseCase>,
}

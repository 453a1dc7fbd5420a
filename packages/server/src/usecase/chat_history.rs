//! UseCase: チャット履歴の取得・削除
//!
//! ルームのメッセージログ（`chat:<room>`）を読み出し、または削除します。

use std::{sync::Arc, time::Duration};

use crate::domain::{MessageLog, RoomId, StoredMessage};

use super::error::HistoryError;

/// チャット履歴のユースケース
pub struct ChatHistoryUseCase {
    message_log: Arc<dyn MessageLog>,
    timeout: Duration,
}

impl ChatHistoryUseCase {
    pub fn new(message_log: Arc<dyn MessageLog>, timeout: Duration) -> Self {
        Self {
            message_log,
            timeout,
        }
    }

    /// ルームの履歴をログの順序で取得
    pub async fn history(&self, room_id: &RoomId) -> Result<Vec<StoredMessage>, HistoryError> {
        let entries = tokio::time::timeout(
            self.timeout,
            self.message_log.read_all(&room_id.log_key()),
        )
        .await
        .map_err(|_| HistoryError::Timeout)??;

        tracing::debug!("Read {} message(s) from room '{}'", entries.len(), room_id);
        Ok(entries.into_iter().map(StoredMessage::from).collect())
    }

    /// ルームの履歴を削除（履歴がなければ何もしない）
    pub async fn clear(&self, room_id: &RoomId) -> Result<(), HistoryError> {
        tokio::time::timeout(self.timeout, self.message_log.clear(&room_id.log_key()))
            .await
            .map_err(|_| HistoryError::Timeout)??;

        tracing::info!("Cleared chat history of room '{}'", room_id);
        Ok(())
    }
}

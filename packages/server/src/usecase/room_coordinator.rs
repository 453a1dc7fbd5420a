//! UseCase: 接続のライフサイクル処理
//!
//! WebSocket アダプタから接続ごとに逐次呼ばれる 3 つのフック
//! （`on_open` / `on_message` / `on_close`）を実装します。
//!
//! ## 接続の状態
//!
//! `Connecting → Open → Closed`。再開はありません。
//!
//! ## メッセージ送信の順序
//!
//! 1. メッセージログに追記（タイムアウト付き）
//! 2. ログが採番した ID と現在時刻からブロードキャストメッセージを組み立てる
//! 3. 送信者以外にブロードキャスト
//! 4. 送信者のプレゼンスを更新
//!
//! 追記に失敗した場合はブロードキャストせずにエラーを返します。

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    domain::{BroadcastMessage, MessageLog, RoomId, Session, Timestamp},
    infrastructure::{dto::websocket::ChatMessage, message_pusher::SessionRegistry},
};
use roomcast_shared::time::Clock;

use super::{error::SendMessageError, presence_tracker::PresenceTracker};

/// 接続ライフサイクルのフック
///
/// トランスポート側は 1 接続につき `on_open` → `on_message`* → `on_close` の順で、
/// 同じ接続のフックを並行に呼ばないこと。
#[async_trait]
pub trait ConnectionHandler: Send + Sync {
    async fn on_open(&self, session: Session, room_id: &RoomId);

    /// 受信したテキストを永続化してルームにブロードキャスト
    ///
    /// # Errors
    ///
    /// メッセージログへの追記が失敗またはタイムアウトした場合（ブロードキャストは行われない）
    async fn on_message(
        &self,
        session: &Session,
        room_id: &RoomId,
        text: String,
    ) -> Result<BroadcastMessage, SendMessageError>;

    async fn on_close(&self, session: &Session, room_id: &RoomId);
}

/// ルームコーディネーター
pub struct RoomCoordinator {
    registry: Arc<SessionRegistry>,
    presence: Arc<PresenceTracker>,
    message_log: Arc<dyn MessageLog>,
    clock: Arc<dyn Clock>,
    /// メッセージログへの追記のタイムアウト
    append_timeout: Duration,
}

impl RoomCoordinator {
    pub fn new(
        registry: Arc<SessionRegistry>,
        presence: Arc<PresenceTracker>,
        message_log: Arc<dyn MessageLog>,
        clock: Arc<dyn Clock>,
        append_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            presence,
            message_log,
            clock,
            append_timeout,
        }
    }
}

#[async_trait]
impl ConnectionHandler for RoomCoordinator {
    async fn on_open(&self, session: Session, room_id: &RoomId) {
        tracing::info!(
            "Session '{}' ({}) opened in room '{}'",
            session.id,
            session.username,
            room_id
        );
        self.presence.mark_active(room_id, &session.username).await;
        self.registry.add_session(room_id, session);
    }

    async fn on_message(
        &self,
        session: &Session,
        room_id: &RoomId,
        text: String,
    ) -> Result<BroadcastMessage, SendMessageError> {
        let timestamp = Timestamp::new(self.clock.now_millis());
        let fields = BroadcastMessage::log_fields(&session.username, &text, timestamp);

        let id = tokio::time::timeout(
            self.append_timeout,
            self.message_log.append(&room_id.log_key(), fields),
        )
        .await
        .map_err(|_| SendMessageError::PersistTimeout)??;

        let message = BroadcastMessage::new(id, session.username.clone(), text, timestamp);
        let payload = serde_json::to_string(&ChatMessage::from(&message))
            .map_err(|e| SendMessageError::Encode(e.to_string()))?;

        let report = self
            .registry
            .broadcast(room_id, &payload, Some(&session.id))
            .await;
        tracing::debug!(
            "Message '{}' from '{}' delivered to {} session(s) in room '{}'",
            message.id,
            session.username,
            report.delivered,
            room_id
        );

        self.presence.mark_active(room_id, &session.username).await;

        Ok(message)
    }

    async fn on_close(&self, session: &Session, room_id: &RoomId) {
        self.registry.remove_session(room_id, &session.id);
        self.presence.remove_user(room_id, &session.username).await;
        tracing::info!(
            "Session '{}' ({}) closed in room '{}'",
            session.id,
            session.username,
            room_id
        );
    }
}

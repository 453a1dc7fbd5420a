//! WebSocket を使った SessionSink 実装
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された有界の `Sender` を受け取り、送信に使用します。
//! 実際のソケットへの書き込みは UI 層の pusher ループが担当します。
//! キューが満杯の間は送信が空きを待つため、遅いクライアントへの送信は
//! `SessionRegistry` の送信タイムアウトで打ち切られます。

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{SessionSendError, SessionSink};

/// 1 接続あたりのアウトバウンドキューに溜められるフレーム数
pub const OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// WebSocket 接続のアウトバウンドチャンネル
pub type PusherChannel = mpsc::Sender<String>;

/// WebSocket を使った SessionSink 実装
pub struct WebSocketSessionSink {
    sender: PusherChannel,
}

impl WebSocketSessionSink {
    pub fn new(sender: PusherChannel) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl SessionSink for WebSocketSessionSink {
    async fn send(&self, text: &str) -> Result<(), SessionSendError> {
        self.sender
            .send(text.to_string())
            .await
            .map_err(|_| SessionSendError::Closed)
    }

    fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

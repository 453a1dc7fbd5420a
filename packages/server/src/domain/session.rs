//! セッション（接続 1 本）とその送信口
//!
//! トランスポートの具体的な実装（WebSocket など）は `SessionSink` の背後に隠し、
//! コアは「送信できたか」と「接続が開いているか」だけを扱います。

use std::{fmt, sync::Arc};

use async_trait::async_trait;

use super::{
    error::SessionSendError,
    value_object::{SessionId, Username},
};

/// セッションへの送信口
#[async_trait]
pub trait SessionSink: Send + Sync {
    /// テキストフレームを送信
    async fn send(&self, text: &str) -> Result<(), SessionSendError>;

    /// 接続が開いているか
    fn is_open(&self) -> bool;
}

/// 開いている接続 1 本
///
/// 同一性は `SessionId` のみで判定します（同じユーザー名の接続が複数あってもよい）。
#[derive(Clone)]
pub struct Session {
    pub id: SessionId,
    pub username: Username,
    sink: Arc<dyn SessionSink>,
}

impl Session {
    /// 新しい Session を作成（SessionId は新規に採番）
    pub fn new(username: Username, sink: Arc<dyn SessionSink>) -> Self {
        Self {
            id: SessionId::generate(),
            username,
            sink,
        }
    }

    pub fn is_open(&self) -> bool {
        self.sink.is_open()
    }

    pub async fn send(&self, text: &str) -> Result<(), SessionSendError> {
        self.sink.send(text).await
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Session {}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("open", &self.is_open())
            .finish()
    }
}

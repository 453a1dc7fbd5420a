//! UseCase layer errors.

use thiserror::Error;

use crate::domain::{MessageLogError, PresenceStoreError};

/// メッセージ送信のエラー（送信者に通知する）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("failed to persist message: {0}")]
    PersistFailed(#[from] MessageLogError),

    #[error("timed out persisting message")]
    PersistTimeout,

    #[error("failed to encode message: {0}")]
    Encode(String),
}

/// プレゼンス参照のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    #[error(transparent)]
    Store(#[from] PresenceStoreError),

    #[error("timed out querying presence store")]
    Timeout,
}

/// チャット履歴の取得・削除のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Log(#[from] MessageLogError),

    #[error("timed out accessing message log")]
    Timeout,
}

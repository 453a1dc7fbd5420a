//! Domain layer errors.

use thiserror::Error;

/// 値オブジェクトの生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must not be empty")]
    RoomIdEmpty,

    #[error("username must not be empty")]
    UsernameEmpty,
}

/// メッセージログ（外部コラボレーター）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageLogError {
    #[error("message log unavailable: {0}")]
    Unavailable(String),

    #[error("message log returned malformed data: {0}")]
    Malformed(String),
}

/// プレゼンスストア（外部コラボレーター）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceStoreError {
    #[error("presence store unavailable: {0}")]
    Unavailable(String),
}

/// セッションへの送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionSendError {
    #[error("session is closed")]
    Closed,

    #[error("send failed: {0}")]
    Failed(String),
}

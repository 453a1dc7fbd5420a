//! エンティティ
//!
//! - `BroadcastMessage`: ルームにブロードキャストされるチャットメッセージ（永続化しない値）
//! - `LogEntry`: メッセージログに格納された 1 エントリ
//! - `StoredMessage`: 履歴として読み出したメッセージ

use super::{
    repository::{FIELD_MESSAGE, FIELD_TIMESTAMP, FIELD_USERNAME, LogFields},
    value_object::{Timestamp, Username},
};

/// ルームにブロードキャストされるチャットメッセージ
///
/// 送信時にメッセージログが採番した ID と現在時刻から組み立てます。
/// コア自身は保存しません（system of record はメッセージログ）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    pub id: String,
    pub username: Username,
    pub content: String,
    pub timestamp: Timestamp,
}

impl BroadcastMessage {
    pub fn new(id: String, username: Username, content: String, timestamp: Timestamp) -> Self {
        Self {
            id,
            username,
            content,
            timestamp,
        }
    }

    /// メッセージログに追記するフィールド
    pub fn log_fields(username: &Username, content: &str, timestamp: Timestamp) -> LogFields {
        LogFields::from([
            (FIELD_USERNAME.to_string(), username.as_str().to_string()),
            (FIELD_MESSAGE.to_string(), content.to_string()),
            (FIELD_TIMESTAMP.to_string(), timestamp.value().to_string()),
        ])
    }
}

/// メッセージログに格納された 1 エントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: String,
    pub fields: LogFields,
}

impl LogEntry {
    pub fn new(id: String, fields: LogFields) -> Self {
        Self { id, fields }
    }
}

/// 履歴として読み出したメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: String,
    pub username: String,
    pub content: String,
    /// 送信時刻（ミリ秒）。ログに記録がなければ 0
    pub timestamp: i64,
}

impl From<LogEntry> for StoredMessage {
    fn from(entry: LogEntry) -> Self {
        let LogEntry { id, mut fields } = entry;
        let timestamp = fields
            .get(FIELD_TIMESTAMP)
            .and_then(|value| value.parse::<i64>().ok())
            .unwrap_or(0);
        Self {
            id,
            username: fields.remove(FIELD_USERNAME).unwrap_or_default(),
            content: fields.remove(FIELD_MESSAGE).unwrap_or_default(),
            timestamp,
        }
    }
}

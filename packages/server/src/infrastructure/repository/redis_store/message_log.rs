//! Redis Streams を使った MessageLog 実装

use async_trait::async_trait;
use redis::{Value, aio::ConnectionManager};

use crate::domain::{LogEntry, LogFields, MessageLog, MessageLogError};

/// Redis Streams Message Log 実装
///
/// エントリ ID は Redis が採番します（`XADD <key> *`）。
#[derive(Clone)]
pub struct RedisMessageLog {
    conn: ConnectionManager,
}

impl RedisMessageLog {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

fn unavailable(e: redis::RedisError) -> MessageLogError {
    MessageLogError::Unavailable(e.to_string())
}

fn parse_entry(value: &Value) -> Result<LogEntry, MessageLogError> {
    let (id, flat): (String, Vec<String>) = redis::from_redis_value(value)
        .map_err(|e| MessageLogError::Malformed(e.to_string()))?;
    Ok(LogEntry::new(id, pairs_to_fields(flat)?))
}

/// `[field1, value1, field2, value2, ...]` をフィールドのマップに変換
fn pairs_to_fields(flat: Vec<String>) -> Result<LogFields, MessageLogError> {
    if flat.len() % 2 != 0 {
        return Err(MessageLogError::Malformed(format!(
            "expected field/value pairs, got {} items",
            flat.len()
        )));
    }

    let mut fields = LogFields::new();
    let mut items = flat.into_iter();
    while let (Some(field), Some(value)) = (items.next(), items.next()) {
        fields.insert(field, value);
    }
    Ok(fields)
}

#[async_trait]
impl MessageLog for RedisMessageLog {
    async fn append(&self, key: &str, fields: LogFields) -> Result<String, MessageLogError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("XADD");
        cmd.arg(key).arg("*");
        for (field, value) in &fields {
            cmd.arg(field).arg(value);
        }
        let id: String = cmd.query_async(&mut conn).await.map_err(unavailable)?;
        tracing::debug!("Appended entry '{}' to '{}'", id, key);
        Ok(id)
    }

    async fn read_all(&self, key: &str) -> Result<Vec<LogEntry>, MessageLogError> {
        let mut conn = self.conn.clone();
        let reply: Vec<Value> = redis::cmd("XRANGE")
            .arg(key)
            .arg("-")
            .arg("+")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        reply.iter().map(parse_entry).collect()
    }

    async fn clear(&self, key: &str) -> Result<(), MessageLogError> {
        let mut conn = self.conn.clone();
        let deleted: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        tracing::debug!("Deleted '{}' ({} key(s))", key, deleted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_to_fields() {
        // テスト項目: フラットなフィールド列がマップに変換される
        // given (前提条件):
        let flat = vec![
            "username".to_string(),
            "bob".to_string(),
            "message".to_string(),
            "hi".to_string(),
        ];

        // when (操作):
        let fields = pairs_to_fields(flat).unwrap();

        // then (期待する結果):
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("username").unwrap(), "bob");
        assert_eq!(fields.get("message").unwrap(), "hi");
    }

    #[test]
    fn test_pairs_to_fields_odd_length() {
        // テスト項目: 値の欠けたフィールド列は Malformed エラーになる
        // given (前提条件):
        let flat = vec!["username".to_string()];

        // when (操作):
        let result = pairs_to_fields(flat);

        // then (期待する結果):
        assert!(matches!(result, Err(MessageLogError::Malformed(_))));
    }

    #[test]
    fn test_parse_entry_from_stream_reply() {
        // テスト項目: XRANGE の 1 エントリ分の応答が LogEntry に変換される
        // given (前提条件):
        let value = Value::Array(vec![
            Value::BulkString(b"1700000000000-0".to_vec()),
            Value::Array(vec![
                Value::BulkString(b"username".to_vec()),
                Value::BulkString(b"bob".to_vec()),
            ]),
        ]);

        // when (操作):
        let entry = parse_entry(&value).unwrap();

        // then (期待する結果):
        assert_eq!(entry.id, "1700000000000-0");
        assert_eq!(entry.fields.get("username").unwrap(), "bob");
    }
}

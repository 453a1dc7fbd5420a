//! InMemory Message Log 実装
//!
//! ドメイン層が定義する MessageLog trait の具体的な実装。
//! キーごとに追記専用のエントリ列を保持します。
//!
//! エントリ ID は Redis Streams と同じ `<ミリ秒>-<連番>` 形式で、
//! 同じキーの中では常に単調増加します（時計が巻き戻っても増加を保ちます）。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{LogEntry, LogFields, MessageLog, MessageLogError};
use roomcast_shared::time::Clock;

#[derive(Debug, Default)]
struct Stream {
    last_id: Option<(i64, u64)>,
    entries: Vec<LogEntry>,
}

impl Stream {
    fn next_id(&mut self, now_millis: i64) -> String {
        let id = match self.last_id {
            Some((last_millis, seq)) if now_millis <= last_millis => (last_millis, seq + 1),
            _ => (now_millis, 0),
        };
        self.last_id = Some(id);
        format!("{}-{}", id.0, id.1)
    }
}

/// インメモリ Message Log 実装
pub struct InMemoryMessageLog {
    streams: Mutex<HashMap<String, Stream>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageLog {
    /// 新しい InMemoryMessageLog を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            streams: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn append(&self, key: &str, fields: LogFields) -> Result<String, MessageLogError> {
        let now = self.clock.now_millis();
        let mut streams = self.streams.lock().await;
        let stream = streams.entry(key.to_string()).or_default();
        let id = stream.next_id(now);
        stream.entries.push(LogEntry::new(id.clone(), fields));
        tracing::debug!("Appended entry '{}' to '{}'", id, key);
        Ok(id)
    }

    async fn read_all(&self, key: &str) -> Result<Vec<LogEntry>, MessageLogError> {
        let streams = self.streams.lock().await;
        Ok(streams
            .get(key)
            .map(|stream| stream.entries.clone())
            .unwrap_or_default())
    }

    async fn clear(&self, key: &str) -> Result<(), MessageLogError> {
        let mut streams = self.streams.lock().await;
        streams.remove(key);
        Ok(())
    }
}

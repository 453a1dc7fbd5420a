//! Redis Sorted Set を使った PresenceStore 実装

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use crate::domain::{PresenceStore, PresenceStoreError};

/// Redis Sorted Set Presence Store 実装
#[derive(Clone)]
pub struct RedisPresenceStore {
    conn: ConnectionManager,
}

impl RedisPresenceStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

fn unavailable(e: redis::RedisError) -> PresenceStoreError {
    PresenceStoreError::Unavailable(e.to_string())
}

#[async_trait]
impl PresenceStore for RedisPresenceStore {
    async fn upsert(&self, key: &str, score: f64, member: &str) -> Result<(), PresenceStoreError> {
        let mut conn = self.conn.clone();
        let _added: i64 = redis::cmd("ZADD")
            .arg(key)
            .arg(score)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn remove(&self, key: &str, member: &str) -> Result<(), PresenceStoreError> {
        let mut conn = self.conn.clone();
        let _removed: i64 = redis::cmd("ZREM")
            .arg(key)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn range_by_score(
        &self,
        key: &str,
        upper_bound: f64,
    ) -> Result<Vec<String>, PresenceStoreError> {
        let mut conn = self.conn.clone();
        redis::cmd("ZRANGEBYSCORE")
            .arg(key)
            .arg("-inf")
            .arg(upper_bound)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)
    }
}

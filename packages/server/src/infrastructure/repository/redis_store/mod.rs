//! Redis 実装
//!
//! - メッセージログ: Redis Streams（`XADD` / `XRANGE` / `DEL`）
//! - プレゼンスストア: Sorted Set（`ZADD` / `ZREM` / `ZRANGEBYSCORE`）
//!
//! 両方の実装で 1 つの `ConnectionManager` を共有します。切断時は自動的に再接続されます。

mod message_log;
mod presence_store;

pub use message_log::RedisMessageLog;
pub use presence_store::RedisPresenceStore;

use redis::aio::ConnectionManager;

/// Redis に接続する
///
/// # Errors
///
/// URL が不正な場合、または接続に失敗した場合にエラーを返します。
pub async fn connect(url: &str) -> Result<ConnectionManager, redis::RedisError> {
    let client = redis::Client::open(url)?;
    let manager = client.get_connection_manager().await?;
    tracing::info!("Connected to Redis at {}", url);
    Ok(manager)
}

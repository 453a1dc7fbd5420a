//! Repository（外部コラボレーター）の実装
//!
//! - `inmemory`: プロセス内で完結する実装（開発・テスト用、既定）
//! - `redis_store`: Redis Streams / Sorted Sets を使った実装

pub mod inmemory;
pub mod redis_store;

pub use inmemory::{InMemoryMessageLog, InMemoryPresenceStore};
pub use redis_store::{RedisMessageLog, RedisPresenceStore};

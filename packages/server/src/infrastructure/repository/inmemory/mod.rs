//! InMemory 実装

mod message_log;
mod presence_store;

pub use message_log::InMemoryMessageLog;
pub use presence_store::InMemoryPresenceStore;

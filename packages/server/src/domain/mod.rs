//! Domain layer
//!
//! 値オブジェクト、エンティティ、外部コラボレーター（メッセージログ、プレゼンスストア、
//! 接続トランスポート）のインターフェースを定義します。

pub mod entity;
pub mod error;
pub mod repository;
pub mod session;
pub mod value_object;

pub use entity::{BroadcastMessage, LogEntry, StoredMessage};
pub use error::{MessageLogError, PresenceStoreError, SessionSendError, ValueObjectError};
pub use repository::{LogFields, MessageLog, PresenceStore};
pub use session::{Session, SessionSink};
pub use value_object::{RoomId, SessionId, Timestamp, Username};

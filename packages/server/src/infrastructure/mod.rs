//! Infrastructure layer
//!
//! - `dto`: WebSocket / HTTP のワイヤーフォーマット
//! - `message_pusher`: 接続中セッションの管理とブロードキャスト
//! - `repository`: メッセージログ・プレゼンスストアの実装

pub mod dto;
pub mod message_pusher;
pub mod repository;

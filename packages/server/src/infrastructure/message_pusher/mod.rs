//! メッセージ送信（通知）の実装
//!
//! ## 概要
//!
//! - `session_registry`: ルーム → 接続中セッションの対応表とブロードキャスト
//! - `websocket`: WebSocket 接続への送信口（`SessionSink` 実装）

pub mod session_registry;
pub mod websocket;

pub use session_registry::{BroadcastReport, SessionRegistry};
pub use websocket::{OUTBOUND_QUEUE_CAPACITY, WebSocketSessionSink};

//! UseCase layer
//!
//! - `presence_tracker`: ユーザーの最終アクティブ時刻の管理
//! - `inactivity_sweeper`: 非アクティブなユーザーの定期的な検出と通知
//! - `room_coordinator`: 接続ライフサイクル（接続・メッセージ・切断）の処理
//! - `chat_history`: チャット履歴の取得・削除

pub mod chat_history;
pub mod error;
pub mod inactivity_sweeper;
pub mod presence_tracker;
pub mod room_coordinator;

pub use chat_history::ChatHistoryUseCase;
pub use error::{HistoryError, PresenceError, SendMessageError};
pub use inactivity_sweeper::{InactivitySweeper, SweepReport};
pub use presence_tracker::PresenceTracker;
pub use room_coordinator::{ConnectionHandler, RoomCoordinator};

//! Session Registry
//!
//! ## 責務
//!
//! - ルーム → 接続中セッションの対応表を排他的に所有する
//! - セッションの登録・登録解除
//! - ルーム内へのブロードキャスト（送信者の除外、閉じた接続のスキップ）
//!
//! ## 並行性
//!
//! 接続ごとのタスクとスイーパーから同時に呼ばれます。対応表は `DashMap` の入れ子
//! （ルーム → `SessionId` → `Session`）で、呼び出し側のロックは不要です。
//! ブロードキャストは送信対象をスナップショットしてから送信するため、
//! 送信中にシャードのロックを保持しません。途中で追加されたセッションが
//! そのブロードキャストを受け取るかどうかは不定です。

use std::{collections::HashSet, time::Duration};

use dashmap::DashMap;
use futures_util::future::join_all;

use crate::domain::{RoomId, Session, SessionId};

/// ブロードキャスト結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// 送信に成功したセッション数
    pub delivered: usize,
    /// 接続が閉じていたためスキップしたセッション数
    pub skipped_closed: usize,
    /// 送信に失敗した（タイムアウトを含む）セッション数
    pub failed: usize,
}

enum SendOutcome {
    Delivered,
    SkippedClosed,
    Failed,
}

/// ルームごとの接続中セッションを管理する
pub struct SessionRegistry {
    rooms: DashMap<RoomId, DashMap<SessionId, Session>>,
    /// セッション 1 つあたりの送信タイムアウト
    send_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            rooms: DashMap::new(),
            send_timeout,
        }
    }

    /// セッションをルームに登録（ルームがなければ作成）
    ///
    /// 同じ `SessionId` の登録は冪等です。
    pub fn add_session(&self, room_id: &RoomId, session: Session) {
        let session_id = session.id;
        let inserted = self
            .rooms
            .entry(room_id.clone())
            .or_default()
            .insert(session_id, session)
            .is_none();
        if inserted {
            tracing::debug!("Session '{}' added to room '{}'", session_id, room_id);
        }
    }

    /// セッションをルームから登録解除
    ///
    /// ルームやセッションが存在しなければ何もしません。空になったルームの
    /// エントリは残します。
    pub fn remove_session(&self, room_id: &RoomId, session_id: &SessionId) -> bool {
        let removed = self
            .rooms
            .get(room_id)
            .is_some_and(|sessions| sessions.remove(session_id).is_some());
        if removed {
            tracing::debug!("Session '{}' removed from room '{}'", session_id, room_id);
        }
        removed
    }

    /// ルーム内の開いている全セッションに送信（`exclude` を除く）
    ///
    /// 送信はセッションごとに並行して行い、それぞれに送信タイムアウトを適用します。
    /// 個々の失敗はログに記録して数えるだけで、他のセッションへの配送は続行します。
    pub async fn broadcast(
        &self,
        room_id: &RoomId,
        payload: &str,
        exclude: Option<&SessionId>,
    ) -> BroadcastReport {
        tracing::debug!("Broadcasting to room '{}'", room_id);

        let (room_size, targets) = self.snapshot_targets(room_id, exclude);
        if room_size == 0 {
            tracing::warn!("No sessions in room '{}'", room_id);
            return BroadcastReport::default();
        }

        let sends = targets
            .into_iter()
            .map(|session| self.send_one(room_id, session, payload));
        let outcomes = join_all(sends).await;

        let mut report = BroadcastReport::default();
        for outcome in outcomes {
            match outcome {
                SendOutcome::Delivered => report.delivered += 1,
                SendOutcome::SkippedClosed => report.skipped_closed += 1,
                SendOutcome::Failed => report.failed += 1,
            }
        }
        if report.failed > 0 {
            tracing::warn!(
                "Broadcast to room '{}' finished with {} failed send(s) ({} delivered)",
                room_id,
                report.failed,
                report.delivered
            );
        }
        report
    }

    /// セッションが 1 つ以上登録されたことのあるルーム（空のルームを含む）
    pub fn active_rooms(&self) -> HashSet<RoomId> {
        self.rooms.iter().map(|entry| entry.key().clone()).collect()
    }

    /// ルーム内のセッション（診断用）。存在しないルームは空
    pub fn sessions_in(&self, room_id: &RoomId) -> Vec<Session> {
        self.rooms
            .get(room_id)
            .map(|sessions| {
                sessions
                    .iter()
                    .map(|entry| entry.value().clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// ルーム内のセッション数
    pub fn session_count(&self, room_id: &RoomId) -> usize {
        self.rooms
            .get(room_id)
            .map(|sessions| sessions.len())
            .unwrap_or(0)
    }

    fn snapshot_targets(
        &self,
        room_id: &RoomId,
        exclude: Option<&SessionId>,
    ) -> (usize, Vec<Session>) {
        match self.rooms.get(room_id) {
            Some(sessions) => {
                let targets = sessions
                    .iter()
                    .filter(|entry| Some(entry.key()) != exclude)
                    .map(|entry| entry.value().clone())
                    .collect();
                (sessions.len(), targets)
            }
            None => (0, Vec::new()),
        }
    }

    async fn send_one(&self, room_id: &RoomId, session: Session, payload: &str) -> SendOutcome {
        if !session.is_open() {
            tracing::debug!(
                "Session '{}' in room '{}' is closed, skipping",
                session.id,
                room_id
            );
            return SendOutcome::SkippedClosed;
        }

        match tokio::time::timeout(self.send_timeout, session.send(payload)).await {
            Ok(Ok(())) => {
                tracing::debug!("Broadcasted message to session '{}'", session.id);
                SendOutcome::Delivered
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    "Failed to push message to session '{}' ({}): {}",
                    session.id,
                    session.username,
                    e
                );
                SendOutcome::Failed
            }
            Err(_) => {
                tracing::warn!(
                    "Timed out pushing message to session '{}' ({}) after {:?}",
                    session.id,
                    session.username,
                    self.send_timeout
                );
                SendOutcome::Failed
            }
        }
    }
}

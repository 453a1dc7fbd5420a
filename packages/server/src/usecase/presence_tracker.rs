//! UseCase: プレゼンス管理
//!
//! ユーザーごとの「最終アクティブ時刻」を、外部のプレゼンスストアに委譲して管理します。
//! このモジュール自身は状態を持ちません。
//!
//! プレゼンスはベストエフォートの生存管理であり、チャットの正しさには関わらないため、
//! `mark_active` / `remove_user` の失敗はログに記録するだけで呼び出し側には返しません。

use std::{sync::Arc, time::Duration};

use crate::domain::{PresenceStore, RoomId, Username};
use roomcast_shared::time::Clock;

use super::error::PresenceError;

/// プレゼンス管理
pub struct PresenceTracker {
    store: Arc<dyn PresenceStore>,
    clock: Arc<dyn Clock>,
    /// プレゼンスストア呼び出しのタイムアウト
    timeout: Duration,
}

impl PresenceTracker {
    pub fn new(store: Arc<dyn PresenceStore>, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            store,
            clock,
            timeout,
        }
    }

    /// ユーザーを現在時刻でアクティブとして記録（上書き）
    pub async fn mark_active(&self, room_id: &RoomId, username: &Username) {
        let now = self.clock.now_millis();
        let key = room_id.presence_key();
        match tokio::time::timeout(
            self.timeout,
            self.store.upsert(&key, now as f64, username.as_str()),
        )
        .await
        {
            Ok(Ok(())) => {
                tracing::debug!("User '{}' marked as active in room '{}'", username, room_id);
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    "Failed to mark user '{}' active in room '{}': {}",
                    username,
                    room_id,
                    e
                );
            }
            Err(_) => {
                tracing::warn!(
                    "Timed out marking user '{}' active in room '{}'",
                    username,
                    room_id
                );
            }
        }
    }

    /// ユーザーのプレゼンスを削除（存在しなければ何もしない）
    pub async fn remove_user(&self, room_id: &RoomId, username: &Username) {
        let key = room_id.presence_key();
        match tokio::time::timeout(self.timeout, self.store.remove(&key, username.as_str())).await
        {
            Ok(Ok(())) => {
                tracing::debug!("User '{}' removed from room '{}' presence", username, room_id);
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    "Failed to remove user '{}' from room '{}' presence: {}",
                    username,
                    room_id,
                    e
                );
            }
            Err(_) => {
                tracing::warn!(
                    "Timed out removing user '{}' from room '{}' presence",
                    username,
                    room_id
                );
            }
        }
    }

    /// 最終アクティブ時刻が `cutoff_millis` 以下（境界を含む）のユーザーを古い順に取得
    ///
    /// # Errors
    ///
    /// プレゼンスストアの呼び出しが失敗またはタイムアウトした場合
    pub async fn stale_users(
        &self,
        room_id: &RoomId,
        cutoff_millis: i64,
    ) -> Result<Vec<Username>, PresenceError> {
        let key = room_id.presence_key();
        let members = tokio::time::timeout(
            self.timeout,
            self.store.range_by_score(&key, cutoff_millis as f64),
        )
        .await
        .map_err(|_| PresenceError::Timeout)??;

        Ok(members
            .into_iter()
            .filter_map(|member| match Username::new(member) {
                Ok(username) => Some(username),
                Err(e) => {
                    tracing::warn!("Skipping invalid presence member in '{}': {}", key, e);
                    None
                }
            })
            .collect())
    }
}

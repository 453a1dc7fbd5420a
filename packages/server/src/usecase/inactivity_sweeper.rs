//! UseCase: 非アクティブユーザーの定期スイープ
//!
//! 一定間隔で全ルームを走査し、しきい値より長く活動のないユーザーを検出して
//! ルームに `{"type":"userInactive","user":...}` を通知し、プレゼンスから削除します。
//!
//! ## 状態
//!
//! `Idle` と `Sweeping` を交互に繰り返すだけで、終了状態はありません
//! （プロセスの終了までタスクが動き続けます）。
//!
//! ## タイマー
//!
//! 固定レート（`tokio::time::interval`）で動作し、スイープにかかった時間で周期を
//! ずらしません。最初のスイープは起動から 1 周期後です。

use std::{panic::AssertUnwindSafe, sync::Arc};

use futures_util::FutureExt;
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::{
    config::InactivityConfig,
    domain::{RoomId, Username},
    infrastructure::{dto::websocket::UserInactiveMessage, message_pusher::SessionRegistry},
};
use roomcast_shared::time::Clock;

use super::presence_tracker::PresenceTracker;

/// 1 回のスイープの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// 非アクティブとして通知・削除した (ルーム, ユーザー)
    pub evicted: Vec<(RoomId, Username)>,
    /// プレゼンスを参照できなかったルーム
    pub failed_rooms: Vec<RoomId>,
}

/// 非アクティブユーザーのスイーパー
pub struct InactivitySweeper {
    registry: Arc<SessionRegistry>,
    presence: Arc<PresenceTracker>,
    clock: Arc<dyn Clock>,
    config: InactivityConfig,
}

impl InactivitySweeper {
    /// 新しい InactivitySweeper を作成
    ///
    /// `config` は作成時点で検証済み（しきい値・間隔とも正）です。
    pub fn new(
        registry: Arc<SessionRegistry>,
        presence: Arc<PresenceTracker>,
        clock: Arc<dyn Clock>,
        config: InactivityConfig,
    ) -> Self {
        Self {
            registry,
            presence,
            clock,
            config,
        }
    }

    /// バックグラウンドタスクとして起動
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// スイープを周期的に実行し続ける（戻らない）
    ///
    /// 1 回のスイープでパニックが起きてもループは継続します。
    pub async fn run(&self) {
        let period = self.config.check_interval();
        tracing::info!(
            "Starting inactivity sweeper (threshold: {:?}, interval: {:?})",
            self.config.threshold(),
            period
        );

        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

        loop {
            interval.tick().await;
            match AssertUnwindSafe(self.sweep_once()).catch_unwind().await {
                Ok(report) => {
                    if !report.evicted.is_empty() {
                        tracing::info!("Evicted {} inactive user(s)", report.evicted.len());
                    }
                }
                Err(_) => {
                    tracing::error!("Inactivity sweep panicked, continuing with next tick");
                }
            }
        }
    }

    /// 全ルームを 1 回スイープ
    ///
    /// ユーザーは `last_active <= now - threshold` のとき非アクティブです（境界を含む）。
    /// ルーム単位・ユーザー単位の失敗は他のルーム・ユーザーの処理を止めません。
    pub async fn sweep_once(&self) -> SweepReport {
        let mut report = SweepReport::default();

        for room_id in self.registry.active_rooms() {
            let cutoff = self.clock.now_millis() - self.config.threshold_millis();
            let stale = match self.presence.stale_users(&room_id, cutoff).await {
                Ok(stale) => stale,
                Err(e) => {
                    tracing::warn!("Skipping room '{}' in inactivity sweep: {}", room_id, e);
                    report.failed_rooms.push(room_id);
                    continue;
                }
            };

            for username in stale {
                tracing::debug!("User '{}' is inactive in room '{}'", username, room_id);
                self.notify_inactive(&room_id, &username).await;
                self.presence.remove_user(&room_id, &username).await;
                report.evicted.push((room_id.clone(), username));
            }
        }

        report
    }

    async fn notify_inactive(&self, room_id: &RoomId, username: &Username) {
        let notice = UserInactiveMessage::from(username);
        match serde_json::to_string(&notice) {
            Ok(payload) => {
                self.registry.broadcast(room_id, &payload, None).await;
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to encode inactivity notice for '{}' in room '{}': {}",
                    username,
                    room_id,
                    e
                );
            }
        }
    }
}

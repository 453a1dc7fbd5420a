//! 外部コラボレーターの trait 定義
//!
//! ドメイン層が必要とするデータストアへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! - `MessageLog`: ルームごとの追記専用ログ（チャット履歴の system of record）
//! - `PresenceStore`: ルームごとのスコア付き集合（最終アクティブ時刻の保存先）
//!
//! キーは呼び出し側で名前空間を付けて渡します（`chat:<room>`, `presence:<room>`）。

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{
    entity::LogEntry,
    error::{MessageLogError, PresenceStoreError},
};

/// ログエントリのフィールド（フィールド名 → 値）
pub type LogFields = BTreeMap<String, String>;

pub const FIELD_USERNAME: &str = "username";
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_TIMESTAMP: &str = "timestamp";

/// Message Log trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// エントリを追記し、採番されたエントリ ID を返す
    async fn append(&self, key: &str, fields: LogFields) -> Result<String, MessageLogError>;

    /// 全エントリを追記順で取得
    async fn read_all(&self, key: &str) -> Result<Vec<LogEntry>, MessageLogError>;

    /// ログを丸ごと削除（存在しなくてもエラーにしない）
    async fn clear(&self, key: &str) -> Result<(), MessageLogError>;
}

/// Presence Store trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// メンバーのスコアを設定（存在しなければ追加、存在すれば上書き）
    async fn upsert(&self, key: &str, score: f64, member: &str) -> Result<(), PresenceStoreError>;

    /// メンバーを削除（存在しなくてもエラーにしない）
    async fn remove(&self, key: &str, member: &str) -> Result<(), PresenceStoreError>;

    /// スコアが `upper_bound` 以下のメンバーをスコアの昇順で取得
    async fn range_by_score(
        &self,
        key: &str,
        upper_bound: f64,
    ) -> Result<Vec<String>, PresenceStoreError>;
}

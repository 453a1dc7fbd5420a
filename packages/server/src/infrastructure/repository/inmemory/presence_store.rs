//! InMemory Presence Store 実装
//!
//! キーごとに メンバー → スコア のマップを保持するスコア付き集合。
//! 範囲取得はスコアの昇順、同スコアはメンバー名の昇順で返します
//! （Redis Sorted Set と同じ順序）。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{PresenceStore, PresenceStoreError};

/// インメモリ Presence Store 実装
#[derive(Default)]
pub struct InMemoryPresenceStore {
    sets: Mutex<HashMap<String, HashMap<String, f64>>>,
}

impl InMemoryPresenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// メンバーのスコアを取得（テスト・診断用）
    pub async fn score(&self, key: &str, member: &str) -> Option<f64> {
        let sets = self.sets.lock().await;
        sets.get(key).and_then(|set| set.get(member).copied())
    }
}

#[async_trait]
impl PresenceStore for InMemoryPresenceStore {
    async fn upsert(&self, key: &str, score: f64, member: &str) -> Result<(), PresenceStoreError> {
        let mut sets = self.sets.lock().await;
        sets.entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    async fn remove(&self, key: &str, member: &str) -> Result<(), PresenceStoreError> {
        let mut sets = self.sets.lock().await;
        if let Some(set) = sets.get_mut(key) {
            set.remove(member);
            if set.is_empty() {
                sets.remove(key);
            }
        }
        Ok(())
    }

    async fn range_by_score(
        &self,
        key: &str,
        upper_bound: f64,
    ) -> Result<Vec<String>, PresenceStoreError> {
        let sets = self.sets.lock().await;
        let Some(set) = sets.get(key) else {
            return Ok(Vec::new());
        };

        let mut members: Vec<(&String, f64)> = set
            .iter()
            .filter(|(_, score)| **score <= upper_bound)
            .map(|(member, score)| (member, *score))
            .collect();
        members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        Ok(members
            .into_iter()
            .map(|(member, _)| member.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_overwrites_score() {
        // テスト項目: 同じメンバーの upsert はスコアを上書きする
        // given (前提条件):
        let store = InMemoryPresenceStore::new();
        store.upsert("presence:r1", 100.0, "alice").await.unwrap();

        // when (操作):
        store.upsert("presence:r1", 200.0, "alice").await.unwrap();

        // then (期待する結果):
        assert_eq!(store.score("presence:r1", "alice").await, Some(200.0));
        let members = store.range_by_score("presence:r1", f64::MAX).await.unwrap();
        assert_eq!(members, vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn test_range_by_score_is_inclusive_and_ordered() {
        // テスト項目: 上限以下のメンバーがスコアの昇順で返る（上限を含む）
        // given (前提条件):
        let store = InMemoryPresenceStore::new();
        store.upsert("presence:r1", 300.0, "carol").await.unwrap();
        store.upsert("presence:r1", 100.0, "alice").await.unwrap();
        store.upsert("presence:r1", 200.0, "bob").await.unwrap();
        store.upsert("presence:r1", 201.0, "dave").await.unwrap();

        // when (操作):
        let members = store.range_by_score("presence:r1", 200.0).await.unwrap();

        // then (期待する結果):
        assert_eq!(members, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[tokio::test]
    async fn test_range_by_score_ties_ordered_by_member() {
        // テスト項目: 同スコアのメンバーは名前の昇順で返る
        // given (前提条件):
        let store = InMemoryPresenceStore::new();
        store.upsert("presence:r1", 100.0, "zed").await.unwrap();
        store.upsert("presence:r1", 100.0, "amy").await.unwrap();

        // when (操作):
        let members = store.range_by_score("presence:r1", 100.0).await.unwrap();

        // then (期待する結果):
        assert_eq!(members, vec!["amy".to_string(), "zed".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_member() {
        // テスト項目: 削除したメンバーは範囲取得に含まれない
        // given (前提条件):
        let store = InMemoryPresenceStore::new();
        store.upsert("presence:r1", 100.0, "alice").await.unwrap();

        // when (操作):
        store.remove("presence:r1", "alice").await.unwrap();
        let members = store.range_by_score("presence:r1", f64::MAX).await.unwrap();

        // then (期待する結果):
        assert!(members.is_empty());
        assert_eq!(store.score("presence:r1", "alice").await, None);
    }

    #[tokio::test]
    async fn test_remove_unknown_member_is_noop() {
        // テスト項目: 存在しないキー・メンバーの削除はエラーにならない
        // given (前提条件):
        let store = InMemoryPresenceStore::new();

        // when (操作):
        let result = store.remove("presence:nothing", "nobody").await;

        // then (期待する結果):
        assert!(result.is_ok());
    }
}

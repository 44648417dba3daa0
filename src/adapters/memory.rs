//! In-memory collaborators
//!
//! Used by the `memory` database target for smoke runs and by tests.

use crate::adapters::database::traits::{CombinationStore, ProfileSource, StoreStats};
use crate::domain::{CanonicalKey, CombinationRecord, PhysiologyCode, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Process-local combination store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<CanonicalKey, CombinationRecord>>,
    upserts: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the record stored under `key`
    pub async fn get(&self, key: &CanonicalKey) -> Option<CombinationRecord> {
        self.records.read().await.get(key).cloned()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Number of upsert calls served
    pub fn upsert_count(&self) -> u64 {
        self.upserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CombinationStore for MemoryStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn exists_by_key(&self, key: &CanonicalKey) -> Result<bool> {
        Ok(self.records.read().await.contains_key(key))
    }

    async fn upsert(&self, record: &CombinationRecord) -> Result<()> {
        let mut records = self.records.write().await;
        let mut stored = record.clone();
        stored.updated_at = Utc::now();
        if let Some(existing) = records.get(&record.key) {
            stored.created_at = existing.created_at;
        }
        records.insert(stored.key.clone(), stored);
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let records = self.records.read().await;
        Ok(StoreStats {
            total: records.len() as u64,
            degraded: records.values().filter(|r| r.is_degraded()).count() as u64,
        })
    }
}

/// Fixed base-profile table
#[derive(Debug, Clone, Default)]
pub struct StaticProfiles {
    profiles: BTreeMap<PhysiologyCode, String>,
}

impl StaticProfiles {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the profile text for a code
    pub fn with_profile(mut self, code: PhysiologyCode, text: impl Into<String>) -> Self {
        self.profiles.insert(code, text.into());
        self
    }
}

impl FromIterator<(PhysiologyCode, String)> for StaticProfiles {
    fn from_iter<I: IntoIterator<Item = (PhysiologyCode, String)>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ProfileSource for StaticProfiles {
    async fn get_profile(&self, code: PhysiologyCode) -> Result<String> {
        Ok(self.profiles.get(&code).cloned().unwrap_or_default())
    }

    async fn list_codes(&self) -> Result<Vec<PhysiologyCode>> {
        Ok(self.profiles.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Indications, Triad};

    fn record(title: &str, physical: &[&str]) -> CombinationRecord {
        let triad = Triad::normalize(&[30.0, 50.0, 76.0]).unwrap();
        CombinationRecord::new(
            &triad,
            title,
            "analysis",
            Indications {
                physical: physical.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
            vec![],
        )
    }

    #[tokio::test]
    async fn test_upsert_then_exists() {
        let store = MemoryStore::new();
        let record = record("Gut-Brain", &["Bloating?"]);

        assert!(!store.exists_by_key(&record.key).await.unwrap());
        store.upsert(&record).await.unwrap();
        assert!(store.exists_by_key(&record.key).await.unwrap());
        assert!(store.exists_by_key(&record.key).await.unwrap());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_content_and_keeps_created_at() {
        let store = MemoryStore::new();
        let first = record("Combination", &[]);
        store.upsert(&first).await.unwrap();
        let created = store.get(&first.key).await.unwrap().created_at;

        let second = record("Gut-Brain", &["Bloating?"]);
        store.upsert(&second).await.unwrap();

        let stored = store.get(&first.key).await.unwrap();
        assert_eq!(stored.title, "Gut-Brain");
        assert_eq!(stored.created_at, created);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.upsert_count(), 2);
    }

    #[tokio::test]
    async fn test_stats_count_degraded() {
        let store = MemoryStore::new();
        store.upsert(&record("Combination", &["a"])).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats, StoreStats { total: 1, degraded: 1 });
    }

    #[tokio::test]
    async fn test_static_profiles() {
        let code = PhysiologyCode::new(50.0).unwrap();
        let other = PhysiologyCode::new(30.0).unwrap();
        let profiles = StaticProfiles::new()
            .with_profile(code, "Metabolism profile")
            .with_profile(other, "Cells profile");

        assert_eq!(profiles.get_profile(code).await.unwrap(), "Metabolism profile");
        assert_eq!(
            profiles
                .get_profile(PhysiologyCode::new(76.0).unwrap())
                .await
                .unwrap(),
            ""
        );
        assert_eq!(profiles.list_codes().await.unwrap(), vec![other, code]);
    }
}

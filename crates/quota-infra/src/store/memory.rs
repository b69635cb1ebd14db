//! In-memory usage store - used for tests, local runs and as a fallback.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use quota_core::error::StoreError;
use quota_core::ports::{CreateOutcome, UsageRetention, UsageStore};
use quota_core::{UsageRecord, WindowKey};

/// In-memory usage store using a HashMap behind an async RwLock.
///
/// Each primitive runs under a single lock guard, which makes it atomic within this
/// process. Note: counts are per-process and lost on restart, so this backend does
/// not share a quota across instances.
pub struct InMemoryUsageStore {
    counts: RwLock<HashMap<WindowKey, u32>>,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self {
            counts: RwLock::new(HashMap::new()),
        }
    }

    /// Number of windows currently held.
    pub async fn len(&self) -> usize {
        self.counts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.counts.read().await.is_empty()
    }
}

impl Default for InMemoryUsageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn conditional_increment(
        &self,
        key: &WindowKey,
        limit: u32,
    ) -> Result<Option<u32>, StoreError> {
        let mut counts = self.counts.write().await;
        match counts.get_mut(key) {
            Some(count) if *count < limit => {
                *count += 1;
                Ok(Some(*count))
            }
            _ => Ok(None),
        }
    }

    async fn read(&self, key: &WindowKey) -> Result<Option<UsageRecord>, StoreError> {
        let counts = self.counts.read().await;
        Ok(counts
            .get(key)
            .map(|count| UsageRecord::new(key.clone(), *count)))
    }

    async fn create_if_absent(&self, key: &WindowKey) -> Result<CreateOutcome, StoreError> {
        let mut counts = self.counts.write().await;
        if counts.contains_key(key) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        counts.insert(key.clone(), 1);
        Ok(CreateOutcome::Created)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl UsageRetention for InMemoryUsageStore {
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut counts = self.counts.write().await;
        let before = counts.len();
        counts.retain(|key, _| key.window_start() >= cutoff);
        Ok((before - counts.len()) as u64)
    }
}

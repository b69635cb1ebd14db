use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;

/// Housekeeping for stores that do not expire records on their own.
#[async_trait]
pub trait UsageRetention: Send + Sync {
    /// Delete every record whose window started before `cutoff`.
    /// Returns the number of records removed.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}

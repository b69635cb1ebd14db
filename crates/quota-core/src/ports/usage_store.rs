//! Usage store port - the durable counter primitives the admission protocol needs.

use async_trait::async_trait;

use crate::domain::{UsageRecord, WindowKey};
use crate::error::StoreError;

/// Result of [`UsageStore::create_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// This caller inserted the seed record (`count = 1`).
    Created,
    /// A record for the key was already present; nothing was written.
    AlreadyExists,
}

/// Counter store trait - abstraction over durable usage backends.
///
/// Implementations must make `conditional_increment` and `create_if_absent` single
/// atomic operations against the backing store, and must enforce at most one record
/// per [`WindowKey`]. No other write path to a record is allowed.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Increment `count` iff a record exists for `key` and its count is below `limit`.
    /// Returns the post-increment count, or `None` when no record qualifies.
    async fn conditional_increment(
        &self,
        key: &WindowKey,
        limit: u32,
    ) -> Result<Option<u32>, StoreError>;

    /// Point lookup without side effects.
    async fn read(&self, key: &WindowKey) -> Result<Option<UsageRecord>, StoreError>;

    /// Insert a record with `count = 1` iff none exists for `key`.
    async fn create_if_absent(&self, key: &WindowKey) -> Result<CreateOutcome, StoreError>;

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;
}

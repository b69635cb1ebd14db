//! Admission engine - the race-free fixed-window protocol.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::WindowKey;
use crate::error::QuotaError;
use crate::ports::{Clock, CreateOutcome, UsageStore};

use super::{Admission, QuotaConfig};

/// Decides whether a hit for an identity is admitted in the current window.
///
/// The engine is stateless between calls. All synchronization comes from the store:
/// an atomic conditional increment, and an atomic create-if-absent guarded by a
/// uniqueness constraint on the key. Concurrent callers that all find an empty window
/// race on the create; exactly one wins, and the others fall back to a single
/// re-increment. The accepted count for a window therefore never exceeds the limit.
#[derive(Clone)]
pub struct AdmissionEngine {
    store: Arc<dyn UsageStore>,
    clock: Arc<dyn Clock>,
    config: QuotaConfig,
}

impl AdmissionEngine {
    pub fn new(store: Arc<dyn UsageStore>, clock: Arc<dyn Clock>, config: QuotaConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn limit(&self) -> u32 {
        self.config.limit()
    }

    /// Record one hit for `identity` if its current window is below the limit.
    pub async fn hit(&self, identity: &str) -> Result<Admission, QuotaError> {
        if identity.is_empty() {
            return Err(QuotaError::InvalidIdentity);
        }

        let now = self.clock.now();
        let key = WindowKey::at(identity, now);
        let limit = self.limit();

        // Common path: the window's record exists and has room.
        if let Some(count) = self.store.conditional_increment(&key, limit).await? {
            return Ok(self.accept(key, count));
        }

        if let Some(record) = self.store.read(&key).await? {
            if record.count >= limit {
                return Err(self.reject(&key, now));
            }
        }

        match self.store.create_if_absent(&key).await? {
            CreateOutcome::Created => Ok(self.accept(key, 1)),
            // Another caller seeded the window first; one more increment settles it.
            CreateOutcome::AlreadyExists => {
                match self.store.conditional_increment(&key, limit).await? {
                    Some(count) => Ok(self.accept(key, count)),
                    None => Err(self.reject(&key, now)),
                }
            }
        }
    }

    fn accept(&self, key: WindowKey, count: u32) -> Admission {
        Admission {
            key,
            count,
            limit: self.limit(),
        }
    }

    fn reject(&self, key: &WindowKey, now: DateTime<Utc>) -> QuotaError {
        QuotaError::RateLimitExceeded {
            limit: self.limit(),
            retry_after: (key.window_end() - now).to_std().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::time::Duration;

    use super::*;
    use crate::error::StoreError;
    use crate::service::test_support::{FixedClock, ScriptedStore, noon_ish};

    fn engine(store: Arc<ScriptedStore>) -> AdmissionEngine {
        AdmissionEngine::new(
            store,
            Arc::new(FixedClock(noon_ish())),
            QuotaConfig::new(NonZeroU32::new(5).unwrap()),
        )
    }

    #[tokio::test]
    async fn test_existing_window_is_incremented() {
        let store = Arc::new(ScriptedStore::new().on_increment(Ok(Some(3))));
        let admission = engine(store.clone()).hit("alice").await.unwrap();

        assert_eq!(admission.count, 3);
        assert_eq!(admission.limit, 5);
        assert_eq!(admission.remaining(), 2);
        assert_eq!(admission.key.identity(), "alice");
        assert_eq!(admission.key.label(), "2024-05-01T12:34");
        assert_eq!(store.calls(), vec!["increment"]);
    }

    #[tokio::test]
    async fn test_first_hit_creates_window() {
        let store = Arc::new(
            ScriptedStore::new()
                .on_increment(Ok(None))
                .on_read(Ok(None))
                .on_create(Ok(CreateOutcome::Created)),
        );
        let admission = engine(store.clone()).hit("new-user").await.unwrap();

        assert_eq!(admission.count, 1);
        assert_eq!(store.calls(), vec!["increment", "read", "create"]);
    }

    #[tokio::test]
    async fn test_saturated_window_is_rejected_without_create() {
        let store = Arc::new(
            ScriptedStore::new()
                .on_increment(Ok(None))
                .on_read(Ok(Some(5))),
        );
        let err = engine(store.clone()).hit("alice").await.unwrap_err();

        match err {
            QuotaError::RateLimitExceeded { limit, retry_after } => {
                assert_eq!(limit, 5);
                assert_eq!(retry_after, Duration::from_secs(40));
            }
            other => panic!("expected RateLimitExceeded, got {other:?}"),
        }
        assert_eq!(store.calls(), vec!["increment", "read"]);
    }

    #[tokio::test]
    async fn test_lost_create_race_retries_increment_once() {
        let store = Arc::new(
            ScriptedStore::new()
                .on_increment(Ok(None))
                .on_read(Ok(None))
                .on_create(Ok(CreateOutcome::AlreadyExists))
                .on_increment(Ok(Some(2))),
        );
        let admission = engine(store.clone()).hit("alice").await.unwrap();

        assert_eq!(admission.count, 2);
        assert_eq!(
            store.calls(),
            vec!["increment", "read", "create", "increment"]
        );
    }

    #[tokio::test]
    async fn test_lost_create_race_then_full_window_is_rejected() {
        let store = Arc::new(
            ScriptedStore::new()
                .on_increment(Ok(None))
                .on_read(Ok(None))
                .on_create(Ok(CreateOutcome::AlreadyExists))
                .on_increment(Ok(None)),
        );
        let err = engine(store.clone()).hit("alice").await.unwrap_err();

        assert!(matches!(err, QuotaError::RateLimitExceeded { .. }));
        assert_eq!(
            store.calls(),
            vec!["increment", "read", "create", "increment"]
        );
    }

    #[tokio::test]
    async fn test_record_below_limit_at_read_goes_through_create() {
        // Seeded by a concurrent caller between the increment and the read.
        let store = Arc::new(
            ScriptedStore::new()
                .on_increment(Ok(None))
                .on_read(Ok(Some(1)))
                .on_create(Ok(CreateOutcome::AlreadyExists))
                .on_increment(Ok(Some(2))),
        );
        let admission = engine(store).hit("alice").await.unwrap();

        assert_eq!(admission.count, 2);
    }

    #[tokio::test]
    async fn test_empty_identity_touches_no_store() {
        let store = Arc::new(ScriptedStore::new());
        let err = engine(store.clone()).hit("").await.unwrap_err();

        assert!(matches!(err, QuotaError::InvalidIdentity));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_propagated_not_rejected() {
        let store = Arc::new(
            ScriptedStore::new()
                .on_increment(Ok(None))
                .on_read(Err(StoreError::Connection("reset by peer".into()))),
        );
        let err = engine(store).hit("alice").await.unwrap_err();

        assert!(matches!(err, QuotaError::Store(StoreError::Connection(_))));
    }

    #[tokio::test]
    async fn test_create_failure_is_propagated() {
        let store = Arc::new(
            ScriptedStore::new()
                .on_increment(Ok(None))
                .on_read(Ok(None))
                .on_create(Err(StoreError::Query("disk full".into()))),
        );
        let err = engine(store).hit("alice").await.unwrap_err();

        assert!(matches!(err, QuotaError::Store(StoreError::Query(_))));
    }
}

//! Periodic purge of expired usage windows.
//!
//! Stores without native key expiry (in-memory, postgres) keep every window
//! they ever counted. The purge drops windows that ended more than
//! `keep_minutes` ago; it never touches the current window.

use std::sync::Arc;

use chrono::TimeDelta;
use quota_core::StoreError;
use quota_core::domain::current_window;
use quota_core::ports::{Clock, UsageRetention};

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::config::RetentionConfig;

/// Delete windows that started more than `keep_minutes` before the current one.
pub async fn purge_expired(
    retention: &dyn UsageRetention,
    clock: &dyn Clock,
    keep_minutes: i64,
) -> Result<u64, StoreError> {
    let cutoff = current_window(clock.now()) - TimeDelta::minutes(keep_minutes.max(1));
    retention.purge_before(cutoff).await
}

/// Cron job scheduler running the purge.
pub struct RetentionScheduler {
    inner: JobScheduler,
}

impl RetentionScheduler {
    /// Register and start the purge job. Returns `None` when retention is disabled.
    pub async fn start(
        config: &RetentionConfig,
        retention: Arc<dyn UsageRetention>,
        clock: Arc<dyn Clock>,
    ) -> Result<Option<Self>, JobSchedulerError> {
        if !config.enabled {
            tracing::info!("Retention purge disabled");
            return Ok(None);
        }

        let inner = JobScheduler::new().await?;
        let keep_minutes = config.keep_minutes;

        let job = Job::new_async(config.schedule.as_str(), move |_uuid, _lock| {
            let retention = retention.clone();
            let clock = clock.clone();
            Box::pin(async move {
                match purge_expired(retention.as_ref(), clock.as_ref(), keep_minutes).await {
                    Ok(0) => tracing::debug!("No expired usage windows"),
                    Ok(purged) => tracing::info!(purged, "Purged expired usage windows"),
                    Err(e) => tracing::error!(error = %e, "Usage window purge failed"),
                }
            })
        })?;

        let id = inner.add(job).await?;
        inner.start().await?;
        tracing::info!(schedule = %config.schedule, job_id = %id, keep_minutes, "Retention purge scheduled");

        Ok(Some(Self { inner }))
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Retention scheduler stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use quota_core::WindowKey;
    use quota_core::ports::UsageStore;
    use quota_infra::{InMemoryUsageStore, ManualClock};

    use super::*;

    #[tokio::test]
    async fn test_purge_keeps_recent_windows() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 30).unwrap());
        let store = InMemoryUsageStore::new();

        // 12:00, then 12:30, then 13:10
        store.create_if_absent(&WindowKey::at("alice", clock.now())).await.unwrap();
        clock.advance(TimeDelta::minutes(30));
        store.create_if_absent(&WindowKey::at("alice", clock.now())).await.unwrap();
        clock.advance(TimeDelta::minutes(40));
        store.create_if_absent(&WindowKey::at("alice", clock.now())).await.unwrap();

        let purged = purge_expired(&store, &clock, 60).await.unwrap();

        assert_eq!(purged, 1);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_purge_never_drops_the_current_window() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 59).unwrap());
        let store = InMemoryUsageStore::new();
        store.create_if_absent(&WindowKey::at("bob", clock.now())).await.unwrap();

        let purged = purge_expired(&store, &clock, 0).await.unwrap();

        assert_eq!(purged, 0);
        assert_eq!(store.len().await, 1);
    }
}

//! Application state - shared across all handlers.

use std::sync::Arc;

use quota_core::ports::{Clock, UsageRetention, UsageStore};
use quota_core::{AdmissionEngine, QuotaConfig, UsageReporter};
use quota_infra::{InMemoryUsageStore, SystemClock};

use crate::config::{AppConfig, StoreBackend};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: AdmissionEngine,
    pub reporter: UsageReporter,
    /// Name of the active store backend.
    pub store_backend: &'static str,
    /// Set when the store needs periodic purging.
    pub retention: Option<Arc<dyn UsageRetention>>,
    pub clock: Arc<dyn Clock>,
}

/// An opened store, viewed through both of its ports.
struct OpenedStore {
    store: Arc<dyn UsageStore>,
    retention: Option<Arc<dyn UsageRetention>>,
}

impl OpenedStore {
    fn in_memory() -> Self {
        let store = Arc::new(InMemoryUsageStore::new());
        Self {
            store: store.clone(),
            retention: Some(store),
        }
    }
}

impl AppState {
    /// Build the application state with the configured store.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let opened = match open_store(config).await {
            Ok(opened) => opened,
            Err(e) if config.fallback_to_memory => {
                tracing::error!(
                    "Failed to open {:?} store: {:#}. Using in-memory fallback.",
                    config.store,
                    e
                );
                OpenedStore::in_memory()
            }
            Err(e) => return Err(e),
        };

        let state = Self::from_parts(
            opened.store,
            opened.retention,
            Arc::new(SystemClock::new()),
            config.quota,
        );

        tracing::info!(
            store = state.store_backend,
            limit = config.quota.limit(),
            "Application state initialized"
        );

        Ok(state)
    }

    /// Assemble the state from already-built parts.
    pub fn from_parts(
        store: Arc<dyn UsageStore>,
        retention: Option<Arc<dyn UsageRetention>>,
        clock: Arc<dyn Clock>,
        quota: QuotaConfig,
    ) -> Self {
        Self {
            engine: AdmissionEngine::new(store.clone(), clock.clone(), quota),
            reporter: UsageReporter::new(store.clone(), clock.clone(), quota),
            store_backend: store.backend(),
            retention,
            clock,
        }
    }
}

async fn open_store(config: &AppConfig) -> anyhow::Result<OpenedStore> {
    match config.store {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store - quotas are not shared across instances");
            Ok(OpenedStore::in_memory())
        }
        StoreBackend::Postgres => open_postgres(config).await,
        StoreBackend::Redis => open_redis().await,
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(config: &AppConfig) -> anyhow::Result<OpenedStore> {
    use anyhow::Context;
    use migration::{Migrator, MigratorTrait};
    use quota_infra::PostgresUsageStore;

    let db_config = config
        .database
        .as_ref()
        .context("DATABASE_URL must be set for the postgres store")?;
    let store = PostgresUsageStore::connect(db_config).await?;

    if config.run_migrations {
        Migrator::up(store.connection(), None)
            .await
            .context("Failed to apply usage store migrations")?;
        tracing::info!("Usage store migrations applied");
    }

    let store = Arc::new(store);
    Ok(OpenedStore {
        store: store.clone(),
        retention: Some(store),
    })
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_config: &AppConfig) -> anyhow::Result<OpenedStore> {
    anyhow::bail!("api-server was built without the postgres feature")
}

#[cfg(feature = "redis")]
async fn open_redis() -> anyhow::Result<OpenedStore> {
    let store = quota_infra::RedisUsageStore::from_env().await?;

    // Redis expires counters itself; no purge job needed.
    Ok(OpenedStore {
        store: Arc::new(store),
        retention: None,
    })
}

#[cfg(not(feature = "redis"))]
async fn open_redis() -> anyhow::Result<OpenedStore> {
    anyhow::bail!("api-server was built without the redis feature")
}

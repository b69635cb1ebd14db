//! PostgreSQL usage store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter,
};

use quota_core::error::StoreError;
use quota_core::ports::{CreateOutcome, UsageRetention, UsageStore};
use quota_core::{UsageRecord, WindowKey};

use super::connections::{DatabaseConfig, connect};
use super::entity::usage_window::{self, Entity as UsageWindow};

/// PostgreSQL-backed usage store.
///
/// The conditional increment is a single `UPDATE ... WHERE count < $limit RETURNING`,
/// and creation is `INSERT ... ON CONFLICT (identity, window_start) DO NOTHING`. Both
/// rely on the unique index provisioned by the migrations; without it the insert fails
/// rather than silently duplicating a window.
pub struct PostgresUsageStore {
    pub(crate) db: DbConn,
}

impl PostgresUsageStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Connect using the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let db = connect(config)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self::new(db))
    }

    /// Underlying connection, e.g. for running migrations.
    pub fn connection(&self) -> &DbConn {
        &self.db
    }
}

fn store_error(err: DbErr) -> StoreError {
    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => StoreError::Connection(err.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

#[async_trait]
impl UsageStore for PostgresUsageStore {
    async fn conditional_increment(
        &self,
        key: &WindowKey,
        limit: u32,
    ) -> Result<Option<u32>, StoreError> {
        let updated = UsageWindow::update_many()
            .col_expr(
                usage_window::Column::Count,
                Expr::col(usage_window::Column::Count).add(1),
            )
            .filter(usage_window::Column::Identity.eq(key.identity()))
            .filter(usage_window::Column::WindowStart.eq(key.window_start().fixed_offset()))
            .filter(usage_window::Column::Count.lt(i64::from(limit)))
            .exec_with_returning(&self.db)
            .await
            .map_err(store_error)?;

        Ok(updated
            .into_iter()
            .next()
            .map(|model| UsageRecord::from(model).count))
    }

    async fn read(&self, key: &WindowKey) -> Result<Option<UsageRecord>, StoreError> {
        let result = UsageWindow::find()
            .filter(usage_window::Column::Identity.eq(key.identity()))
            .filter(usage_window::Column::WindowStart.eq(key.window_start().fixed_offset()))
            .one(&self.db)
            .await
            .map_err(store_error)?;

        Ok(result.map(Into::into))
    }

    async fn create_if_absent(&self, key: &WindowKey) -> Result<CreateOutcome, StoreError> {
        let seed = usage_window::ActiveModel {
            id: NotSet,
            identity: Set(key.identity().to_owned()),
            window_start: Set(key.window_start().fixed_offset()),
            count: Set(1),
        };

        let inserted = UsageWindow::insert(seed)
            .on_conflict(
                OnConflict::columns([
                    usage_window::Column::Identity,
                    usage_window::Column::WindowStart,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;

        let outcome = match inserted {
            Ok(0) | Err(DbErr::RecordNotInserted) => CreateOutcome::AlreadyExists,
            Ok(_) => CreateOutcome::Created,
            Err(e) => return Err(store_error(e)),
        };
        tracing::debug!(identity = %key.identity(), window = %key.label(), ?outcome, "Create if absent");
        Ok(outcome)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[async_trait]
impl UsageRetention for PostgresUsageStore {
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = UsageWindow::delete_many()
            .filter(usage_window::Column::WindowStart.lt(cutoff.fixed_offset()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected)
    }
}

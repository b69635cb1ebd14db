//! Usage window entity for SeaORM.
//!
//! `(identity, window_start)` is covered by the unique index
//! `idx_usage_windows_identity_window`, created by the migration crate.

use sea_orm::entity::prelude::*;

use quota_core::{UsageRecord, WindowKey};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "usage_windows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub identity: String,
    pub window_start: DateTimeWithTimeZone,
    pub count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain UsageRecord.
impl From<Model> for UsageRecord {
    fn from(model: Model) -> Self {
        Self::new(
            WindowKey::new(model.identity, model.window_start.into()),
            u32::try_from(model.count).unwrap_or_default(),
        )
    }
}

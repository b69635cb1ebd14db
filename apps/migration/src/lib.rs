//! Schema migrations for the usage store.
//!
//! Applying these is the provisioning step the admission protocol depends on: the
//! unique index on `(identity, window_start)` is what makes create-if-absent safe.

pub use sea_orm_migration::prelude::*;

mod m20240501_000001_create_usage_windows;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240501_000001_create_usage_windows::Migration)]
    }
}

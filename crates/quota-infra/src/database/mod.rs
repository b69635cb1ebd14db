//! PostgreSQL connection management and usage store.

mod connections;
mod usage_store;

pub mod entity;

pub use connections::{DatabaseConfig, connect};
pub use usage_store::PostgresUsageStore;

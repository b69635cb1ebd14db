//! # Quota Infrastructure
//!
//! Concrete implementations of the ports defined in `quota-core`.
//! This crate contains the clock and the usage store backends.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory store only
//! - `postgres` - PostgreSQL usage store via SeaORM
//! - `redis` - Redis usage store with key expiry

pub mod clock;
pub mod store;

#[cfg(feature = "postgres")]
pub mod database;

// Re-exports - In-Memory
pub use clock::{ManualClock, SystemClock};
pub use store::InMemoryUsageStore;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresUsageStore};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use store::{RedisConfig, RedisUsageStore};

//! Usage store implementations - PostgreSQL lives in `database`, Redis and in-memory here.

mod memory;

pub use memory::InMemoryUsageStore;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisUsageStore};

//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod retention;
mod usage_store;

pub use clock::Clock;
pub use retention::UsageRetention;
pub use usage_store::{CreateOutcome, UsageStore};

//! Background jobs.

mod retention;

pub use retention::RetentionScheduler;

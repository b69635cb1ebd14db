use chrono::{DateTime, Utc};

/// Wall-clock source used to pick the current window.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

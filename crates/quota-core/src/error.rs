//! Domain-level error types.

use std::time::Duration;

use thiserror::Error;

/// Admission errors - the non-accepting outcomes of a quota decision.
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("Identity is required")]
    InvalidIdentity,

    /// Expected outcome under contention, not a fault.
    #[error("Rate limit of {limit} per window exceeded")]
    RateLimitExceeded {
        limit: u32,
        /// Time left until the current window closes.
        retry_after: Duration,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Store-level errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Store query failed: {0}")]
    Query(String),
}

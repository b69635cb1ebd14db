//! Quota services - the admission engine and the usage reporter.

mod admission;
mod reporter;

#[cfg(test)]
mod test_support;

use std::num::NonZeroU32;

use crate::domain::WindowKey;

pub use admission::AdmissionEngine;
pub use reporter::UsageReporter;

/// Per-window limit applied when none is configured.
pub const DEFAULT_LIMIT: NonZeroU32 = NonZeroU32::new(5).unwrap();

/// Global quota configuration. The window length is fixed at one minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaConfig {
    limit: NonZeroU32,
}

impl QuotaConfig {
    pub fn new(limit: NonZeroU32) -> Self {
        Self { limit }
    }

    /// Maximum accepted hits per identity per window.
    pub fn limit(&self) -> u32 {
        self.limit.get()
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

/// An accepted hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub key: WindowKey,
    /// Sequence number of this hit within its window, starting at 1.
    pub count: u32,
    pub limit: u32,
}

impl Admission {
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.count)
    }
}

/// Current usage of one identity in the current window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageReport {
    pub key: WindowKey,
    pub count: u32,
    pub limit: u32,
}

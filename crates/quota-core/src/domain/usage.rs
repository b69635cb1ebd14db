use serde::{Deserialize, Serialize};

use super::WindowKey;

/// Persisted hit counter for one [`WindowKey`].
///
/// At most one record exists per key; the store enforces that. Records are created
/// with `count = 1` and only ever grow through a bounded conditional increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub key: WindowKey,
    pub count: u32,
}

impl UsageRecord {
    pub fn new(key: WindowKey, count: u32) -> Self {
        Self { key, count }
    }
}

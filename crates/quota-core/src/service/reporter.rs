use std::sync::Arc;

use crate::domain::WindowKey;
use crate::error::QuotaError;
use crate::ports::{Clock, UsageStore};

use super::{QuotaConfig, UsageReport};

/// Read-only view of the current window's count for an identity.
#[derive(Clone)]
pub struct UsageReporter {
    store: Arc<dyn UsageStore>,
    clock: Arc<dyn Clock>,
    config: QuotaConfig,
}

impl UsageReporter {
    pub fn new(store: Arc<dyn UsageStore>, clock: Arc<dyn Clock>, config: QuotaConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Count recorded for `identity` in the current window; 0 when nothing was recorded.
    pub async fn usage(&self, identity: &str) -> Result<UsageReport, QuotaError> {
        if identity.is_empty() {
            return Err(QuotaError::InvalidIdentity);
        }

        let key = WindowKey::at(identity, self.clock.now());
        let count = self
            .store
            .read(&key)
            .await?
            .map(|record| record.count)
            .unwrap_or(0);

        Ok(UsageReport {
            key,
            count,
            limit: self.config.limit(),
        })
    }
}

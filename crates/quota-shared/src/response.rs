//! Error response body returned by every failing endpoint.

use serde::{Deserialize, Serialize};

/// `{"error": "...", "limit": N}`; `limit` only accompanies rate-limit rejections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    // Common error constructors
    pub fn invalid_json() -> Self {
        Self::new("Invalid JSON")
    }

    pub fn rate_limited(limit: u32) -> Self {
        Self::new("Rate limit exceeded").with_limit(limit)
    }

    pub fn internal_error() -> Self {
        Self::new("Internal Server Error")
    }
}

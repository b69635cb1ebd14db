//! Error handling - maps quota outcomes to `{"error": ...}` responses.

use std::fmt;
use std::time::Duration;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use quota_core::QuotaError;
use quota_shared::ErrorBody;

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    RateLimited { limit: u32, retry_after: Duration },
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::RateLimited { limit, .. } => write!(f, "Rate limit of {} exceeded", limit),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(detail) => {
                HttpResponse::build(self.status_code()).json(ErrorBody::new(detail))
            }
            AppError::RateLimited { limit, retry_after } => HttpResponse::build(self.status_code())
                .insert_header(("Retry-After", retry_after_secs(*retry_after).to_string()))
                .insert_header(("X-RateLimit-Limit", limit.to_string()))
                .insert_header(("X-RateLimit-Remaining", "0"))
                .json(ErrorBody::rate_limited(*limit)),
            AppError::Internal(detail) => {
                // The detail stays in the logs; callers only see the opaque body.
                tracing::error!("Internal error: {}", detail);
                HttpResponse::build(self.status_code()).json(ErrorBody::internal_error())
            }
        }
    }
}

/// Whole seconds until the window closes, rounded up, never below 1.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

// Conversion from domain errors
impl From<QuotaError> for AppError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::InvalidIdentity => AppError::BadRequest("userId is required".to_string()),
            QuotaError::RateLimitExceeded { limit, retry_after } => {
                AppError::RateLimited { limit, retry_after }
            }
            QuotaError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

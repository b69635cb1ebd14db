//! Quota handlers.

use actix_web::{HttpResponse, web};

use quota_core::QuotaError;
use quota_shared::dto::{HitRequest, HitResponse, UsageResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/hit
pub async fn hit(state: web::Data<AppState>, body: web::Json<HitRequest>) -> AppResult<HttpResponse> {
    let user_id = body.into_inner().user_id.unwrap_or_default();

    let admission = state.engine.hit(&user_id).await.inspect_err(|e| {
        if let QuotaError::RateLimitExceeded { limit, .. } = e {
            tracing::warn!(user_id = %user_id, limit, "Rate limit exceeded");
        }
    })?;

    tracing::debug!(
        user_id = %user_id,
        window = %admission.key.label(),
        count = admission.count,
        "Hit accepted"
    );

    Ok(HttpResponse::Ok()
        .insert_header(("X-RateLimit-Limit", admission.limit.to_string()))
        .insert_header(("X-RateLimit-Remaining", admission.remaining().to_string()))
        .json(HitResponse {
            user_id: admission.key.identity().to_owned(),
            minute: admission.key.label(),
            count: admission.count,
            limit: admission.limit,
            status: "ok".to_string(),
        }))
}

/// GET /api/usage/{userId}
pub async fn usage(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();

    let report = state.reporter.usage(&user_id).await.map_err(|e| match e {
        QuotaError::InvalidIdentity => missing_user_param(),
        other => other.into(),
    })?;

    Ok(HttpResponse::Ok().json(UsageResponse {
        user_id: report.key.identity().to_owned(),
        minute: report.key.label(),
        count: report.count,
        limit: report.limit,
    }))
}

/// GET /api/usage/ without an identity segment.
pub async fn usage_without_user() -> AppResult<HttpResponse> {
    Err(missing_user_param())
}

fn missing_user_param() -> AppError {
    AppError::BadRequest("userId param is required".to_string())
}

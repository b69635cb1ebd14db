//! HTTP handlers and route configuration.

mod health;
mod quota;


use actix_web::{HttpResponse, error, web};

use quota_shared::ErrorBody;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Quota routes
            .route("/hit", web::post().to(quota::hit))
            .route("/usage", web::get().to(quota::usage_without_user))
            .route("/usage/", web::get().to(quota::usage_without_user))
            .route("/usage/{userId}", web::get().to(quota::usage)),
    );
}

/// Malformed bodies never reach the handlers; they get `{"error": "Invalid JSON"}`.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected request body");
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ErrorBody::invalid_json()),
        )
        .into()
    })
}

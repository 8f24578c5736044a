//! HTTP route handlers for Sentinel.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sentinel_common::SentinelError;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::{AppState, Services};
use crate::validators::FieldErrors;

mod health;
mod verify_codes;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Status
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))

        // Verification codes
        .nest("/v1/auth/verify-codes", verify_code_routes())

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn verify_code_routes() -> Router<AppState> {
    Router::new()
        .route("/captcha", post(verify_codes::show_captcha))
        .route("/phone", post(verify_codes::send_using_phone))
        .route("/email", post(verify_codes::send_using_email))
        .route("/check", post(verify_codes::check))
}

/// Handler error
#[derive(Debug)]
pub enum ApiError {
    Service(SentinelError),
    Validation(FieldErrors),
}

impl From<SentinelError> for ApiError {
    fn from(e: SentinelError) -> Self {
        Self::Service(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Service(e) => {
                let status = StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::error!(error = %e, "Request failed");
                }
                (status, Json(json!({ "message": e.to_string() }))).into_response()
            }
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "message": "validation failed", "errors": errors })),
            )
                .into_response(),
        }
    }
}

/// Resolve the shared services, mapping a failed cache connection to 503
async fn services(state: &AppState) -> Result<Arc<Services>, ApiError> {
    state
        .services()
        .await
        .map_err(|e| ApiError::Service(SentinelError::Store(format!("{e:#}"))))
}

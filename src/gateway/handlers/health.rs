//! Health check handler

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::ApiError;

#[derive(serde::Serialize, serde::Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

/// Health check endpoint
///
/// Pings the store. Store errors are logged, never exposed.
///
/// - Healthy: 200 OK + `{status: "ok"}`
/// - Unhealthy: 503 Service Unavailable + `{error: "unavailable"}`
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    match state.store.health_check().await {
        Ok(()) => axum::Json(HealthResponse {
            status: "ok".to_string(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "[HEALTH] store ping failed");
            ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response()
        }
    }
}

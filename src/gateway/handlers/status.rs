use std::sync::Arc;

use axum::extract::State;

use super::super::state::AppState;
use super::super::types::{ApiResult, ErrorResponse, StatusResponse, ok};
use crate::countries::models::LAST_REFRESHED_AT_KEY;

/// Country total and time of the last committed refresh
///
/// GET /status
#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, description = "Store status", body = StatusResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "System"
)]
pub async fn get_status(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    let total_countries = state.store.count().await?;
    let last_refreshed_at = state.store.get_metadata(LAST_REFRESHED_AT_KEY).await?;
    ok(StatusResponse {
        total_countries,
        last_refreshed_at,
    })
}

//! Country handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};

use super::super::state::AppState;
use super::super::types::{
    ApiError, ApiResult, DeleteResponse, ErrorResponse, ListCountriesQuery, RefreshResponse, ok,
};
use crate::countries::models::format_timestamp;
use crate::countries::summary;
use crate::countries::{CountryRecord, GdpSort, ListFilter};

/// Fetch both sources, reconcile and commit the batch
///
/// POST /countries/refresh
#[utoipa::path(
    post,
    path = "/countries/refresh",
    responses(
        (status = 200, description = "Refresh committed", body = RefreshResponse),
        (status = 400, description = "A reconciled record failed validation", body = ErrorResponse),
        (status = 503, description = "An upstream source was unavailable", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Countries"
)]
pub async fn refresh_countries(State(state): State<Arc<AppState>>) -> ApiResult<RefreshResponse> {
    // Detached so a client disconnect cannot cancel an open transaction
    let summary = state.refresh.clone().refresh_detached().await?;
    ok(RefreshResponse {
        status: "success".to_string(),
        total_countries: summary.total_processed,
        refreshed_at: format_timestamp(&summary.refreshed_at),
    })
}

/// List countries with optional filters and GDP ordering
///
/// GET /countries?region=Africa&currency=NGN&sort=gdp_desc
#[utoipa::path(
    get,
    path = "/countries",
    params(ListCountriesQuery),
    responses(
        (status = 200, description = "Matching countries", body = Vec<CountryRecord>),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Countries"
)]
pub async fn list_countries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListCountriesQuery>,
) -> ApiResult<Vec<CountryRecord>> {
    let filter = ListFilter {
        region: non_empty(query.region),
        currency_code: non_empty(query.currency),
    };
    let sort = GdpSort::from_query(query.sort.as_deref());

    let countries = state.store.list_all(&filter, sort).await?;
    ok(countries)
}

/// Case-insensitive lookup
///
/// GET /countries/{name}
#[utoipa::path(
    get,
    path = "/countries/{name}",
    params(
        ("name" = String, Path, description = "Country name, any case")
    ),
    responses(
        (status = 200, description = "Country", body = CountryRecord),
        (status = 404, description = "Country not found", body = ErrorResponse)
    ),
    tag = "Countries"
)]
pub async fn get_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<CountryRecord> {
    match state.store.get_by_name(&name).await? {
        Some(country) => ok(country),
        None => ApiError::not_found("Country not found").into_err(),
    }
}

/// GET /countries/{name} counterpart for removal
#[utoipa::path(
    delete,
    path = "/countries/{name}",
    params(
        ("name" = String, Path, description = "Country name, any case")
    ),
    responses(
        (status = 200, description = "Country deleted", body = DeleteResponse),
        (status = 404, description = "Country not found", body = ErrorResponse)
    ),
    tag = "Countries"
)]
pub async fn delete_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<DeleteResponse> {
    if !state.store.delete_by_name(&name).await? {
        return ApiError::not_found("Country not found").into_err();
    }
    tracing::info!(name = %name, "Country deleted");
    ok(DeleteResponse {
        status: "deleted".to_string(),
    })
}

/// Serve the summary artifact written by the last refresh
///
/// GET /countries/image
#[utoipa::path(
    get,
    path = "/countries/image",
    responses(
        (status = 200, description = "Summary image (SVG)"),
        (status = 404, description = "Summary image not found", body = ErrorResponse)
    ),
    tag = "Countries"
)]
pub async fn get_summary_image(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let path = &state.summary_path;
    if path.as_os_str().is_empty() {
        return ApiError::not_found("Summary image not found").into_err();
    }

    match tokio::fs::read(path).await {
        Ok(bytes) => {
            Ok(([(header::CONTENT_TYPE, summary::content_type(path))], bytes).into_response())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            ApiError::not_found("Summary image not found").into_err()
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read summary image");
            ApiError::internal().into_err()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

//! API response types
//!
//! - [`ApiError`]: `{error, details?}` body with its HTTP status
//! - Success DTOs for refresh, delete and status

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::countries::{RefreshError, StoreError};

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Wrap a value as a 200 JSON response
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(data))
}

// ============================================================================
// Errors
// ============================================================================

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Country not found")]
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn source_unavailable(source_name: &str) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "External data source unavailable",
        )
        .with_details(serde_json::Value::String(format!(
            "Could not fetch data from {}",
            source_name
        )))
    }

    pub fn into_err<T>(self) -> Result<T, Self> {
        Err(self)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.error,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = %e, "Store query failed");
        Self::internal()
    }
}

impl From<RefreshError> for ApiError {
    fn from(e: RefreshError) -> Self {
        match e {
            RefreshError::SourceUnavailable(source) => Self::source_unavailable(source.source_name()),
            RefreshError::InvalidRecord(invalid) => {
                let details: serde_json::Map<String, serde_json::Value> = invalid
                    .violations
                    .iter()
                    .map(|v| (v.field().to_string(), v.message().into()))
                    .collect();
                Self::new(StatusCode::BAD_REQUEST, "Validation failed")
                    .with_details(serde_json::Value::Object(details))
            }
            RefreshError::StoreFailure(_) => Self::internal(),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Query string of `GET /countries`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCountriesQuery {
    /// Exact region match, e.g. `Africa`
    pub region: Option<String>,
    /// Exact currency code match, e.g. `NGN`
    pub currency: Option<String>,
    /// `gdp_desc` or `gdp_asc`; anything else keeps insertion order
    pub sort: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    #[schema(example = "success")]
    pub status: String,
    #[schema(example = 250)]
    pub total_countries: usize,
    #[schema(example = "2026-10-19T08:30:00.123456Z")]
    pub refreshed_at: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "deleted")]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = 250)]
    pub total_countries: usize,
    pub last_refreshed_at: Option<String>,
}

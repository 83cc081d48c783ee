//! OpenAPI / Swagger UI documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::countries::CountryRecord;
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{DeleteResponse, ErrorResponse, RefreshResponse, StatusResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Country Exchange API",
        version = "1.0.0",
        description = "Country directory enriched with exchange rates and estimated GDP."
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::refresh_countries,
        crate::gateway::handlers::list_countries,
        crate::gateway::handlers::get_summary_image,
        crate::gateway::handlers::get_country,
        crate::gateway::handlers::delete_country,
        crate::gateway::handlers::get_status,
        crate::gateway::handlers::health_check,
    ),
    components(
        schemas(
            CountryRecord,
            RefreshResponse,
            DeleteResponse,
            StatusResponse,
            HealthResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Countries", description = "Refresh, query and delete countries"),
        (name = "System", description = "Status and health checks")
    )
)]
pub struct ApiDoc;

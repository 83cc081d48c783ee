//! HTTP gateway
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | POST | `/countries/refresh` | [`handlers::refresh_countries`] |
//! | GET | `/countries` | [`handlers::list_countries`] |
//! | GET | `/countries/image` | [`handlers::get_summary_image`] |
//! | GET | `/countries/{name}` | [`handlers::get_country`] |
//! | DELETE | `/countries/{name}` | [`handlers::delete_country`] |
//! | GET | `/status` | [`handlers::get_status`] |
//! | GET | `/health` | [`handlers::health_check`] |
//!
//! Swagger UI is served at `/docs`, the raw document at `/api-docs/openapi.json`.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use state::AppState;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/countries/refresh", post(handlers::refresh_countries))
        .route("/countries", get(handlers::list_countries))
        // Static segment, matched before `{name}`
        .route("/countries/image", get(handlers::get_summary_image))
        .route(
            "/countries/{name}",
            get(handlers::get_country).delete(handlers::delete_country),
        )
        .route("/status", get(handlers::get_status))
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until Ctrl+C or a listener failure
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}; is the port already in use?"))?;

    tracing::info!(addr = %addr, "Gateway listening");
    tracing::info!("API docs: http://{}/docs", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server error")?;
    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Resolve when `signal` fires. A signal that cannot be installed never
/// resolves, so the server keeps running instead of shutting down at startup.
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => tracing::warn!("Ctrl+C received, shutting down"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler; graceful shutdown disabled");
            std::future::pending::<()>().await
        }
    }
}

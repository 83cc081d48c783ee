//! Country Exchange - country directory enriched with exchange rates
//!
//! Pulls a country directory and a USD exchange-rate table, derives an
//! estimated GDP per country, stores the batch atomically and serves it over
//! HTTP.
//!
//! # Modules
//!
//! - [`config`] - YAML application config
//! - [`logging`] - tracing subscriber with rolling file output
//! - [`db`] - Postgres connection pool
//! - [`countries`] - sources, reconciliation, store, refresh and summary
//! - [`gateway`] - axum HTTP API with OpenAPI docs

pub mod config;
pub mod countries;
pub mod db;
pub mod gateway;
pub mod logging;

pub use config::AppConfig;
pub use countries::{
    CountryRecord, CountryStore, MemoryCountryStore, RefreshError, RefreshService,
    RefreshSummary,
};
pub use gateway::AppState;

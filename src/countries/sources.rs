//! External data sources
//!
//! Both sources are read-only and all-or-nothing: a transport error, a
//! timeout, a non-2xx status or an unparsable body fails the whole call.
//! There are no retries.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::SourceError;
use super::models::{RateTable, RawCountry};
use crate::config::SourcesConfig;

pub const COUNTRIES_SOURCE: &str = "Countries API";
pub const RATES_SOURCE: &str = "Exchange rates API";

/// Country directory
#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch_countries(&self) -> Result<Vec<RawCountry>, SourceError>;
}

/// Exchange rates against the configured base currency
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateTable, SourceError>;
}

/// Body of the rate source; only `rates` is used
#[derive(Deserialize)]
struct RatesResponse {
    #[serde(default)]
    rates: HashMap<String, serde_json::Value>,
}

/// Shared HTTP client with the configured timeout
pub fn build_client(config: &SourcesConfig) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| SourceError::Transport {
            source_name: COUNTRIES_SOURCE,
            message: format!("Failed to create HTTP client: {}", e),
        })
}

async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    source_name: &'static str,
) -> Result<T, SourceError> {
    let transport = |e: reqwest::Error| SourceError::Transport {
        source_name,
        message: if e.is_timeout() {
            "request timed out".to_string()
        } else {
            e.to_string()
        },
    };

    let response = client.get(url).send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            source_name,
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(transport)?;
    debug!(source = source_name, bytes = body.len(), "Fetched upstream payload");

    serde_json::from_slice(&body).map_err(|e| SourceError::Parse {
        source_name,
        message: e.to_string(),
    })
}

/// restcountries.com style directory over HTTP
pub struct HttpCountrySource {
    client: reqwest::Client,
    url: String,
}

impl HttpCountrySource {
    pub fn new(client: reqwest::Client, config: &SourcesConfig) -> Self {
        Self {
            client,
            url: config.countries_url.clone(),
        }
    }
}

#[async_trait]
impl CountrySource for HttpCountrySource {
    async fn fetch_countries(&self) -> Result<Vec<RawCountry>, SourceError> {
        get_json(&self.client, &self.url, COUNTRIES_SOURCE).await
    }
}

/// open.er-api.com style rate feed over HTTP
pub struct HttpRateSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRateSource {
    pub fn new(client: reqwest::Client, config: &SourcesConfig) -> Self {
        Self {
            client,
            url: format!(
                "{}/{}",
                config.rates_url.trim_end_matches('/'),
                config.base_currency
            ),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch_rates(&self) -> Result<RateTable, SourceError> {
        let body: RatesResponse = get_json(&self.client, &self.url, RATES_SOURCE).await?;
        Ok(RateTable::from_values(body.rates))
    }
}

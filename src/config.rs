use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// Country store database; the in-memory store is used when absent
    #[serde(default)]
    pub postgres: Option<PostgresConfig>,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PostgresConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

impl PostgresConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// External country directory and exchange rate endpoints
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    pub countries_url: String,
    /// Rates are fetched from `{rates_url}/{base_currency}`
    pub rates_url: String,
    pub base_currency: String,
    pub timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            countries_url:
                "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies"
                    .to_string(),
            rates_url: "https://open.er-api.com/v6/latest".to_string(),
            base_currency: "USD".to_string(),
            timeout_secs: 10,
        }
    }
}

impl SourcesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Summary artifact written after each successful refresh
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SummaryConfig {
    pub image_path: PathBuf,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from("cache/summary.svg"),
        }
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        Self::from_file(format!("config/{}.yaml", env))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_minimal() {
        let yaml = r#"
log_level: "info"
log_dir: "./logs"
log_file: "countries.log"
use_json: false
rotation: "daily"
gateway:
  host: "0.0.0.0"
  port: 8080
"#;

        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.gateway.port, 8080);
        assert!(config.postgres.is_none());
        assert_eq!(config.sources.base_currency, "USD");
        assert_eq!(config.sources.timeout(), Duration::from_secs(10));
        assert_eq!(config.summary.image_path, PathBuf::from("cache/summary.svg"));
    }

    #[test]
    fn test_app_config_full() {
        let yaml = r#"
log_level: "debug"
log_dir: "./logs"
log_file: "countries.log"
use_json: true
rotation: "never"
gateway:
  host: "127.0.0.1"
  port: 9000
postgres:
  url: "postgres://localhost/countries"
sources:
  countries_url: "http://localhost:1/countries"
  rates_url: "http://localhost:1/rates"
  timeout_secs: 2
summary:
  image_path: "/tmp/summary.svg"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();

        let pg = config.postgres.unwrap();
        assert_eq!(pg.url, "postgres://localhost/countries");
        assert_eq!(pg.max_connections, 10);
        assert_eq!(pg.acquire_timeout(), Duration::from_secs(5));
        assert_eq!(config.sources.rates_url, "http://localhost:1/rates");
        assert_eq!(config.sources.base_currency, "USD");
        assert_eq!(config.sources.timeout_secs, 2);
        assert_eq!(config.summary.image_path, PathBuf::from("/tmp/summary.svg"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::from_file("config/does-not-exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

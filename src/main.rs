use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use country_exchange::config::AppConfig;
use country_exchange::countries::sources::build_client;
use country_exchange::countries::{
    CountryStore, HttpCountrySource, HttpRateSource, MemoryCountryStore, RandomMultiplier,
    Reconciler, RefreshService, SummaryWriter,
};
use country_exchange::db::Database;
use country_exchange::gateway::{self, AppState};
use country_exchange::logging;

#[derive(Debug, Parser)]
#[command(name = "country_exchange", version, about = "Country exchange-rate service")]
struct Cli {
    /// Loads `config/<env>.yaml`
    #[arg(short, long, env = "APP_ENV", default_value = "dev")]
    env: String,

    /// Overrides `gateway.port`
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.env).with_context(|| format!("loading {} config", cli.env))?;
    let _log_guard = logging::init_logging(&config);

    tracing::info!(env = %cli.env, "Starting country exchange service");

    let store = open_store(&config).await?;

    let client = build_client(&config.sources).context("building HTTP client")?;
    let countries = Arc::new(HttpCountrySource::new(client.clone(), &config.sources));
    let rates = Arc::new(HttpRateSource::new(client, &config.sources));
    tracing::info!(
        countries_url = %config.sources.countries_url,
        rates_url = %rates.url(),
        timeout_secs = config.sources.timeout_secs,
        "Upstream sources configured"
    );

    let reconciler = Reconciler::new(Arc::new(RandomMultiplier::from_entropy()));
    let refresh = RefreshService::new(countries, rates, store.clone(), reconciler)
        .with_summary(SummaryWriter::new(config.summary.image_path.clone()));

    let state = Arc::new(AppState::new(store, Arc::new(refresh)));
    let port = cli.port.unwrap_or(config.gateway.port);

    gateway::run_server(&config.gateway.host, port, state).await
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn CountryStore>> {
    match &config.postgres {
        Some(pg) => {
            let db = Database::connect(pg)
                .await
                .context("connecting to Postgres")?;
            let store = db.country_store().await.context("initialising schema")?;
            tracing::info!("Using Postgres country store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("No postgres section configured; using in-memory store, data is lost on exit");
            Ok(Arc::new(MemoryCountryStore::new()))
        }
    }
}

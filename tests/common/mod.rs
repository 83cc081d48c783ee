//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use country_exchange::countries::models::UpsertOutcome;
use country_exchange::countries::sources::{COUNTRIES_SOURCE, RATES_SOURCE};
use country_exchange::countries::{
    CountryRecord, CountrySource, CountryStore, CountryTx, CurrencyEntry, FixedMultiplier,
    GdpSort, ListFilter, MemoryCountryStore, NewCountry, RateSource, RateTable, RawCountry,
    Reconciler, RefreshService, SourceError, StoreError, SummaryWriter,
};

pub const MULTIPLIER: u32 = 1500;

pub fn raw_country(name: &str, population: Option<i64>, codes: &[&str]) -> RawCountry {
    RawCountry {
        name: Some(name.to_string()),
        capital: Some(format!("{name} City")),
        region: Some("Africa".to_string()),
        population,
        flag: Some(format!("https://flags.example/{}.svg", name.to_lowercase())),
        currencies: Some(
            codes
                .iter()
                .map(|c| CurrencyEntry::CodeWithName {
                    code: Some(c.to_string()),
                    name: None,
                })
                .collect(),
        ),
    }
}

pub fn chad() -> RawCountry {
    RawCountry {
        name: Some("Chad".to_string()),
        population: Some(16_000_000),
        currencies: Some(vec![]),
        ..RawCountry::default()
    }
}

pub fn usd_rates() -> RateTable {
    [
        ("NGN".to_string(), 1600.0),
        ("GHS".to_string(), 15.0),
        ("EUR".to_string(), 0.92),
    ]
    .into_iter()
    .collect()
}

/// Country directory whose contents can be swapped between refreshes
#[derive(Default)]
pub struct StaticCountries(Mutex<Vec<RawCountry>>);

impl StaticCountries {
    pub fn new(countries: Vec<RawCountry>) -> Self {
        Self(Mutex::new(countries))
    }

    pub fn set(&self, countries: Vec<RawCountry>) {
        *self.0.lock().unwrap() = countries;
    }
}

#[async_trait]
impl CountrySource for StaticCountries {
    async fn fetch_countries(&self) -> Result<Vec<RawCountry>, SourceError> {
        Ok(self.0.lock().unwrap().clone())
    }
}

pub struct StaticRates(pub RateTable);

#[async_trait]
impl RateSource for StaticRates {
    async fn fetch_rates(&self) -> Result<RateTable, SourceError> {
        Ok(self.0.clone())
    }
}

pub struct DownCountries;

#[async_trait]
impl CountrySource for DownCountries {
    async fn fetch_countries(&self) -> Result<Vec<RawCountry>, SourceError> {
        Err(SourceError::Status {
            source_name: COUNTRIES_SOURCE,
            status: 502,
        })
    }
}

pub struct DownRates;

#[async_trait]
impl RateSource for DownRates {
    async fn fetch_rates(&self) -> Result<RateTable, SourceError> {
        Err(SourceError::Transport {
            source_name: RATES_SOURCE,
            message: "request timed out".to_string(),
        })
    }
}

/// Memory store that counts transactions and can slow down or fail writes
#[derive(Default)]
pub struct InstrumentedStore {
    pub inner: MemoryCountryStore,
    pub begins: AtomicUsize,
    pub fail_commit: AtomicBool,
    /// 1-based upsert within a transaction that fails; 0 never fails
    pub fail_upsert_at: AtomicUsize,
    pub upsert_delay_ms: AtomicU64,
}

impl InstrumentedStore {
    pub fn begins(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }

    pub fn fail_commits(&self) {
        self.fail_commit.store(true, Ordering::SeqCst);
    }

    pub fn fail_upsert_number(&self, n: usize) {
        self.fail_upsert_at.store(n, Ordering::SeqCst);
    }

    pub fn slow_upserts(&self, delay: Duration) {
        self.upsert_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

struct InstrumentedTx {
    inner: Box<dyn CountryTx>,
    upserts: usize,
    fail_upsert_at: usize,
    upsert_delay: Duration,
    fail_commit: bool,
}

#[async_trait]
impl CountryTx for InstrumentedTx {
    async fn upsert_by_name(
        &mut self,
        country: &NewCountry,
        refreshed_at: DateTime<Utc>,
    ) -> Result<UpsertOutcome, StoreError> {
        self.upserts += 1;
        if !self.upsert_delay.is_zero() {
            tokio::time::sleep(self.upsert_delay).await;
        }
        if self.upserts == self.fail_upsert_at {
            return Err(StoreError::Backend("upsert refused".to_string()));
        }
        self.inner.upsert_by_name(country, refreshed_at).await
    }

    async fn set_metadata(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set_metadata(key, value).await
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        if self.fail_commit {
            self.inner.rollback().await?;
            return Err(StoreError::Backend("commit refused".to_string()));
        }
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.inner.rollback().await
    }
}

#[async_trait]
impl CountryStore for InstrumentedStore {
    async fn begin(&self) -> Result<Box<dyn CountryTx>, StoreError> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.begin().await?;
        Ok(Box::new(InstrumentedTx {
            inner,
            upserts: 0,
            fail_upsert_at: self.fail_upsert_at.load(Ordering::SeqCst),
            upsert_delay: Duration::from_millis(self.upsert_delay_ms.load(Ordering::SeqCst)),
            fail_commit: self.fail_commit.load(Ordering::SeqCst),
        }))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<CountryRecord>, StoreError> {
        self.inner.get_by_name(name).await
    }

    async fn list_all(
        &self,
        filter: &ListFilter,
        sort: GdpSort,
    ) -> Result<Vec<CountryRecord>, StoreError> {
        self.inner.list_all(filter, sort).await
    }

    async fn delete_by_name(&self, name: &str) -> Result<bool, StoreError> {
        self.inner.delete_by_name(name).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.inner.count().await
    }

    async fn get_metadata(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get_metadata(key).await
    }

    async fn set_metadata(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set_metadata(key, value).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }
}

pub fn refresh_service(
    countries: Arc<dyn CountrySource>,
    rates: Arc<dyn RateSource>,
    store: Arc<dyn CountryStore>,
) -> RefreshService {
    RefreshService::new(
        countries,
        rates,
        store,
        Reconciler::new(Arc::new(FixedMultiplier(MULTIPLIER))),
    )
}

/// Unique scratch directory under the system temp dir
pub fn scratch_dir(label: &str) -> PathBuf {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let n = NEXT.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "country-exchange-{label}-{}-{n}",
        std::process::id()
    ))
}

pub fn summary_writer(dir: &std::path::Path) -> SummaryWriter {
    SummaryWriter::new(dir.join("summary.svg"))
}

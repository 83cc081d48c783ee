//! Refresh orchestration
//!
//! ```text
//! ┌───────────┐   ┌───────────┐   ┌────────────┐   ┌──────────┐   ┌─────────┐
//! │ Countries │──▶│           │   │            │   │  Store   │   │ Summary │
//! │  source   │   │ Reconciler│──▶│ validate + │──▶│ (one tx) │──▶│ (best   │
//! │  Rates    │──▶│           │   │  upsert    │   │  commit  │   │ effort) │
//! └───────────┘   └───────────┘   └────────────┘   └──────────┘   └─────────┘
//! ```
//!
//! Source failures abort before the store is touched. A validation or store
//! failure rolls the whole batch back, metadata included.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{error, info, warn};

use super::error::{RefreshError, StoreError, SummaryError};
use super::models::{
    GdpSort, LAST_REFRESHED_AT_KEY, ListFilter, ReconciledCountry, RefreshSummary, UpsertOutcome,
    format_timestamp,
};
use super::reconcile::Reconciler;
use super::sources::{CountrySource, RateSource};
use super::store::{CountryStore, CountryTx};
use super::summary::{SummaryReport, SummaryWriter};

pub struct RefreshService {
    countries: Arc<dyn CountrySource>,
    rates: Arc<dyn RateSource>,
    store: Arc<dyn CountryStore>,
    reconciler: Reconciler,
    summary: Option<SummaryWriter>,
}

impl RefreshService {
    pub fn new(
        countries: Arc<dyn CountrySource>,
        rates: Arc<dyn RateSource>,
        store: Arc<dyn CountryStore>,
        reconciler: Reconciler,
    ) -> Self {
        Self {
            countries,
            rates,
            store,
            reconciler,
            summary: None,
        }
    }

    /// Write a summary artifact after every committed refresh
    pub fn with_summary(mut self, writer: SummaryWriter) -> Self {
        self.summary = Some(writer);
        self
    }

    pub fn summary_writer(&self) -> Option<&SummaryWriter> {
        self.summary.as_ref()
    }

    pub async fn refresh(&self) -> Result<RefreshSummary, RefreshError> {
        let (raw, rates) =
            tokio::try_join!(self.countries.fetch_countries(), self.rates.fetch_rates())
                .inspect_err(|e| warn!(source = e.source_name(), error = %e, "Refresh aborted: source unavailable"))?;

        info!(
            countries = raw.len(),
            rates = rates.len(),
            "Fetched upstream data"
        );

        let candidates = self.reconciler.reconcile_all(&raw, &rates);
        // Postgres keeps microseconds; truncate so the response matches what is stored
        let refreshed_at = Utc::now().trunc_subsecs(6);

        let total_processed = self.commit_batch(candidates, refreshed_at).await?;

        if let Err(e) = self.publish_summary(refreshed_at).await {
            error!(error = %e, "Failed to generate summary image");
        }

        Ok(RefreshSummary {
            total_processed,
            refreshed_at,
        })
    }

    /// Run [`refresh`](Self::refresh) on its own task.
    ///
    /// Dropping the returned future (for example when the HTTP client goes
    /// away) does not cancel the refresh: a transaction that has begun still
    /// runs to commit or rollback, and the summary is still written.
    pub async fn refresh_detached(self: Arc<Self>) -> Result<RefreshSummary, RefreshError> {
        tokio::spawn(async move { self.refresh().await })
            .await
            .map_err(|e| {
                error!(error = %e, "Refresh task failed");
                RefreshError::StoreFailure(StoreError::Backend(format!("refresh task failed: {e}")))
            })?
    }

    async fn commit_batch(
        &self,
        candidates: Vec<ReconciledCountry>,
        refreshed_at: DateTime<Utc>,
    ) -> Result<usize, RefreshError> {
        let mut tx = self.store.begin().await.inspect_err(|e| {
            error!(error = %e, "Refresh aborted: could not open transaction");
        })?;

        let total = candidates.len();
        let (mut inserted, mut updated) = (0usize, 0usize);

        for (index, candidate) in candidates.into_iter().enumerate() {
            let country = match candidate.validate(index) {
                Ok(country) => country,
                Err(invalid) => {
                    warn!(error = %invalid, "Refresh aborted: invalid record");
                    return Err(abort(tx, invalid.into()).await);
                }
            };

            match tx.upsert_by_name(&country, refreshed_at).await {
                Ok(UpsertOutcome::Inserted) => inserted += 1,
                Ok(UpsertOutcome::Updated) => updated += 1,
                Err(e) => return Err(abort(tx, store_failure(e)).await),
            }
        }

        if let Err(e) = tx
            .set_metadata(LAST_REFRESHED_AT_KEY, &format_timestamp(&refreshed_at))
            .await
        {
            return Err(abort(tx, store_failure(e)).await);
        }

        tx.commit().await.map_err(store_failure)?;

        info!(
            total,
            inserted,
            updated,
            refreshed_at = %refreshed_at,
            "Refresh committed"
        );
        Ok(total)
    }

    async fn publish_summary(&self, refreshed_at: DateTime<Utc>) -> Result<(), SummaryError> {
        let Some(writer) = &self.summary else {
            return Ok(());
        };

        let total = self.store.count().await?;
        let ranked = self
            .store
            .list_all(&ListFilter::default(), GdpSort::GdpDesc)
            .await?;
        let report = SummaryReport::from_ranked(total, &ranked, refreshed_at);
        writer.write(&report).await?;

        info!(path = %writer.path().display(), "Summary image written");
        Ok(())
    }
}

fn store_failure(e: StoreError) -> RefreshError {
    error!(error = %e, "Refresh aborted: store failure");
    RefreshError::StoreFailure(e)
}

/// Roll back and hand back the error that caused it
async fn abort(tx: Box<dyn CountryTx>, cause: RefreshError) -> RefreshError {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Rollback failed; transaction dropped");
    }
    cause
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countries::error::SourceError;
    use crate::countries::models::{CurrencyEntry, RateTable, RawCountry};
    use crate::countries::reconcile::FixedMultiplier;
    use crate::countries::store::MemoryCountryStore;
    use async_trait::async_trait;

    struct Countries(Vec<RawCountry>);

    #[async_trait]
    impl CountrySource for Countries {
        async fn fetch_countries(&self) -> Result<Vec<RawCountry>, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct Rates;

    #[async_trait]
    impl RateSource for Rates {
        async fn fetch_rates(&self) -> Result<RateTable, SourceError> {
            Ok([("GHS".to_string(), 4.0)].into_iter().collect())
        }
    }

    fn raw(name: Option<&str>, population: Option<i64>, code: Option<&str>) -> RawCountry {
        RawCountry {
            name: name.map(str::to_string),
            population,
            currencies: Some(
                code.map(|c| vec![CurrencyEntry::CodeOnly(c.to_string())])
                    .unwrap_or_default(),
            ),
            ..RawCountry::default()
        }
    }

    fn service(raw: Vec<RawCountry>, store: Arc<MemoryCountryStore>) -> RefreshService {
        RefreshService::new(
            Arc::new(Countries(raw)),
            Arc::new(Rates),
            store,
            Reconciler::new(Arc::new(FixedMultiplier(1000))),
        )
    }

    #[tokio::test]
    async fn test_refresh_commits_batch_and_metadata() {
        let store = Arc::new(MemoryCountryStore::new());
        let svc = service(
            vec![
                raw(Some("Ghana"), Some(4), Some("GHS")),
                raw(Some("Chad"), Some(16_000_000), None),
            ],
            store.clone(),
        );

        let summary = svc.refresh().await.unwrap();
        assert_eq!(summary.total_processed, 2);

        let ghana = store.get_by_name("ghana").await.unwrap().unwrap();
        assert_eq!(ghana.estimated_gdp, Some(1000.0));
        assert_eq!(ghana.last_refreshed_at, summary.refreshed_at);

        let meta = store.get_metadata(LAST_REFRESHED_AT_KEY).await.unwrap();
        assert_eq!(meta, Some(format_timestamp(&summary.refreshed_at)));
    }

    #[tokio::test]
    async fn test_invalid_record_rolls_back_everything() {
        let store = Arc::new(MemoryCountryStore::new());
        let svc = service(
            vec![
                raw(Some("Ghana"), Some(4), Some("GHS")),
                raw(Some("Nowhere"), None, None),
            ],
            store.clone(),
        );

        let err = svc.refresh().await.unwrap_err();
        match err {
            RefreshError::InvalidRecord(invalid) => assert_eq!(invalid.index, 1),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.get_metadata(LAST_REFRESHED_AT_KEY).await.unwrap(), None);
    }
}

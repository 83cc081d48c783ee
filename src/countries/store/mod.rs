//! Country store abstraction
//!
//! [`CountryStore`] is the read side plus single-statement writes.
//! Batch writes go through a [`CountryTx`] opened with [`CountryStore::begin`]:
//! nothing written through the transaction is visible to readers until
//! [`CountryTx::commit`], and dropping or rolling it back discards every write.
//! Transactions are serialized, so two refreshes never interleave.

pub mod memory;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::StoreError;
use super::models::{CountryRecord, GdpSort, ListFilter, NewCountry, UpsertOutcome};

pub use memory::MemoryCountryStore;
pub use postgres::PgCountryStore;

/// Durable collection of countries keyed by case-insensitive name
#[async_trait]
pub trait CountryStore: Send + Sync {
    /// Open a write transaction. Waits while another transaction is open.
    async fn begin(&self) -> Result<Box<dyn CountryTx>, StoreError>;

    /// Case-insensitive lookup
    async fn get_by_name(&self, name: &str) -> Result<Option<CountryRecord>, StoreError>;

    async fn list_all(
        &self,
        filter: &ListFilter,
        sort: GdpSort,
    ) -> Result<Vec<CountryRecord>, StoreError>;

    /// Case-insensitive delete. Returns false when nothing matched.
    async fn delete_by_name(&self, name: &str) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    async fn get_metadata(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_metadata(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    /// Single upsert in its own transaction
    async fn upsert_by_name(
        &self,
        country: &NewCountry,
        refreshed_at: DateTime<Utc>,
    ) -> Result<UpsertOutcome, StoreError> {
        let mut tx = self.begin().await?;
        let outcome = tx.upsert_by_name(country, refreshed_at).await?;
        tx.commit().await?;
        Ok(outcome)
    }
}

/// Open write transaction against a [`CountryStore`]
#[async_trait]
pub trait CountryTx: Send {
    /// Update the row whose name matches case-insensitively, or insert a new one.
    /// Every column is overwritten, including the stored spelling of the name.
    async fn upsert_by_name(
        &mut self,
        country: &NewCountry,
        refreshed_at: DateTime<Utc>,
    ) -> Result<UpsertOutcome, StoreError>;

    async fn set_metadata(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Identity key used for case-insensitive matching
pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

//! In-memory country store
//!
//! Used when no PostgreSQL URL is configured, and by tests. A transaction
//! holds the writer lock for its whole lifetime and works on a private copy
//! of the state; commit swaps the copy in under a short write lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::{CountryStore, CountryTx, name_key};
use crate::countries::error::StoreError;
use crate::countries::models::{CountryRecord, GdpSort, ListFilter, NewCountry, UpsertOutcome};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    /// Keyed by id, so iteration is insertion order
    countries: BTreeMap<i64, CountryRecord>,
    ids_by_name: HashMap<String, i64>,
    metadata: HashMap<String, String>,
    next_id: i64,
}

impl MemoryState {
    fn upsert(&mut self, country: &NewCountry, refreshed_at: DateTime<Utc>) -> UpsertOutcome {
        let key = name_key(&country.name);
        match self.ids_by_name.get(&key) {
            Some(&id) => {
                let record = CountryRecord::from_new(id, country.clone(), refreshed_at);
                self.countries.insert(id, record);
                UpsertOutcome::Updated
            }
            None => {
                self.next_id += 1;
                let id = self.next_id;
                let record = CountryRecord::from_new(id, country.clone(), refreshed_at);
                self.countries.insert(id, record);
                self.ids_by_name.insert(key, id);
                UpsertOutcome::Inserted
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryCountryStore {
    state: Arc<RwLock<MemoryState>>,
    writer: Arc<Mutex<()>>,
}

impl MemoryCountryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CountryStore for MemoryCountryStore {
    async fn begin(&self) -> Result<Box<dyn CountryTx>, StoreError> {
        let guard = self.writer.clone().lock_owned().await;
        let staged = self.state.read().await.clone();
        Ok(Box::new(MemoryTx {
            _writer: guard,
            staged,
            target: self.state.clone(),
        }))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<CountryRecord>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .ids_by_name
            .get(&name_key(name))
            .and_then(|id| state.countries.get(id))
            .cloned())
    }

    async fn list_all(
        &self,
        filter: &ListFilter,
        sort: GdpSort,
    ) -> Result<Vec<CountryRecord>, StoreError> {
        let state = self.state.read().await;
        let mut records: Vec<CountryRecord> = state
            .countries
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        if sort != GdpSort::None {
            records.sort_by(|a, b| sort.compare(a, b));
        }
        Ok(records)
    }

    async fn delete_by_name(&self, name: &str) -> Result<bool, StoreError> {
        let _writer = self.writer.lock().await;
        let mut state = self.state.write().await;
        match state.ids_by_name.remove(&name_key(name)) {
            Some(id) => {
                state.countries.remove(&id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.state.read().await.countries.len())
    }

    async fn get_metadata(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.state.read().await.metadata.get(key).cloned())
    }

    async fn set_metadata(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _writer = self.writer.lock().await;
        self.state
            .write()
            .await
            .metadata
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

struct MemoryTx {
    _writer: OwnedMutexGuard<()>,
    staged: MemoryState,
    target: Arc<RwLock<MemoryState>>,
}

#[async_trait]
impl CountryTx for MemoryTx {
    async fn upsert_by_name(
        &mut self,
        country: &NewCountry,
        refreshed_at: DateTime<Utc>,
    ) -> Result<UpsertOutcome, StoreError> {
        Ok(self.staged.upsert(country, refreshed_at))
    }

    async fn set_metadata(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.staged
            .metadata
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx {
            _writer,
            staged,
            target,
        } = *self;
        *target.write().await = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

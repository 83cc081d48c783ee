//! Country reconciliation pipeline
//!
//! - [`sources`] - Country directory and exchange rate gateways
//! - [`reconcile`] - Currency / GDP derivation per country
//! - [`store`] - Case-insensitive, transactional country store
//! - [`refresh`] - Fetch, reconcile and commit as one unit of work
//! - [`summary`] - Best-effort summary artifact

pub mod error;
pub mod models;
pub mod reconcile;
pub mod refresh;
pub mod sources;
pub mod store;
pub mod summary;

pub use error::{InvalidRecord, RecordViolation, RefreshError, SourceError, StoreError};
pub use models::{
    CountryRecord, CurrencyEntry, GdpSort, ListFilter, NewCountry, RateTable, RawCountry,
    RefreshSummary,
};
pub use reconcile::{FixedMultiplier, MultiplierSource, RandomMultiplier, Reconciler};
pub use refresh::RefreshService;
pub use sources::{CountrySource, HttpCountrySource, HttpRateSource, RateSource};
pub use store::{CountryStore, CountryTx, MemoryCountryStore, PgCountryStore};
pub use summary::SummaryWriter;

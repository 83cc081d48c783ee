//! Country domain types
//!
//! - Raw upstream shapes ([`RawCountry`], [`CurrencyEntry`], [`RateTable`])
//! - The reconciled candidate ([`ReconciledCountry`]) and its validated form ([`NewCountry`])
//! - The stored record ([`CountryRecord`]) and query parameters

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

use super::error::{InvalidRecord, RecordViolation};

/// Maximum length of a stored currency code
pub const MAX_CURRENCY_CODE_LEN: usize = 10;

/// Metadata key holding the timestamp of the last committed refresh
pub const LAST_REFRESHED_AT_KEY: &str = "last_refreshed_at";

/// RFC 3339 in UTC with microseconds, used for every timestamp the service emits
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn serialize_timestamp<S: Serializer>(
    ts: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(ts))
}

// ============================================================================
// Upstream shapes
// ============================================================================

/// One entry of a country's currency list.
///
/// The directory sends either a bare code (`"NGN"`) or an object
/// (`{"code": "NGN", "name": "Nigerian naira", "symbol": "₦"}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CurrencyEntry {
    CodeOnly(String),
    CodeWithName {
        code: Option<String>,
        name: Option<String>,
    },
}

impl CurrencyEntry {
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::CodeOnly(code) => Some(code.as_str()),
            Self::CodeWithName { code, .. } => code.as_deref(),
        }
    }
}

/// Country as delivered by the country directory
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCountry {
    pub name: Option<String>,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: Option<i64>,
    pub flag: Option<String>,
    /// Missing and `null` are treated like an empty list
    pub currencies: Option<Vec<CurrencyEntry>>,
}

impl RawCountry {
    pub fn currency_entries(&self) -> &[CurrencyEntry] {
        self.currencies.as_deref().unwrap_or(&[])
    }
}

/// Result of looking a currency code up in a [`RateTable`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateLookup {
    /// Code is not quoted by the rate source
    Missing,
    /// Code is quoted but the value is not a number
    Unusable,
    Rate(f64),
}

/// Currency code -> units per 1 USD
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, Option<f64>>,
}

impl RateTable {
    /// Build from the raw JSON values of the rate source's `rates` object.
    ///
    /// Numbers and numeric strings are accepted; anything else is kept as
    /// present-but-unusable so lookups can tell it apart from a missing code.
    pub fn from_values(values: HashMap<String, serde_json::Value>) -> Self {
        let rates = values
            .into_iter()
            .map(|(code, value)| {
                let rate = match &value {
                    serde_json::Value::Number(n) => n.as_f64(),
                    serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                (code, rate)
            })
            .collect();
        Self { rates }
    }

    pub fn lookup(&self, code: &str) -> RateLookup {
        match self.rates.get(code) {
            None => RateLookup::Missing,
            Some(None) => RateLookup::Unusable,
            Some(Some(rate)) => RateLookup::Rate(*rate),
        }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromIterator<(String, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            rates: iter
                .into_iter()
                .map(|(code, rate)| (code, Some(rate)))
                .collect(),
        }
    }
}

// ============================================================================
// Reconciled / stored shapes
// ============================================================================

/// Output of the reconciler, not yet validated
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledCountry {
    pub name: Option<String>,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: Option<i64>,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
}

impl ReconciledCountry {
    /// Check required fields; `index` is the candidate's position in its batch.
    pub fn validate(self, index: usize) -> Result<NewCountry, InvalidRecord> {
        let mut violations = Vec::new();

        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        if name.is_none() {
            violations.push(RecordViolation::MissingName);
        }
        if self.population.is_none() {
            violations.push(RecordViolation::MissingPopulation);
        }
        if self
            .currency_code
            .as_ref()
            .is_some_and(|c| c.chars().count() > MAX_CURRENCY_CODE_LEN)
        {
            violations.push(RecordViolation::CurrencyCodeTooLong);
        }

        match (name, self.population) {
            (Some(name), Some(population)) if violations.is_empty() => Ok(NewCountry {
                name,
                capital: self.capital,
                region: self.region,
                population,
                exchange_rate: self.currency_code.as_ref().and(self.exchange_rate),
                currency_code: self.currency_code,
                estimated_gdp: self.estimated_gdp,
                flag_url: self.flag_url,
            }),
            _ => Err(InvalidRecord {
                index,
                name: self.name,
                violations,
            }),
        }
    }
}

/// A validated country ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewCountry {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
}

/// Stored country record
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, sqlx::FromRow)]
pub struct CountryRecord {
    #[schema(example = 42)]
    pub id: i64,
    #[schema(example = "Nigeria")]
    pub name: String,
    #[schema(example = "Abuja")]
    pub capital: Option<String>,
    #[schema(example = "Africa")]
    pub region: Option<String>,
    #[schema(example = 206139589)]
    pub population: i64,
    #[schema(example = "NGN")]
    pub currency_code: Option<String>,
    #[schema(example = 1600.23)]
    pub exchange_rate: Option<f64>,
    #[schema(example = 25767448125.2)]
    pub estimated_gdp: Option<f64>,
    #[schema(example = "https://flagcdn.com/ng.svg")]
    pub flag_url: Option<String>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_refreshed_at: DateTime<Utc>,
}

impl CountryRecord {
    pub fn from_new(id: i64, country: NewCountry, last_refreshed_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: country.name,
            capital: country.capital,
            region: country.region,
            population: country.population,
            currency_code: country.currency_code,
            exchange_rate: country.exchange_rate,
            estimated_gdp: country.estimated_gdp,
            flag_url: country.flag_url,
            last_refreshed_at,
        }
    }
}

/// Whether an upsert created a row or overwrote an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

// ============================================================================
// Query parameters
// ============================================================================

/// Exact-match filters for listing countries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub region: Option<String>,
    pub currency_code: Option<String>,
}

impl ListFilter {
    pub fn matches(&self, record: &CountryRecord) -> bool {
        let region_ok = self
            .region
            .as_ref()
            .is_none_or(|r| record.region.as_ref() == Some(r));
        let currency_ok = self
            .currency_code
            .as_ref()
            .is_none_or(|c| record.currency_code.as_ref() == Some(c));
        region_ok && currency_ok
    }
}

/// Ordering of a country listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GdpSort {
    /// Insertion order
    #[default]
    None,
    GdpAsc,
    GdpDesc,
}

impl GdpSort {
    /// Parse the `sort` query value; unknown values keep insertion order.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("gdp_asc") => Self::GdpAsc,
            Some("gdp_desc") => Self::GdpDesc,
            _ => Self::None,
        }
    }

    /// Compare two records' GDP. Unknown GDP sorts last in both directions.
    pub fn compare(self, a: &CountryRecord, b: &CountryRecord) -> Ordering {
        let by_gdp = match (a.estimated_gdp, b.estimated_gdp) {
            (Some(x), Some(y)) => match self {
                Self::GdpAsc => x.total_cmp(&y),
                Self::GdpDesc => y.total_cmp(&x),
                Self::None => Ordering::Equal,
            },
            (Some(_), None) if self != Self::None => Ordering::Less,
            (None, Some(_)) if self != Self::None => Ordering::Greater,
            _ => Ordering::Equal,
        };
        by_gdp.then(a.id.cmp(&b.id))
    }
}

/// Outcome of one successful refresh
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSummary {
    pub total_processed: usize,
    pub refreshed_at: DateTime<Utc>,
}

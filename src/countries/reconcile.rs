//! Reconciliation of a directory country with the USD rate table
//!
//! Derivation policy, applied per country:
//!
//! | currencies        | code in rate table | currency_code | exchange_rate | estimated_gdp            |
//! |-------------------|--------------------|---------------|---------------|--------------------------|
//! | empty / missing   | -                  | null          | null          | `0`                      |
//! | first has no code | -                  | null          | null          | null                     |
//! | first code        | missing            | code          | null          | null                     |
//! | first code        | not numeric        | code          | null          | null                     |
//! | first code        | rate               | code          | rate          | `pop * m / rate`         |
//!
//! `m` is drawn from [`MULTIPLIER_RANGE`] by the injected [`MultiplierSource`].
//! A zero rate or a non-finite result leaves the GDP unknown.

use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::models::{RateLookup, RateTable, RawCountry, ReconciledCountry};

/// Inclusive range of the GDP-per-capita stand-in multiplier
pub const MULTIPLIER_RANGE: RangeInclusive<u32> = 1000..=2000;

/// Supplies the GDP multiplier for each country
pub trait MultiplierSource: Send + Sync {
    fn next_multiplier(&self) -> u32;
}

/// Uniform draw from [`MULTIPLIER_RANGE`]
pub struct RandomMultiplier {
    rng: Mutex<StdRng>,
}

impl RandomMultiplier {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl MultiplierSource for RandomMultiplier {
    fn next_multiplier(&self) -> u32 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(MULTIPLIER_RANGE)
    }
}

/// Always returns the same multiplier
#[derive(Debug, Clone, Copy)]
pub struct FixedMultiplier(pub u32);

impl MultiplierSource for FixedMultiplier {
    fn next_multiplier(&self) -> u32 {
        self.0
    }
}

/// Turns raw directory entries into reconciled candidates
#[derive(Clone)]
pub struct Reconciler {
    multiplier: Arc<dyn MultiplierSource>,
}

impl Reconciler {
    pub fn new(multiplier: Arc<dyn MultiplierSource>) -> Self {
        Self { multiplier }
    }

    pub fn reconcile_all(&self, raw: &[RawCountry], rates: &RateTable) -> Vec<ReconciledCountry> {
        raw.iter().map(|c| self.reconcile(c, rates)).collect()
    }

    pub fn reconcile(&self, raw: &RawCountry, rates: &RateTable) -> ReconciledCountry {
        let (currency_code, exchange_rate, estimated_gdp) = match raw.currency_entries().first() {
            None => (None, None, Some(0.0)),
            Some(entry) => {
                let code = entry.code().map(str::to_string);
                let rate = match code.as_deref().map(|c| rates.lookup(c)) {
                    Some(RateLookup::Rate(rate)) => Some(rate),
                    _ => None,
                };
                let gdp = match (rate, raw.population) {
                    (Some(rate), Some(population)) => {
                        estimate_gdp(population, self.multiplier.next_multiplier(), rate)
                    }
                    _ => None,
                };
                (code, rate, gdp)
            }
        };

        ReconciledCountry {
            name: raw.name.clone(),
            capital: raw.capital.clone(),
            region: raw.region.clone(),
            population: raw.population,
            currency_code,
            exchange_rate,
            estimated_gdp,
            flag_url: raw.flag.clone(),
        }
    }
}

/// `population * multiplier / rate`, or `None` when the division is meaningless
pub fn estimate_gdp(population: i64, multiplier: u32, rate: f64) -> Option<f64> {
    if rate == 0.0 || !rate.is_finite() {
        return None;
    }
    let gdp = population as f64 * f64::from(multiplier) / rate;
    gdp.is_finite().then_some(gdp)
}

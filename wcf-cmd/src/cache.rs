//! Caller-owned memo of forecast outcomes.
//!
//! The forecasting crates hold no state between calls; a command that needs
//! the same forecast more than once keeps one of these and asks it first.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use wcf_core::{AccountId, Observation};
use wcf_forecast::{ForecastOutcome, GradientBoostingParams};

/// Fingerprint of everything a forecast depends on.
///
/// Consumption is hashed by bit pattern, so `0.0` and `-0.0` differ.
pub fn fingerprint(
    account_id: &AccountId,
    horizon_days: usize,
    series: &[Observation],
    params: &GradientBoostingParams,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    account_id.hash(&mut hasher);
    horizon_days.hash(&mut hasher);
    series.len().hash(&mut hasher);
    for obs in series {
        obs.date.hash(&mut hasher);
        obs.consumption.to_bits().hash(&mut hasher);
    }
    params.n_estimators.hash(&mut hasher);
    params.learning_rate.to_bits().hash(&mut hasher);
    params.max_depth.hash(&mut hasher);
    params.subsample.to_bits().hash(&mut hasher);
    params.colsample.to_bits().hash(&mut hasher);
    params.min_samples_leaf.hash(&mut hasher);
    params.seed.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Default)]
pub struct ForecastCache {
    entries: HashMap<u64, ForecastOutcome>,
    hits: u64,
    misses: u64,
}

impl ForecastCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached outcome for `key`, computing it with `compute` on a miss.
    ///
    /// Failed computations are not stored.
    pub fn get_or_compute<F>(&mut self, key: u64, compute: F) -> wcf_core::Result<&ForecastOutcome>
    where
        F: FnOnce() -> wcf_core::Result<ForecastOutcome>,
    {
        if self.entries.contains_key(&key) {
            self.hits += 1;
            log::debug!("cache: hit for {:016x}", key);
        } else {
            self.misses += 1;
            log::debug!("cache: miss for {:016x}", key);
            let outcome = compute()?;
            self.entries.insert(key, outcome);
        }
        Ok(&self.entries[&key])
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

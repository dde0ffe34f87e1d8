//! Supervised-learning table construction.
//!
//! Every feature of row `i` is computed from consumption values strictly
//! before `i`. Offsets are positional: `lag_7` is seven readings back, which
//! is seven days back only when the series has no missing days.

use serde::{Deserialize, Serialize};
use wcf_core::calendar::CalendarFeatures;
use wcf_core::{ForecastError, Observation, Result};

/// Number of positions a row needs behind it before all features are defined.
pub const LAG_WINDOW: usize = 7;

/// Smallest series that yields at least one trainable row.
pub const MIN_HISTORY: usize = LAG_WINDOW + 1;

pub const N_FEATURES: usize = 7;

/// Column order of [`FeatureVector`].
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "year",
    "month",
    "day",
    "dayofweek",
    "lag_1",
    "lag_7",
    "rolling_mean_7",
];

/// Dense model input, ordered as [`FEATURE_NAMES`].
pub type FeatureVector = [f64; N_FEATURES];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub calendar: CalendarFeatures,
    pub lag_1: f64,
    pub lag_7: f64,
    pub rolling_mean_7: f64,
}

impl FeatureRow {
    pub fn to_vector(&self) -> FeatureVector {
        [
            f64::from(self.calendar.year),
            f64::from(self.calendar.month),
            f64::from(self.calendar.day),
            f64::from(self.calendar.day_of_week),
            self.lag_1,
            self.lag_7,
            self.rolling_mean_7,
        ]
    }
}

/// Feature rows paired with their targets, plus the count of leading rows
/// dropped for lack of history.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingTable {
    pub rows: Vec<FeatureRow>,
    pub targets: Vec<f64>,
    pub dropped: usize,
}

impl TrainingTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn feature_matrix(&self) -> Vec<FeatureVector> {
        self.rows.iter().map(FeatureRow::to_vector).collect()
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Build the training table for a date-sorted series.
///
/// The first [`LAG_WINDOW`] rows have undefined lags and are dropped; each
/// remaining row's target is its own consumption.
pub fn build_features(series: &[Observation]) -> Result<TrainingTable> {
    if series.is_empty() {
        return Err(ForecastError::InvalidInput("empty series".to_string()));
    }
    if series.windows(2).any(|pair| pair[1].date < pair[0].date) {
        return Err(ForecastError::InvalidInput(
            "series is not sorted by date".to_string(),
        ));
    }
    if series.len() < MIN_HISTORY {
        return Err(ForecastError::InsufficientHistory {
            needed: MIN_HISTORY,
            found: series.len(),
        });
    }

    let consumption: Vec<f64> = series.iter().map(|obs| obs.consumption).collect();
    let mut rows = Vec::with_capacity(series.len() - LAG_WINDOW);
    let mut targets = Vec::with_capacity(series.len() - LAG_WINDOW);
    for i in LAG_WINDOW..series.len() {
        rows.push(FeatureRow {
            calendar: series[i].date.into(),
            lag_1: consumption[i - 1],
            lag_7: consumption[i - LAG_WINDOW],
            rolling_mean_7: mean(&consumption[i - LAG_WINDOW..i]),
        });
        targets.push(consumption[i]);
    }

    Ok(TrainingTable {
        rows,
        targets,
        dropped: LAG_WINDOW,
    })
}

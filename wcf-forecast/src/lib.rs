//! Per-account water consumption forecasting.
//!
//! Builds lag and rolling-mean features from a daily consumption series,
//! trains a regressor on them, and forecasts the following days one at a
//! time, feeding each prediction back in as history.
//!
//! Every call is a pure function of its inputs: nothing is cached and the
//! trained model is dropped before returning. Forecasts for different
//! accounts are independent and can run on separate threads.
//!
//! # Usage
//!
//! ```rust
//! use chrono::{NaiveDate, TimeDelta};
//! use wcf_core::{AccountId, Observation};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let dataset: Vec<Observation> = (0..40)
//!     .map(|i| Observation::new("1001", start + TimeDelta::days(i), 250.0))
//!     .collect();
//!
//! let outcome = wcf_forecast::forecast_account(&dataset, &AccountId::from("1001"), 30).unwrap();
//! assert_eq!(outcome.forecast_rows.len(), 30);
//! assert_eq!(outcome.extended_series.len(), 70);
//! ```

pub mod comparison;
pub mod features;
pub mod gbt;
pub mod recursive;
pub mod regressor;

pub use comparison::{compare_with_last_year, LastYearComparison};
pub use features::{build_features, FeatureRow, FeatureVector, TrainingTable};
pub use gbt::{GradientBoostedTrees, GradientBoostingParams};
pub use recursive::{forecast, ForecastOutcome};
pub use regressor::Regressor;

use wcf_core::series::prepare_series;
use wcf_core::{AccountId, Observation, Result};

/// Forecast horizon used when the caller does not choose one.
pub const DEFAULT_HORIZON_DAYS: usize = 30;

/// Forecast one account out of a multi-account dataset with the default
/// gradient-boosted model.
pub fn forecast_account(
    dataset: &[Observation],
    account_id: &AccountId,
    horizon_days: usize,
) -> Result<ForecastOutcome> {
    forecast_account_with(dataset, account_id, horizon_days, &GradientBoostingParams::default())
}

/// Same as [`forecast_account`] with caller-supplied model parameters.
pub fn forecast_account_with(
    dataset: &[Observation],
    account_id: &AccountId,
    horizon_days: usize,
    params: &GradientBoostingParams,
) -> Result<ForecastOutcome> {
    let series = prepare_series(dataset, account_id)?;
    let mut model = GradientBoostedTrees::new(params.clone());
    forecast(&series, account_id, horizon_days, &mut model)
}

//! Recursive multi-day forecasting.
//!
//! The model is trained once on the series' feature table, then queried one
//! day at a time. Each prediction is appended to the working history so the
//! next day's lags and rolling mean see it, which makes the loop a strict
//! chain: day `k + 1` cannot be computed before day `k`.

use crate::features::{build_features, FeatureRow, LAG_WINDOW};
use crate::regressor::Regressor;
use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;
use wcf_core::series::{sort_series, validate_series};
use wcf_core::{AccountId, ExtendedRow, ForecastError, ForecastRow, Observation, Result};

/// Result of forecasting one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastOutcome {
    /// Sum of every forecast row's consumption, in the input's unit.
    pub total_consumption: f64,
    pub forecast_rows: Vec<ForecastRow>,
    /// History (`is_forecast = false`) followed by the forecast, date-sorted.
    pub extended_series: Vec<ExtendedRow>,
}

/// Features for the day after `history`, computed the same way the
/// training table computes them for an observed row.
///
/// With fewer than seven values `lag_7` falls back to the last value and the
/// rolling mean covers whatever is available. Empty history has no features.
pub(crate) fn next_step_features(history: &[f64], date: NaiveDate) -> Option<FeatureRow> {
    let last = *history.last()?;
    let window = &history[history.len().saturating_sub(LAG_WINDOW)..];
    let lag_7 = if history.len() >= LAG_WINDOW {
        history[history.len() - LAG_WINDOW]
    } else {
        last
    };
    Some(FeatureRow {
        calendar: date.into(),
        lag_1: last,
        lag_7,
        rolling_mean_7: window.iter().sum::<f64>() / window.len() as f64,
    })
}

/// Train `model` on `series` and forecast the `horizon_days` days after its
/// last date.
///
/// `series` must already be filtered to `account_id`; it is sorted by date
/// here. Predictions are not clamped, so a model may emit negative values.
pub fn forecast<R: Regressor + ?Sized>(
    series: &[Observation],
    account_id: &AccountId,
    horizon_days: usize,
    model: &mut R,
) -> Result<ForecastOutcome> {
    if series.is_empty() {
        return Err(ForecastError::NoData {
            account_id: account_id.to_string(),
        });
    }
    if horizon_days == 0 {
        return Err(ForecastError::InvalidInput(
            "horizon must be at least one day".to_string(),
        ));
    }
    if let Some(other) = series.iter().find(|obs| &obs.account_id != account_id) {
        return Err(ForecastError::InvalidInput(format!(
            "series for account {} contains a row for account {}",
            account_id, other.account_id
        )));
    }

    let mut series = series.to_vec();
    sort_series(&mut series);
    validate_series(&series)?;

    let table = build_features(&series)?;
    model.fit(&table.feature_matrix(), &table.targets)?;

    // Recursion reads raw values, including the rows dropped from training.
    let mut history: Vec<f64> = series.iter().map(|obs| obs.consumption).collect();
    let last_date = series[series.len() - 1].date;
    let mut forecast_rows = Vec::with_capacity(horizon_days);

    for step in 1..=horizon_days {
        let next_date = TimeDelta::try_days(step as i64)
            .and_then(|delta| last_date.checked_add_signed(delta))
            .ok_or_else(|| {
                ForecastError::InvalidInput(format!(
                    "forecast date {} days after {} is out of range",
                    step, last_date
                ))
            })?;
        let features = next_step_features(&history, next_date).ok_or_else(|| {
            ForecastError::InvalidInput("forecast history is empty".to_string())
        })?;
        let predicted = model.predict_one(&features.to_vector())?;
        history.push(predicted);
        forecast_rows.push(ForecastRow::new(account_id.clone(), next_date, predicted));
    }

    let total_consumption = forecast_rows.iter().map(|row| row.consumption).sum();
    let mut extended_series: Vec<ExtendedRow> = series.iter().map(ExtendedRow::from).collect();
    extended_series.extend(forecast_rows.iter().map(ExtendedRow::from));
    extended_series.sort_by_key(|row| row.date);

    Ok(ForecastOutcome {
        total_consumption,
        forecast_rows,
        extended_series,
    })
}

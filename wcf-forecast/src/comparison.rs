//! Forecast total against the account's own usage over the past year.

use crate::recursive::ForecastOutcome;
use chrono::TimeDelta;
use serde::Serialize;

/// Days of history averaged for the comparison.
pub const LOOKBACK_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LastYearComparison {
    /// Mean daily consumption over the lookback window.
    pub average_daily_last_year: f64,
    /// That mean scaled to the forecast horizon.
    pub expected_from_last_year: f64,
    /// `None` when nothing was consumed last year.
    pub pct_change_vs_last_year: Option<f64>,
    pub above_average: bool,
}

/// Compare the forecast total with what the past year's daily average
/// predicts for the same number of days.
///
/// Only historical rows dated after `last observed date - 365 days` count.
/// Returns `None` when the outcome has no history or no forecast.
pub fn compare_with_last_year(outcome: &ForecastOutcome) -> Option<LastYearComparison> {
    let history: Vec<_> = outcome
        .extended_series
        .iter()
        .filter(|row| !row.is_forecast)
        .collect();
    let last_date = history.iter().map(|row| row.date).max()?;
    if outcome.forecast_rows.is_empty() {
        return None;
    }
    let cutoff = last_date - TimeDelta::days(LOOKBACK_DAYS);
    let window: Vec<f64> = history
        .iter()
        .filter(|row| row.date > cutoff)
        .map(|row| row.consumption)
        .collect();
    let average_daily_last_year = window.iter().sum::<f64>() / window.len() as f64;
    let expected_from_last_year = average_daily_last_year * outcome.forecast_rows.len() as f64;
    let total = outcome.total_consumption;
    let pct_change_vs_last_year = (expected_from_last_year != 0.0)
        .then(|| (total - expected_from_last_year) / expected_from_last_year * 100.0);

    Some(LastYearComparison {
        average_daily_last_year,
        expected_from_last_year,
        pct_change_vs_last_year,
        above_average: total > expected_from_last_year,
    })
}

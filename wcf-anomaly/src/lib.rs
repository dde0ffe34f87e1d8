//! Rolling z-score anomaly flagging.
//!
//! Scores every row of an extended series (history plus forecast) against
//! the trailing window of consumption ending at that row, then splits the
//! flagged rows into historical and forecast anomalies.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use wcf_core::ExtendedRow;

pub const ROLLING_WINDOW: usize = 7;
/// Rows with fewer points than this in their window get no statistics.
pub const MIN_PERIODS: usize = 3;
pub const DEFAULT_THRESHOLD: f64 = 2.0;

#[derive(Error, Debug, PartialEq)]
pub enum AnomalyError {
    #[error("Threshold must be a positive finite number, got {0}")]
    InvalidThreshold(f64),

    #[error("Series is not sorted by date at {0}")]
    Unsorted(NaiveDate),
}

/// One extended-series row with its rolling statistics and verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow {
    pub date: NaiveDate,
    pub consumption: f64,
    pub is_forecast: bool,
    pub rolling_mean: Option<f64>,
    pub rolling_std: Option<f64>,
    pub z_score: Option<f64>,
    pub is_anomaly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub threshold: f64,
    pub rows: Vec<ScoredRow>,
}

impl AnomalyReport {
    pub fn historical(&self) -> impl Iterator<Item = &ScoredRow> {
        self.rows.iter().filter(|r| r.is_anomaly && !r.is_forecast)
    }

    pub fn forecast(&self) -> impl Iterator<Item = &ScoredRow> {
        self.rows.iter().filter(|r| r.is_anomaly && r.is_forecast)
    }
}

/// Trailing mean and sample standard deviation (n - 1).
///
/// Returns `None` below [`MIN_PERIODS`]; the std is NaN-free but may be zero.
fn window_stats(window: &[f64]) -> Option<(f64, f64)> {
    if window.len() < MIN_PERIODS {
        return None;
    }
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some((mean, var.sqrt()))
}

/// Score a date-sorted extended series.
///
/// A row is anomalous when `|z| > threshold`. A zero std with a deviating
/// value gives an infinite z and is flagged; zero over zero is not.
pub fn detect_anomalies(series: &[ExtendedRow], threshold: f64) -> Result<AnomalyReport, AnomalyError> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(AnomalyError::InvalidThreshold(threshold));
    }
    if let Some(pair) = series.windows(2).find(|pair| pair[1].date < pair[0].date) {
        return Err(AnomalyError::Unsorted(pair[1].date));
    }

    let values: Vec<f64> = series.iter().map(|r| r.consumption).collect();
    let rows: Vec<ScoredRow> = series
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let start = (i + 1).saturating_sub(ROLLING_WINDOW);
            let stats = window_stats(&values[start..=i]);
            let z_score = stats.map(|(mean, std)| (row.consumption - mean) / std);
            ScoredRow {
                date: row.date,
                consumption: row.consumption,
                is_forecast: row.is_forecast,
                rolling_mean: stats.map(|(mean, _)| mean),
                rolling_std: stats.map(|(_, std)| std),
                z_score,
                is_anomaly: z_score.is_some_and(|z| z.abs() > threshold),
            }
        })
        .collect();

    let report = AnomalyReport { threshold, rows };
    log::info!(
        "anomaly: {} historical and {} forecast anomalies at threshold {}",
        report.historical().count(),
        report.forecast().count(),
        threshold
    );
    Ok(report)
}

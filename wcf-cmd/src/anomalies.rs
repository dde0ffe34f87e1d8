//! Anomaly command: rolling z-score over the extended series.

use crate::cache::ForecastCache;
use crate::forecast::load_and_forecast;
use crate::ForecastArgs;
use wcf_anomaly::{detect_anomalies, AnomalyReport, ScoredRow};

/// Number of most recent anomalies listed per group.
pub const LATEST_LIMIT: usize = 10;

/// Forecast the account and score its extended series.
pub fn anomaly_report(
    args: &ForecastArgs,
    threshold: f64,
    cache: &mut ForecastCache,
) -> anyhow::Result<AnomalyReport> {
    let outcome = load_and_forecast(args, cache)?;
    Ok(detect_anomalies(&outcome.extended_series, threshold)?)
}

fn latest<'a>(rows: impl Iterator<Item = &'a ScoredRow>) -> Vec<&'a ScoredRow> {
    let rows: Vec<&ScoredRow> = rows.collect();
    let skip = rows.len().saturating_sub(LATEST_LIMIT);
    rows.into_iter().skip(skip).collect()
}

fn print_rows(title: &str, rows: &[&ScoredRow]) {
    println!("{} ({} shown):", title, rows.len());
    for row in rows {
        let z = row.z_score.map_or_else(|| "n/a".to_string(), |z| format!("{:+.2}", z));
        println!("  {}  {:>12.2}  z={}", row.date, row.consumption, z);
    }
}

pub fn run_anomalies(args: &ForecastArgs, threshold: f64, cache: &mut ForecastCache) -> anyhow::Result<()> {
    let report = anomaly_report(args, threshold, cache)?;
    println!(
        "Account {}: {} historical anomalies, {} predicted anomalies (threshold {})",
        args.account,
        report.historical().count(),
        report.forecast().count(),
        threshold
    );
    print_rows("Latest historical anomalies", &latest(report.historical()));
    print_rows("Latest predicted anomalies", &latest(report.forecast()));
    Ok(())
}

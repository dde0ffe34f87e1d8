//! CSV dataset loading.
//!
//! The dataset is a headered CSV with one row per (account, day) reading.
//! Header names are simplified before matching: the part before the first
//! `/` is kept, trimmed and lower-cased, so `CONSUMO_REAL/L` and
//! `consumption` both work.
//!
//! # Example CSV
//! ```text
//! POLIZA_SUMINISTRO,FECHA,CONSUMO_REAL/L
//! 1001,2023-01-01,412.0
//! 1001,2023-01-02,398.5
//! ```

use crate::error::{ForecastError, Result};
use crate::observation::{AccountId, Observation};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

const ACCOUNT_COLUMNS: &[&str] = &["account_id", "poliza_suministro"];
pub const DATE_COLUMNS: &[&str] = &["date", "fecha"];
pub const CONSUMPTION_COLUMNS: &[&str] = &["consumption", "consumo_real"];

/// Simplify a raw header name: keep the text before the first `/`, lower-cased.
pub fn simplify_column(name: &str) -> String {
    name.split('/').next().unwrap_or("").trim().to_lowercase()
}

/// Parse a date in `YYYY-MM-DD`, `YYYYMMDD` or `YYYY-MM-DD HH:MM:SS` form.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y%m%d") {
        return Ok(date);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date())
        .map_err(|_| ForecastError::DateParse(s.to_string()))
}

/// Index of the first simplified header matching one of `candidates`.
pub fn find_column(headers: &[String], candidates: &[&str]) -> Result<usize> {
    headers
        .iter()
        .position(|h| candidates.contains(&h.as_str()))
        .ok_or_else(|| {
            ForecastError::InvalidInput(format!(
                "missing required column (expected one of: {})",
                candidates.join(", ")
            ))
        })
}

/// Load a dataset from a CSV string.
///
/// Rows whose consumption cell is empty or `NaN` are skipped and counted in
/// a warning; any other non-numeric consumption is an error.
pub fn load_dataset_csv(csv_data: &str) -> Result<Vec<Observation>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(simplify_column).collect();
    let account_idx = find_column(&headers, ACCOUNT_COLUMNS)?;
    let date_idx = find_column(&headers, DATE_COLUMNS)?;
    let consumption_idx = find_column(&headers, CONSUMPTION_COLUMNS)?;

    let mut observations = Vec::new();
    let mut skipped = 0u32;
    for (line, result) in rdr.records().enumerate() {
        let r = result?;
        let account = r.get(account_idx).unwrap_or("").trim();
        if account.is_empty() {
            return Err(ForecastError::InvalidInput(format!(
                "row {}: empty account id",
                line + 1
            )));
        }
        let date = parse_date(r.get(date_idx).unwrap_or(""))?;
        let raw_value = r.get(consumption_idx).unwrap_or("").trim();
        if raw_value.is_empty() || raw_value.eq_ignore_ascii_case("nan") {
            skipped += 1;
            continue;
        }
        let consumption: f64 = raw_value.parse().map_err(|_| {
            ForecastError::InvalidInput(format!(
                "row {}: non-numeric consumption {:?}",
                line + 1,
                raw_value
            ))
        })?;
        observations.push(Observation::new(AccountId::new(account), date, consumption));
    }

    if skipped > 0 {
        log::warn!("loader: skipped {} rows with missing consumption", skipped);
    }
    log::info!("loader: loaded {} observations", observations.len());
    Ok(observations)
}

/// Load a dataset from a CSV file on disk.
pub fn load_dataset_path(path: impl AsRef<Path>) -> Result<Vec<Observation>> {
    let path = path.as_ref();
    log::info!("loader: reading {}", path.display());
    let csv_data = std::fs::read_to_string(path)?;
    load_dataset_csv(&csv_data)
}

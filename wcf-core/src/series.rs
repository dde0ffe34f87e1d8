//! Per-account series preparation.
//!
//! Lags downstream are positional (row-based), so a missing reading day
//! shifts what "7 days ago" means. [`find_gaps`] lets callers detect and
//! report that before forecasting.

use crate::error::{ForecastError, Result};
use crate::gap::ReadingGap;
use crate::observation::{AccountId, Observation};

/// Filter a dataset to one account and sort it ascending by date.
pub fn prepare_series(dataset: &[Observation], account_id: &AccountId) -> Result<Vec<Observation>> {
    let mut series: Vec<Observation> = dataset
        .iter()
        .filter(|obs| &obs.account_id == account_id)
        .cloned()
        .collect();
    if series.is_empty() {
        return Err(ForecastError::NoData {
            account_id: account_id.to_string(),
        });
    }
    sort_series(&mut series);
    Ok(series)
}

/// Stable sort by date; rows sharing a date keep their input order.
pub fn sort_series(series: &mut [Observation]) {
    series.sort_by_key(|obs| obs.date);
}

/// Reject series containing NaN or infinite consumption values.
pub fn validate_series(series: &[Observation]) -> Result<()> {
    if let Some(obs) = series.iter().find(|obs| !obs.consumption.is_finite()) {
        return Err(ForecastError::InvalidInput(format!(
            "non-finite consumption on {} for account {}",
            obs.date, obs.account_id
        )));
    }
    Ok(())
}

/// Find every run of missing calendar days in a date-sorted series.
pub fn find_gaps(series: &[Observation]) -> Vec<ReadingGap> {
    series
        .windows(2)
        .filter_map(|pair| ReadingGap::between(pair[0].date, pair[1].date))
        .collect()
}

/// Log a warning for each gap in the series and return the number of missing days.
pub fn warn_on_gaps(series: &[Observation]) -> i64 {
    let gaps = find_gaps(series);
    let mut missing = 0;
    for gap in &gaps {
        missing += gap.num_days();
        log::warn!("series: missing readings {}; lags count readings, not days", gap);
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, d).unwrap()
    }

    #[test]
    fn test_prepare_series_filters_and_sorts() {
        let dataset = vec![
            Observation::new("A", day(3), 3.0),
            Observation::new("B", day(1), 9.0),
            Observation::new("A", day(1), 1.0),
            Observation::new("A", day(2), 2.0),
        ];
        let series = prepare_series(&dataset, &AccountId::from("A")).unwrap();
        let values: Vec<f64> = series.iter().map(|o| o.consumption).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_prepare_series_unknown_account() {
        let dataset = vec![Observation::new("A", day(1), 1.0)];
        let err = prepare_series(&dataset, &AccountId::from("Z")).unwrap_err();
        assert!(matches!(err, ForecastError::NoData { .. }));
    }

    #[test]
    fn test_validate_series_rejects_nan() {
        let series = vec![
            Observation::new("A", day(1), 1.0),
            Observation::new("A", day(2), f64::NAN),
        ];
        assert!(matches!(
            validate_series(&series),
            Err(ForecastError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_find_gaps() {
        let series = vec![
            Observation::new("A", day(1), 1.0),
            Observation::new("A", day(2), 1.0),
            Observation::new("A", day(5), 1.0),
            Observation::new("A", day(7), 1.0),
        ];
        let gaps = find_gaps(&series);
        let spans: Vec<(NaiveDate, NaiveDate)> = gaps
            .iter()
            .map(|g| (g.first_missing, g.last_missing))
            .collect();
        assert_eq!(spans, vec![(day(3), day(4)), (day(6), day(6))]);
        assert_eq!(warn_on_gaps(&series), 3);
    }

    #[test]
    fn test_dense_series_has_no_gaps() {
        let series: Vec<Observation> = (1..=10)
            .map(|d| Observation::new("A", day(d), 1.0))
            .collect();
        assert!(find_gaps(&series).is_empty());
    }
}

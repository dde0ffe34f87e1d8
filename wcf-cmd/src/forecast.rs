//! Forecast command and the shared load-and-forecast pipeline.

use crate::cache::{fingerprint, ForecastCache};
use crate::config::load_model_config;
use crate::ForecastArgs;
use anyhow::Context;
use log::{info, warn};
use std::io::Write;
use std::path::Path;
use wcf_core::loader::load_dataset_path;
use wcf_core::series::{prepare_series, warn_on_gaps};
use wcf_core::{AccountId, ExtendedRow};
use wcf_forecast::{forecast, ForecastOutcome, GradientBoostedTrees};

/// Load the dataset, prepare the account's series and forecast it through `cache`.
pub fn load_and_forecast(args: &ForecastArgs, cache: &mut ForecastCache) -> anyhow::Result<ForecastOutcome> {
    let params = load_model_config(args.model_config.as_deref())?;
    let dataset = load_dataset_path(&args.data)
        .with_context(|| format!("Failed to load dataset {}", args.data.display()))?;
    let account_id = AccountId::new(args.account.as_str());
    let series = prepare_series(&dataset, &account_id)?;

    let missing = warn_on_gaps(&series);
    if missing > 0 {
        warn!(
            "Account {} is missing {} reading days; lag features are positional",
            account_id, missing
        );
    }

    info!(
        "Forecasting {} days for account {} from {} readings ({} to {})",
        args.horizon,
        account_id,
        series.len(),
        series[0].date,
        series[series.len() - 1].date
    );

    let key = fingerprint(&account_id, args.horizon, &series, &params);
    let outcome = cache.get_or_compute(key, || {
        let mut model = GradientBoostedTrees::new(params.clone());
        forecast(&series, &account_id, args.horizon, &mut model)
    })?;
    Ok(outcome.clone())
}

/// Write the extended series as `account_id,date,consumption,is_forecast` CSV.
pub fn write_extended_csv<W: Write>(rows: &[ExtendedRow], writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn run_forecast(
    args: &ForecastArgs,
    output: Option<&Path>,
    cache: &mut ForecastCache,
) -> anyhow::Result<()> {
    let outcome = load_and_forecast(args, cache)?;
    println!(
        "Predicted consumption for account {} over {} days: {:.2}",
        args.account, args.horizon, outcome.total_consumption
    );

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_extended_csv(&outcome.extended_series, file)?;
            info!("Forecast complete. Output: {}", path.display());
        }
        None => write_extended_csv(&outcome.extended_series, std::io::stdout().lock())?,
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;

    /// 45 days for account 1001 (weekday/weekend pattern) and 5 days for 2002.
    pub(crate) fn write_dataset() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "POLIZA_SUMINISTRO,FECHA,CONSUMO_REAL/L").unwrap();
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for i in 0..45 {
            let date = start + chrono::TimeDelta::days(i);
            let value = if i % 7 >= 5 { 420.0 } else { 300.0 };
            writeln!(file, "1001,{},{}", date.format("%Y-%m-%d"), value).unwrap();
        }
        for i in 0..5 {
            let date = start + chrono::TimeDelta::days(i);
            writeln!(file, "2002,{},50", date.format("%Y-%m-%d")).unwrap();
        }
        file
    }

    pub(crate) fn args(data: PathBuf, account: &str) -> ForecastArgs {
        ForecastArgs {
            data,
            account: account.to_string(),
            horizon: 30,
            model_config: None,
        }
    }

    #[test]
    fn test_load_and_forecast_uses_cache() {
        let file = write_dataset();
        let mut cache = ForecastCache::new();
        let first = load_and_forecast(&args(file.path().to_path_buf(), "1001"), &mut cache).unwrap();
        let second = load_and_forecast(&args(file.path().to_path_buf(), "1001"), &mut cache).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.forecast_rows.len(), 30);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_short_account_is_rejected() {
        let file = write_dataset();
        let mut cache = ForecastCache::new();
        let err = load_and_forecast(&args(file.path().to_path_buf(), "2002"), &mut cache).unwrap_err();
        assert!(err.to_string().contains("Insufficient history"));
    }

    #[test]
    fn test_run_forecast_writes_extended_csv() {
        let file = write_dataset();
        let out = tempfile::NamedTempFile::new().unwrap();
        let mut cache = ForecastCache::new();
        run_forecast(&args(file.path().to_path_buf(), "1001"), Some(out.path()), &mut cache).unwrap();

        let mut rdr = csv::Reader::from_path(out.path()).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["account_id", "date", "consumption", "is_forecast"]
        );
        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 75);
        assert_eq!(&records[0][1], "2024-01-01");
        assert_eq!(&records[44][3], "false");
        assert_eq!(&records[45][1], "2024-02-15");
        assert_eq!(&records[45][3], "true");
    }
}

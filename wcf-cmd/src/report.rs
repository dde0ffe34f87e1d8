//! Report command: forecast, comparison with last year, bill estimate and
//! anomaly counts for one account.

use crate::anomalies::anomaly_report;
use crate::cache::ForecastCache;
use crate::forecast::load_and_forecast;
use crate::ForecastArgs;
use serde::Serialize;
use wcf_billing::{estimate_bill, Bill, ServiceType};
use wcf_forecast::{compare_with_last_year, LastYearComparison};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountReport {
    pub account_id: String,
    pub horizon_days: usize,
    /// Forecast total in the dataset's unit (litres).
    pub total_consumption: f64,
    pub average_daily_consumption: f64,
    /// `None` when the account has no usable history to compare with.
    pub last_year: Option<LastYearComparison>,
    pub service_type: ServiceType,
    pub bill: Bill,
    pub bill_total: f64,
    pub historical_anomalies: usize,
    pub forecast_anomalies: usize,
}

pub fn build_report(
    args: &ForecastArgs,
    service_type: ServiceType,
    threshold: f64,
    cache: &mut ForecastCache,
) -> anyhow::Result<AccountReport> {
    let outcome = load_and_forecast(args, cache)?;
    let last_year = compare_with_last_year(&outcome);
    let bill = estimate_bill(outcome.total_consumption, service_type);
    // Second lookup of the same forecast; served from the cache.
    let anomalies = anomaly_report(args, threshold, cache)?;

    Ok(AccountReport {
        account_id: args.account.clone(),
        horizon_days: args.horizon,
        total_consumption: outcome.total_consumption,
        average_daily_consumption: outcome.total_consumption / args.horizon as f64,
        last_year,
        service_type,
        bill,
        bill_total: bill.total(),
        historical_anomalies: anomalies.historical().count(),
        forecast_anomalies: anomalies.forecast().count(),
    })
}

pub fn run_report(
    args: &ForecastArgs,
    service_type: &str,
    threshold: f64,
    json: bool,
    cache: &mut ForecastCache,
) -> anyhow::Result<()> {
    let service_type: ServiceType = service_type.parse()?;
    let report = build_report(args, service_type, threshold, cache)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("Account:               {}", report.account_id);
    println!("Forecast horizon:      {} days", report.horizon_days);
    println!("Predicted consumption: {:.2} L", report.total_consumption);
    println!("Average per day:       {:.2} L", report.average_daily_consumption);
    if let Some(cmp) = &report.last_year {
        println!("Expected from last year: {:.2} L", cmp.expected_from_last_year);
        if let Some(pct) = cmp.pct_change_vs_last_year {
            println!("Change vs last year:   {:+.1}%", pct);
        }
        let verdict = if cmp.above_average { "Above average" } else { "Efficient" };
        println!("Efficiency:            {}", verdict);
    }
    println!("Service type:          {}", report.service_type);
    println!("Estimated bill:        EUR {:.2}", report.bill_total);
    println!("  consumption          {:.2}", report.bill.consumption);
    println!("  VAT                  {:.2}", report.bill.vat);
    println!("  water levy           {:.2}", report.bill.water_levy);
    println!("  sewerage             {:.2}", report.bill.sewerage);
    println!("  waste treatment      {:.2}", report.bill.waste_treatment);
    println!("  waste collection     {:.2}", report.bill.waste_collection);
    println!(
        "Anomalies:             {} historical, {} predicted",
        report.historical_anomalies, report.forecast_anomalies
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::tests::{args, write_dataset};

    #[test]
    fn test_report_forecasts_once() {
        let file = write_dataset();
        let mut cache = ForecastCache::new();
        let report = build_report(
            &args(file.path().to_path_buf(), "1001"),
            ServiceType::Domestic,
            2.0,
            &mut cache,
        )
        .unwrap();
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(report.horizon_days, 30);
        assert!((report.bill_total - report.bill.total()).abs() < 1e-12);
        assert!(report.bill_total > 31.62);
    }

    #[test]
    fn test_report_compares_with_last_year() {
        let file = write_dataset();
        let mut cache = ForecastCache::new();
        let report = build_report(
            &args(file.path().to_path_buf(), "1001"),
            ServiceType::Domestic,
            2.0,
            &mut cache,
        )
        .unwrap();
        let cmp = report.last_year.unwrap();
        // 45 days of history: 33 weekdays at 300 and 12 weekend days at 420
        let average = (33.0 * 300.0 + 12.0 * 420.0) / 45.0;
        assert!((cmp.average_daily_last_year - average).abs() < 1e-9);
        assert!((cmp.expected_from_last_year - average * 30.0).abs() < 1e-6);
        let pct = cmp.pct_change_vs_last_year.unwrap();
        let expected_pct = (report.total_consumption - cmp.expected_from_last_year)
            / cmp.expected_from_last_year
            * 100.0;
        assert!((pct - expected_pct).abs() < 1e-9);
        assert_eq!(cmp.above_average, pct > 0.0);
    }

    #[test]
    fn test_unknown_service_type() {
        let file = write_dataset();
        let mut cache = ForecastCache::new();
        let err = run_report(&args(file.path().to_path_buf(), "1001"), "Z", 2.0, false, &mut cache)
            .unwrap_err();
        assert!(err.to_string().contains("Unknown service type"));
        assert_eq!(cache.misses(), 0);
    }
}

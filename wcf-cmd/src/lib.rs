//! Command implementations for the WCF CLI.
//!
//! Provides subcommands for forecasting an account's water consumption,
//! flagging anomalies in the extended series, estimating next month's bill,
//! and comparing census sections.

use clap::{Args, Subcommand};
use std::path::PathBuf;
use wcf_anomaly::DEFAULT_THRESHOLD;
use wcf_forecast::DEFAULT_HORIZON_DAYS;

pub mod anomalies;
pub mod cache;
pub mod config;
pub mod forecast;
pub mod report;
pub mod sections;

/// Inputs shared by every command that needs a forecast.
#[derive(Args, Debug, Clone)]
pub struct ForecastArgs {
    /// Path to the consumption dataset CSV
    #[arg(short = 'd', long)]
    pub data: PathBuf,

    /// Account (supply contract) identifier to forecast
    #[arg(short = 'a', long)]
    pub account: String,

    /// Number of days to forecast after the last reading
    #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
    pub horizon: usize,

    /// Optional JSON file overriding the gradient boosting parameters
    #[arg(long)]
    pub model_config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Forecast daily consumption and write the extended series as CSV
    Forecast {
        #[command(flatten)]
        args: ForecastArgs,

        /// Output path for the extended series CSV (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Flag historical and forecast anomalies with a rolling z-score
    Anomalies {
        #[command(flatten)]
        args: ForecastArgs,

        /// Absolute z-score above which a reading is anomalous
        #[arg(short = 't', long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
    },

    /// Forecast, estimate next month's bill and count anomalies
    Report {
        #[command(flatten)]
        args: ForecastArgs,

        /// Service type code: D (domestic), C (commercial) or A (agricultural)
        #[arg(short = 's', long)]
        service_type: String,

        #[arg(short = 't', long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare a census section's consumption with the rest of the city
    Sections {
        #[command(flatten)]
        args: sections::SectionArgs,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    let mut cache = cache::ForecastCache::new();
    match command {
        Command::Forecast { args, output } => {
            forecast::run_forecast(&args, output.as_deref(), &mut cache)
        }
        Command::Anomalies { args, threshold } => {
            anomalies::run_anomalies(&args, threshold, &mut cache)
        }
        Command::Report {
            args,
            service_type,
            threshold,
            json,
        } => report::run_report(&args, &service_type, threshold, json, &mut cache),
        Command::Sections { args } => sections::run_sections(&args),
    }
}

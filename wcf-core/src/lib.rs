//! Core types for per-account water consumption series.
//!
//! Holds the observation and forecast row types shared by the forecasting,
//! billing and anomaly crates, the error taxonomy, and the CSV loader used by
//! the command layer.

pub mod calendar;
pub mod error;
pub mod gap;
pub mod loader;
pub mod observation;
pub mod series;

pub use error::{ForecastError, Result};
pub use observation::{AccountId, ExtendedRow, ForecastRow, Observation};

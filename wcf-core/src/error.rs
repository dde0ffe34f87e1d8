/// Error types for water consumption forecasting
use thiserror::Error;

/// Main error type for forecasting operations
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Empty or malformed input series
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested account has no rows
    #[error("No data found for account {account_id}")]
    NoData { account_id: String },

    /// Not enough history to build a single trainable feature row
    #[error("Insufficient history (needed: {needed}, found: {found})")]
    InsufficientHistory { needed: usize, found: usize },

    /// Regression model failed to fit or predict
    #[error("Model fit failed: {0}")]
    ModelFit(String),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Date parsing failed
    #[error("Failed to parse date: {0}")]
    DateParse(String),

    /// Failed to read input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results using ForecastError
pub type Result<T> = std::result::Result<T, ForecastError>;

use chrono::NaiveDate;
use thiserror::Error;
use wcf_core::ForecastError;

#[derive(Error, Debug)]
pub enum SectionError {
    #[error(transparent)]
    Load(#[from] ForecastError),

    #[error("CSV parsing error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("No census section matches {0:?}")]
    UnknownSection(String),

    #[error("Invalid period: {from} is after {to}")]
    InvalidPeriod { from: NaiveDate, to: NaiveDate },

    #[error("No readings for section {section} between {from} and {to}")]
    EmptySelection {
        section: String,
        from: NaiveDate,
        to: NaiveDate,
    },
}

pub type Result<T> = std::result::Result<T, SectionError>;

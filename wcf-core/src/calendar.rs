use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar features derived from a single date.
///
/// `day_of_week` counts from Monday = 0 through Sunday = 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarFeatures {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub day_of_week: u32,
}

impl From<NaiveDate> for CalendarFeatures {
    fn from(date: NaiveDate) -> Self {
        CalendarFeatures {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            day_of_week: date.weekday().num_days_from_monday(),
        }
    }
}

use chrono::{NaiveDate, TimeDelta};
use std::fmt;

/// A run of calendar days with no reading, between two observed days.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReadingGap {
    pub first_missing: NaiveDate,
    pub last_missing: NaiveDate,
}

impl ReadingGap {
    /// The days strictly between two consecutive readings, if there are any.
    pub fn between(previous: NaiveDate, next: NaiveDate) -> Option<ReadingGap> {
        if (next - previous).num_days() <= 1 {
            return None;
        }
        Some(ReadingGap {
            first_missing: previous + TimeDelta::days(1),
            last_missing: next - TimeDelta::days(1),
        })
    }

    pub fn num_days(&self) -> i64 {
        (self.last_missing - self.first_missing).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first_missing <= date && date <= self.last_missing
    }

    /// Each missing day, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last_missing;
        self.first_missing.iter_days().take_while(move |d| *d <= last)
    }
}

impl fmt::Display for ReadingGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} through {} ({} days)",
            self.first_missing,
            self.last_missing,
            self.num_days()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ReadingGap;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_consecutive_readings_have_no_gap() {
        assert_eq!(ReadingGap::between(date(2023, 5, 1), date(2023, 5, 2)), None);
        assert_eq!(ReadingGap::between(date(2023, 5, 2), date(2023, 5, 2)), None);
    }

    #[test]
    fn test_gap_excludes_both_readings() {
        let gap = ReadingGap::between(date(2023, 5, 1), date(2023, 5, 5)).unwrap();
        assert_eq!(gap.first_missing, date(2023, 5, 2));
        assert_eq!(gap.last_missing, date(2023, 5, 4));
        assert_eq!(gap.num_days(), 3);
        assert!(!gap.contains(date(2023, 5, 1)));
        assert!(gap.contains(date(2023, 5, 3)));
        assert!(!gap.contains(date(2023, 5, 5)));
    }

    #[test]
    fn test_missing_days_span_leap_day() {
        let gap = ReadingGap::between(date(2024, 2, 27), date(2024, 3, 2)).unwrap();
        let days: Vec<NaiveDate> = gap.days().collect();
        assert_eq!(
            days,
            vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]
        );
        assert_eq!(gap.to_string(), "2024-02-28 through 2024-03-01 (3 days)");
    }
}

use crate::calendar::CalendarFeatures;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Opaque account identifier, stable for the lifetime of a series.
///
/// Numeric identifiers are carried as their decimal string form so the
/// same account compares equal whichever way the caller spelled it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        AccountId::new(value)
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        AccountId::new(value)
    }
}

impl From<u64> for AccountId {
    fn from(value: u64) -> Self {
        AccountId(value.to_string())
    }
}

/// One historical consumption reading for an account.
///
/// `consumption` is in whatever unit the caller loaded (litres or m³).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub consumption: f64,
}

impl Observation {
    pub fn new(account_id: impl Into<AccountId>, date: NaiveDate, consumption: f64) -> Self {
        Observation {
            account_id: account_id.into(),
            date,
            consumption,
        }
    }

    /// Group a vector of observations by account_id.
    ///
    /// Rows keep their input order within each account.
    pub fn group_by_account(observations: Vec<Observation>) -> BTreeMap<AccountId, Vec<Observation>> {
        let mut result: BTreeMap<AccountId, Vec<Observation>> = BTreeMap::new();
        for obs in observations {
            result.entry(obs.account_id.clone()).or_default().push(obs);
        }
        result
    }
}

/// A model-predicted row for a future date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub consumption: f64,
    pub calendar: CalendarFeatures,
}

impl ForecastRow {
    pub fn new(account_id: AccountId, date: NaiveDate, consumption: f64) -> Self {
        ForecastRow {
            account_id,
            date,
            consumption,
            calendar: date.into(),
        }
    }

    /// Always true; present so forecast rows read the same as extended rows.
    pub fn is_forecast(&self) -> bool {
        true
    }
}

/// A row of the extended series: history followed by forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedRow {
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub consumption: f64,
    pub is_forecast: bool,
}

impl From<&Observation> for ExtendedRow {
    fn from(obs: &Observation) -> Self {
        ExtendedRow {
            account_id: obs.account_id.clone(),
            date: obs.date,
            consumption: obs.consumption,
            is_forecast: false,
        }
    }
}

impl From<&ForecastRow> for ExtendedRow {
    fn from(row: &ForecastRow) -> Self {
        ExtendedRow {
            account_id: row.account_id.clone(),
            date: row.date,
            consumption: row.consumption,
            is_forecast: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_normalizes_numeric_and_padded_forms() {
        assert_eq!(AccountId::from(1234u64), AccountId::from(" 1234 "));
        assert_eq!(AccountId::from("A-7").to_string(), "A-7");
    }

    #[test]
    fn test_group_by_account_keeps_row_order() {
        let d1 = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let d0 = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let grouped = Observation::group_by_account(vec![
            Observation::new("B", d1, 2.0),
            Observation::new("A", d0, 1.0),
            Observation::new("B", d0, 3.0),
        ]);
        assert_eq!(grouped.len(), 2);
        let b = &grouped[&AccountId::from("B")];
        assert_eq!(b[0].date, d1);
        assert_eq!(b[1].date, d0);
    }

    #[test]
    fn test_extended_row_flags() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let obs = Observation::new("A", date, 5.0);
        let row = ForecastRow::new("A".into(), date, 6.0);
        assert!(!ExtendedRow::from(&obs).is_forecast);
        assert!(ExtendedRow::from(&row).is_forecast);
        assert_eq!(row.calendar.day, 1);
    }
}

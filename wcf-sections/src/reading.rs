//! Census-section readings loaded from the same daily dataset as the
//! per-account forecasts.
//!
//! Section codes arrive as numbers (sometimes with a trailing `.0`) and are
//! normalised to the ten-digit, zero-padded form used by the census.
//!
//! # Example CSV
//! ```text
//! FECHA,SECCIO_CENSAL,CONSUMO_REAL/L,US_AIGUA_GEST
//! 2023-01-01,801901001,412.0,D
//! 2023-01-01,801901002.0,87,C
//! ```

use crate::error::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use wcf_core::loader::{find_column, parse_date, simplify_column, CONSUMPTION_COLUMNS, DATE_COLUMNS};

const SECTION_COLUMNS: &[&str] = &["seccio_censal", "census_section", "section"];
const USE_COLUMNS: &[&str] = &["us_aigua_gest", "use_type"];

/// Ten-digit census section code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SectionCode(String);

impl SectionCode {
    /// Normalise a raw cell. Integral numbers are zero-padded to ten digits,
    /// other text is kept as-is. Empty and `NaN` cells have no code.
    pub fn parse(raw: &str) -> Option<SectionCode> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
            return None;
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => {
                Some(SectionCode(format!("{:010}", v as u64)))
            }
            _ => Some(SectionCode(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionReading {
    pub section: SectionCode,
    pub date: NaiveDate,
    pub consumption: f64,
    /// Water use category (`US_AIGUA_GEST`), when the dataset has one.
    pub use_type: Option<String>,
}

/// Load section readings from a CSV string.
///
/// Rows without a section code or with a missing consumption value are
/// skipped. The use-type column is optional.
pub fn load_section_csv(csv_data: &str) -> Result<Vec<SectionReading>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(simplify_column).collect();
    let section_idx = find_column(&headers, SECTION_COLUMNS)?;
    let date_idx = find_column(&headers, DATE_COLUMNS)?;
    let consumption_idx = find_column(&headers, CONSUMPTION_COLUMNS)?;
    let use_idx = find_column(&headers, USE_COLUMNS).ok();

    let mut readings = Vec::new();
    let mut skipped = 0u32;
    for result in rdr.records() {
        let r = result?;
        let Some(section) = SectionCode::parse(r.get(section_idx).unwrap_or("")) else {
            skipped += 1;
            continue;
        };
        let consumption = match r.get(consumption_idx).unwrap_or("").trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                skipped += 1;
                continue;
            }
        };
        let date = parse_date(r.get(date_idx).unwrap_or(""))?;
        let use_type = use_idx
            .and_then(|i| r.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        readings.push(SectionReading {
            section,
            date,
            consumption,
            use_type,
        });
    }

    if skipped > 0 {
        log::warn!("sections: skipped {} rows without a section or consumption", skipped);
    }
    log::info!("sections: loaded {} readings", readings.len());
    Ok(readings)
}

pub fn load_section_path(path: impl AsRef<Path>) -> Result<Vec<SectionReading>> {
    let path = path.as_ref();
    log::info!("sections: reading {}", path.display());
    let csv_data = std::fs::read_to_string(path).map_err(wcf_core::ForecastError::from)?;
    load_section_csv(&csv_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SectionError;

    #[test]
    fn test_section_codes_are_zero_padded() {
        assert_eq!(SectionCode::parse("801901001").unwrap().as_str(), "0801901001");
        assert_eq!(SectionCode::parse(" 801901002.0 ").unwrap().as_str(), "0801901002");
        assert_eq!(SectionCode::parse("N-12").unwrap().as_str(), "N-12");
        assert_eq!(SectionCode::parse(""), None);
        assert_eq!(SectionCode::parse("NaN"), None);
    }

    #[test]
    fn test_load_section_csv() {
        let csv = "FECHA,SECCIO_CENSAL,CONSUMO_REAL/L,US_AIGUA_GEST,POLIZA_SUMINISTRO
2023-01-01,801901001,412.0,D,1
2023-01-01,801901002.0,87,C,2
2023-01-02,,50,D,3
2023-01-02,801901001,NaN,D,1
2023-01-02,801901001,10,,1
";
        let readings = load_section_csv(csv).unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].section.as_str(), "0801901001");
        assert_eq!(readings[1].use_type.as_deref(), Some("C"));
        assert_eq!(readings[2].use_type, None);
        assert_eq!(readings[2].consumption, 10.0);
    }

    #[test]
    fn test_use_type_column_is_optional() {
        let csv = "date,section,consumption\n2023-01-01,7,1.5\n";
        let readings = load_section_csv(csv).unwrap();
        assert_eq!(readings[0].use_type, None);
        assert_eq!(readings[0].section.as_str(), "0000000007");
    }

    #[test]
    fn test_missing_section_column() {
        let csv = "account_id,date,consumption\nA,2023-01-01,1.0\n";
        assert!(matches!(load_section_csv(csv), Err(SectionError::Load(_))));
    }
}

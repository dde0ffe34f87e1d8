//! Census-section consumption analysis.
//!
//! Loads readings tagged with a census section and use type, then compares
//! one section with the rest of the city over a date period: daily totals
//! against the citywide per-section average, a use-type breakdown, a
//! percentile ranking by average monthly consumption, and simple savings
//! estimates.

pub mod analysis;
pub mod error;
pub mod reading;

pub use analysis::{
    resolve_section, summarize_section, Period, SectionRanking, SectionSummary, UsageConcentration,
};
pub use error::{Result, SectionError};
pub use reading::{load_section_csv, load_section_path, SectionCode, SectionReading};

//! Section-level aggregates over a date period.
//!
//! A section's daily consumption is the sum of all its readings that day.
//! The city average for a day is the mean of those daily section totals
//! across every section with readings that day.

use crate::error::{Result, SectionError};
use crate::reading::{SectionCode, SectionReading};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Reduction percentages offered by [`savings_estimates`].
pub const SAVINGS_STEPS: [u32; 3] = [5, 10, 20];

/// Inclusive date period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl Period {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Period> {
        if from > to {
            return Err(SectionError::InvalidPeriod { from, to });
        }
        Ok(Period { from, to })
    }

    /// First through last reading date of the dataset.
    pub fn covering(readings: &[SectionReading]) -> Option<Period> {
        let from = readings.iter().map(|r| r.date).min()?;
        let to = readings.iter().map(|r| r.date).max()?;
        Some(Period { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Sorted, de-duplicated section codes starting with `prefix`.
pub fn matching_sections(readings: &[SectionReading], prefix: &str) -> Vec<SectionCode> {
    let codes: BTreeSet<&SectionCode> = readings
        .iter()
        .map(|r| &r.section)
        .filter(|code| code.as_str().starts_with(prefix))
        .collect();
    codes.into_iter().cloned().collect()
}

/// Resolve user input to a section: an exact code wins, otherwise the first
/// code the input is a prefix of.
pub fn resolve_section(readings: &[SectionReading], input: &str) -> Result<SectionCode> {
    let input = input.trim();
    if let Some(exact) = SectionCode::parse(input) {
        if readings.iter().any(|r| r.section == exact) {
            return Ok(exact);
        }
    }
    matching_sections(readings, input)
        .into_iter()
        .next()
        .ok_or_else(|| SectionError::UnknownSection(input.to_string()))
}

/// Daily totals for one section inside `period`.
pub fn section_daily_totals(
    readings: &[SectionReading],
    section: &SectionCode,
    period: Period,
) -> BTreeMap<NaiveDate, f64> {
    let mut totals = BTreeMap::new();
    for r in readings.iter().filter(|r| &r.section == section && period.contains(r.date)) {
        *totals.entry(r.date).or_insert(0.0) += r.consumption;
    }
    totals
}

/// Mean daily section total across all sections, per day inside `period`.
pub fn city_daily_average(readings: &[SectionReading], period: Period) -> BTreeMap<NaiveDate, f64> {
    let mut by_day: BTreeMap<NaiveDate, BTreeMap<&SectionCode, f64>> = BTreeMap::new();
    for r in readings.iter().filter(|r| period.contains(r.date)) {
        *by_day.entry(r.date).or_default().entry(&r.section).or_insert(0.0) += r.consumption;
    }
    by_day
        .into_iter()
        .map(|(date, sections)| {
            let mean = sections.values().sum::<f64>() / sections.len() as f64;
            (date, mean)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageShare {
    pub use_type: String,
    pub consumption: f64,
    pub percent: f64,
}

/// How concentrated a section's consumption is in its top use type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UsageConcentration {
    /// Top use type accounts for at least half.
    Dominant,
    /// Top use type accounts for at least 30%.
    Leading,
    Spread,
}

impl UsageConcentration {
    pub fn from_top_percent(percent: f64) -> Self {
        if percent >= 50.0 {
            UsageConcentration::Dominant
        } else if percent >= 30.0 {
            UsageConcentration::Leading
        } else {
            UsageConcentration::Spread
        }
    }
}

/// Consumption per use type for one section, largest first. Readings
/// without a use type are left out.
pub fn usage_breakdown(readings: &[SectionReading], section: &SectionCode, period: Period) -> Vec<UsageShare> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for r in readings.iter().filter(|r| &r.section == section && period.contains(r.date)) {
        if let Some(use_type) = r.use_type.as_deref() {
            *totals.entry(use_type).or_insert(0.0) += r.consumption;
        }
    }
    let sum: f64 = totals.values().sum();
    let mut shares: Vec<UsageShare> = totals
        .into_iter()
        .map(|(use_type, consumption)| UsageShare {
            use_type: use_type.to_string(),
            consumption,
            percent: if sum != 0.0 { consumption / sum * 100.0 } else { 0.0 },
        })
        .collect();
    shares.sort_by(|a, b| b.consumption.total_cmp(&a.consumption));
    shares
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionRanking {
    /// Mean of the section's calendar-month totals.
    pub average_monthly: f64,
    /// Mean of every other section's average monthly total.
    pub peer_average_monthly: Option<f64>,
    /// Positive when the section uses more than its peers.
    pub percent_vs_peers: Option<f64>,
    /// Share of sections (this one included) with a strictly lower average.
    pub percentile: f64,
    pub sections_ranked: usize,
}

/// Rank `section` against every section by average monthly consumption
/// inside `period`.
pub fn rank_section(readings: &[SectionReading], section: &SectionCode, period: Period) -> Option<SectionRanking> {
    let mut monthly: BTreeMap<&SectionCode, BTreeMap<(i32, u32), f64>> = BTreeMap::new();
    for r in readings.iter().filter(|r| period.contains(r.date)) {
        *monthly
            .entry(&r.section)
            .or_default()
            .entry((r.date.year(), r.date.month()))
            .or_insert(0.0) += r.consumption;
    }
    let averages: BTreeMap<&SectionCode, f64> = monthly
        .into_iter()
        .map(|(code, months)| (code, months.values().sum::<f64>() / months.len() as f64))
        .collect();

    let mine = *averages.get(section)?;
    let peers: Vec<f64> = averages
        .iter()
        .filter(|(code, _)| **code != section)
        .map(|(_, avg)| *avg)
        .collect();
    let peer_average_monthly = (!peers.is_empty()).then(|| peers.iter().sum::<f64>() / peers.len() as f64);
    let percent_vs_peers = peer_average_monthly
        .filter(|peer| *peer != 0.0)
        .map(|peer| (mine - peer) / peer * 100.0);
    let below = averages.values().filter(|avg| **avg < mine).count();

    Some(SectionRanking {
        average_monthly: mine,
        peer_average_monthly,
        percent_vs_peers,
        percentile: below as f64 / averages.len() as f64 * 100.0,
        sections_ranked: averages.len(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SavingsEstimate {
    pub reduction_percent: u32,
    pub volume: f64,
    pub euros: f64,
}

/// Volume and money saved by cutting `total` by each of [`SAVINGS_STEPS`].
pub fn savings_estimates(total: f64, price_per_unit: f64) -> Vec<SavingsEstimate> {
    SAVINGS_STEPS
        .iter()
        .map(|&pct| {
            let volume = total * pct as f64 / 100.0;
            SavingsEstimate {
                reduction_percent: pct,
                volume,
                euros: volume * price_per_unit,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyComparison {
    pub date: NaiveDate,
    /// Zero on days the section has no readings.
    pub section: f64,
    /// Zero on days no section has readings.
    pub city_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub section: SectionCode,
    pub period: Period,
    pub total_consumption: f64,
    /// Mean of the section's daily totals over days with readings.
    pub average_daily: f64,
    /// Mean over the period of the city's per-section daily average.
    pub city_average_daily: f64,
    pub daily: Vec<DailyComparison>,
    pub usage: Vec<UsageShare>,
    pub concentration: Option<UsageConcentration>,
    pub ranking: Option<SectionRanking>,
    pub savings: Vec<SavingsEstimate>,
}

/// Every aggregate for one section and period.
pub fn summarize_section(
    readings: &[SectionReading],
    section: &SectionCode,
    period: Period,
    price_per_unit: f64,
) -> Result<SectionSummary> {
    let section_days = section_daily_totals(readings, section, period);
    if section_days.is_empty() {
        return Err(SectionError::EmptySelection {
            section: section.to_string(),
            from: period.from,
            to: period.to,
        });
    }
    let city_days = city_daily_average(readings, period);

    let total_consumption: f64 = section_days.values().sum();
    let average_daily = total_consumption / section_days.len() as f64;
    let city_average_daily = if city_days.is_empty() {
        0.0
    } else {
        city_days.values().sum::<f64>() / city_days.len() as f64
    };

    let dates: BTreeSet<NaiveDate> = section_days.keys().chain(city_days.keys()).copied().collect();
    let daily = dates
        .into_iter()
        .map(|date| DailyComparison {
            date,
            section: section_days.get(&date).copied().unwrap_or(0.0),
            city_average: city_days.get(&date).copied().unwrap_or(0.0),
        })
        .collect();

    let usage = usage_breakdown(readings, section, period);
    let concentration = usage
        .first()
        .map(|top| UsageConcentration::from_top_percent(top.percent));

    Ok(SectionSummary {
        section: section.clone(),
        period,
        total_consumption,
        average_daily,
        city_average_daily,
        daily,
        usage,
        concentration,
        ranking: rank_section(readings, section, period),
        savings: savings_estimates(total_consumption, price_per_unit),
    })
}

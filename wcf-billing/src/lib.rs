//! Tiered water pricing and monthly bill estimation.
//!
//! Consumption arrives in litres. The whole volume is charged at the rate of
//! the tier it falls into (not marginally per tier), then the bill adds VAT
//! and the fixed monthly surcharges.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

pub const LITRES_PER_M3: f64 = 1000.0;

/// VAT applied to the consumption price.
pub const VAT_RATE: f64 = 0.10;
pub const WATER_LEVY: f64 = 6.91;
pub const SEWERAGE_FEE: f64 = 3.09;
pub const WASTE_TREATMENT_FEE: f64 = 11.43;
pub const WASTE_COLLECTION_FEE: f64 = 10.19;

/// Domestic tiers: (upper bound in m³ inclusive, euros per m³).
const DOMESTIC_TIERS: &[(f64, f64)] = &[
    (6.0, 0.8),
    (9.0, 1.6002),
    (15.0, 2.4894),
    (18.0, 3.3189),
    (f64::INFINITY, 4.1486),
];

const COMMERCIAL_TIERS: &[(f64, f64)] = &[(9.0, 1.2164), (f64::INFINITY, 2.4328)];

const AGRICULTURAL_RATE: f64 = 1.1173;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BillingError {
    #[error("Unknown service type: {0} (expected D, C or A)")]
    UnknownServiceType(String),
}

/// Account service class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    /// `D`
    Domestic,
    /// `C`
    Commercial,
    /// `A`
    Agricultural,
}

impl ServiceType {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceType::Domestic => "D",
            ServiceType::Commercial => "C",
            ServiceType::Agricultural => "A",
        }
    }

    /// Euros per m³ for a monthly volume of `m3`.
    pub fn rate_for(&self, m3: f64) -> f64 {
        match self {
            ServiceType::Domestic => tier_rate(DOMESTIC_TIERS, m3),
            ServiceType::Commercial => tier_rate(COMMERCIAL_TIERS, m3),
            ServiceType::Agricultural => AGRICULTURAL_RATE,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ServiceType {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" => Ok(ServiceType::Domestic),
            "C" => Ok(ServiceType::Commercial),
            "A" => Ok(ServiceType::Agricultural),
            _ => Err(BillingError::UnknownServiceType(s.to_string())),
        }
    }
}

fn tier_rate(tiers: &[(f64, f64)], m3: f64) -> f64 {
    tiers
        .iter()
        .find(|(upper, _)| m3 <= *upper)
        .map_or(0.0, |(_, rate)| *rate)
}

/// Consumption price in euros for `litres` of water.
///
/// Negative volumes (an unclamped forecast can produce them) price at zero.
pub fn consumption_price(litres: f64, service: ServiceType) -> f64 {
    let m3 = litres / LITRES_PER_M3;
    if m3.is_nan() || m3 <= 0.0 {
        return 0.0;
    }
    m3 * service.rate_for(m3)
}

/// A monthly bill broken down by line item, in euros.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub consumption: f64,
    pub vat: f64,
    pub water_levy: f64,
    pub sewerage: f64,
    pub waste_treatment: f64,
    pub waste_collection: f64,
}

impl Bill {
    pub fn total(&self) -> f64 {
        self.consumption
            + self.vat
            + self.water_levy
            + self.sewerage
            + self.waste_treatment
            + self.waste_collection
    }
}

/// Build the monthly bill from a consumption price.
pub fn monthly_bill(price: f64) -> Bill {
    Bill {
        consumption: price,
        vat: price * VAT_RATE,
        water_levy: WATER_LEVY,
        sewerage: SEWERAGE_FEE,
        waste_treatment: WASTE_TREATMENT_FEE,
        waste_collection: WASTE_COLLECTION_FEE,
    }
}

/// Price `litres` for `service` and build the monthly bill.
pub fn estimate_bill(litres: f64, service: ServiceType) -> Bill {
    monthly_bill(consumption_price(litres, service))
}

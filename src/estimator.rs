//! # Estimator Module
//!
//! Maps a monthly electricity bill onto an approximate solar station size,
//! cost band and payback period. All figures are illustrative business
//! constants, not engineering calculations.

use serde::Serialize;

use crate::text_processing::{mentions_commercial, mentions_rural, parse_bill_amount};

/// Assumed electricity tariff, rubles per kWh
pub const TARIFF_RUB_PER_KWH: f64 = 6.0;
/// Monthly generation of one installed kW, kWh
pub const KWH_PER_KW_MONTH: f64 = 120.0;
/// Smallest station offered, kW
pub const MIN_POWER_KW: f64 = 1.0;
/// Installed cost per kW, lower bound, rubles
pub const PRICE_PER_KW_MIN: f64 = 70_000.0;
/// Installed cost per kW, upper bound, rubles
pub const PRICE_PER_KW_MAX: f64 = 90_000.0;
/// Bill used when the text carries no amount, rubles per month
pub const DEFAULT_MONTHLY_BILL: u32 = 5000;

/// Recommended station category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StationType {
    /// Grid-tied or hybrid station for a business
    CommercialGridHybrid,
    /// Autonomous or hybrid station for rural or poorly connected sites
    AutonomousHybrid,
    /// Grid-tied or hybrid station for a home
    ResidentialGridHybrid,
}

impl StationType {
    /// Localization key of the station name
    pub fn message_key(self) -> &'static str {
        match self {
            StationType::CommercialGridHybrid => "station-commercial",
            StationType::AutonomousHybrid => "station-autonomous",
            StationType::ResidentialGridHybrid => "station-residential",
        }
    }
}

/// Station sizing derived from a monthly bill
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub station_type: StationType,
    pub bill_amount: u32,
    pub monthly_kwh: f64,
    pub yearly_kwh: f64,
    pub power_kw: f64,
    pub cost_min: u64,
    pub cost_max: u64,
    pub payback_years: f64,
}

/// Pick the station category from the object and region descriptions.
/// Commercial keywords take precedence over rural ones.
pub fn classify_station(context_text: &str) -> StationType {
    if mentions_commercial(context_text) {
        StationType::CommercialGridHybrid
    } else if mentions_rural(context_text) {
        StationType::AutonomousHybrid
    } else {
        StationType::ResidentialGridHybrid
    }
}

fn round_to(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

fn round_cost(value: f64) -> u64 {
    round_to(value, 1000.0) as u64
}

/// Compute an estimate for a bill amount. A zero bill is treated as the default.
pub fn estimate(bill_amount: u32, context_text: &str) -> Estimate {
    let bill_amount = if bill_amount == 0 {
        DEFAULT_MONTHLY_BILL
    } else {
        bill_amount
    };
    let bill = f64::from(bill_amount);

    let monthly_kwh = bill / TARIFF_RUB_PER_KWH;
    let yearly_kwh = monthly_kwh * 12.0;
    let power_kw = round_to((monthly_kwh / KWH_PER_KW_MONTH).max(MIN_POWER_KW), 0.1);

    let cost_min = round_cost(power_kw * PRICE_PER_KW_MIN);
    let cost_max = round_cost(power_kw * PRICE_PER_KW_MAX);

    let average_cost = (cost_min + cost_max) as f64 / 2.0;
    let payback_years = round_to(average_cost / (bill * 12.0), 0.1);

    Estimate {
        station_type: classify_station(context_text),
        bill_amount,
        monthly_kwh: monthly_kwh.round(),
        yearly_kwh: yearly_kwh.round(),
        power_kw,
        cost_min,
        cost_max,
        payback_years,
    }
}

/// Parse the bill out of free text and estimate, falling back to
/// [`DEFAULT_MONTHLY_BILL`] when no amount can be found
pub fn estimate_from_text(bill_text: &str, context_text: &str) -> Estimate {
    let amount = parse_bill_amount(bill_text).unwrap_or(DEFAULT_MONTHLY_BILL);
    estimate(amount, context_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_bill() {
        let result = estimate(5000, "частный дом");

        assert_eq!(result.station_type, StationType::ResidentialGridHybrid);
        assert_eq!(result.monthly_kwh, 833.0);
        assert!((result.power_kw - 6.9).abs() < 1e-9);
        assert_eq!(result.cost_min, 483_000);
        assert_eq!(result.cost_max, 621_000);
        assert!((result.payback_years - 9.2).abs() < 1e-9);
    }

    #[test]
    fn test_power_floor() {
        let result = estimate(300, "");
        assert_eq!(result.power_kw, 1.0);
        assert_eq!(result.cost_min, 70_000);
        assert_eq!(result.cost_max, 90_000);
    }
}

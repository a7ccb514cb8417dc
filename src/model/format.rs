//! Display helpers for footprints, quantities and dates.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::activity::{Quantity, StoredActivity};

/// Footprints below this are shown as a "less than" bound.
const DISPLAY_FLOOR: f64 = 0.01;

static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d.]").expect("valid hardcoded regex"));

/// Formats a footprint in kg CO₂ with two decimals.
///
/// Anything below `0.01`, negative values included, renders as `<0.01 kg CO₂`.
pub fn format_carbon_footprint(kg: f64) -> String {
    if kg < DISPLAY_FLOOR {
        return "<0.01 kg CO₂".to_string();
    }
    format!("{kg:.2} kg CO₂")
}

/// Formats a quantity as value immediately followed by unit (e.g. `12km`).
pub fn format_quantity(quantity: &Quantity) -> String {
    format!("{}{}", quantity.value, quantity.unit)
}

/// Formats a timestamp for lists, e.g. `Oct 18, 2026, 09:30 AM`.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Sums the footprints of `activities`, counting missing footprints as zero.
pub fn calculate_total_carbon(activities: &[StoredActivity]) -> f64 {
    activities
        .iter()
        .map(|a| a.carbon_footprint.unwrap_or(0.0))
        .sum()
}

/// Extracts the unit from a calculation quantity such as `"12.5 km"` -> `"km"`.
pub fn unit_label_from_calculation(quantity: &str) -> String {
    NUMERIC_RE.replace_all(quantity, "").trim().to_string()
}

/// Formats an emission factor, e.g. `0.192 kg CO₂/km`.
pub fn format_emission_factor(factor: f64, unit_label: &str) -> String {
    if unit_label.is_empty() {
        format!("{factor} kg CO₂")
    } else {
        format!("{factor} kg CO₂/{unit_label}")
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse emission-intensity tier of a detail option. Display only.
///
/// Ordered from emission-saving (`Negative`) to `VeryHigh`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum EmissionIntensity {
    Negative,
    Zero,
    VeryLow,
    Low,
    LowMedium,
    #[default]
    Medium,
    MediumHigh,
    High,
    VeryHigh,
}

static ALL_TIERS: &[EmissionIntensity] = &[
    EmissionIntensity::Negative,
    EmissionIntensity::Zero,
    EmissionIntensity::VeryLow,
    EmissionIntensity::Low,
    EmissionIntensity::LowMedium,
    EmissionIntensity::Medium,
    EmissionIntensity::MediumHigh,
    EmissionIntensity::High,
    EmissionIntensity::VeryHigh,
];

impl EmissionIntensity {
    /// Returns the tier key (e.g. `"very-high"`).
    pub fn key(&self) -> &'static str {
        match self {
            EmissionIntensity::Negative => "negative",
            EmissionIntensity::Zero => "zero",
            EmissionIntensity::VeryLow => "very-low",
            EmissionIntensity::Low => "low",
            EmissionIntensity::LowMedium => "low-medium",
            EmissionIntensity::Medium => "medium",
            EmissionIntensity::MediumHigh => "medium-high",
            EmissionIntensity::High => "high",
            EmissionIntensity::VeryHigh => "very-high",
        }
    }

    /// Parses a tier key, falling back to [`EmissionIntensity::Medium`] for unknown keys.
    pub fn from_key(key: &str) -> Self {
        ALL_TIERS
            .iter()
            .copied()
            .find(|t| t.key() == key)
            .unwrap_or_default()
    }

    /// Returns the fixed display colour as an `(r, g, b)` triple.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            EmissionIntensity::Zero => (0x22, 0xc5, 0x5e),
            EmissionIntensity::VeryLow => (0x65, 0xa3, 0x0d),
            EmissionIntensity::Low => (0xea, 0xb3, 0x08),
            EmissionIntensity::LowMedium => (0xf5, 0x9e, 0x0b),
            EmissionIntensity::Medium => (0xf9, 0x73, 0x16),
            EmissionIntensity::MediumHigh => (0xdc, 0x26, 0x26),
            EmissionIntensity::High => (0xb9, 0x1c, 0x1c),
            EmissionIntensity::VeryHigh => (0x7f, 0x1d, 0x1d),
            EmissionIntensity::Negative => (0x05, 0x96, 0x69),
        }
    }

    /// Returns the display colour as a `#rrggbb` string.
    pub fn hex(&self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Returns all tiers in ascending order.
    pub fn all() -> &'static [EmissionIntensity] {
        ALL_TIERS
    }
}

#[mutants::skip]
impl fmt::Display for EmissionIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

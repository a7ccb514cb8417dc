use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a carbon-footprint activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Transport,
    Energy,
    Food,
    Waste,
    Other,
}

static ALL_TYPES: &[ActivityType] = &[
    ActivityType::Transport,
    ActivityType::Energy,
    ActivityType::Food,
    ActivityType::Waste,
    ActivityType::Other,
];

impl ActivityType {
    /// Returns the wire key for this type (e.g. `"transport"`).
    pub fn key(&self) -> &'static str {
        match self {
            ActivityType::Transport => "transport",
            ActivityType::Energy => "energy",
            ActivityType::Food => "food",
            ActivityType::Waste => "waste",
            ActivityType::Other => "other",
        }
    }

    /// Returns the display label for this type.
    pub fn label(&self) -> &'static str {
        match self {
            ActivityType::Transport => "Transport",
            ActivityType::Energy => "Energy",
            ActivityType::Food => "Food",
            ActivityType::Waste => "Waste",
            ActivityType::Other => "Other",
        }
    }

    /// Parses a wire key. Returns `None` for empty or unknown keys.
    pub fn from_key(key: &str) -> Option<Self> {
        ALL_TYPES.iter().copied().find(|t| t.key() == key)
    }

    /// Returns all activity types in selector order.
    pub fn all() -> &'static [ActivityType] {
        ALL_TYPES
    }
}

#[mutants::skip]
impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

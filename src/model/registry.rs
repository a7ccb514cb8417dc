//! Static catalog of activity types: detail sub-fields, quantity units, and
//! the option lists behind each detail field.
//!
//! Lookups never fail hard. Unit lookups for an unset or unknown type go
//! through [`default_descriptor`], the `other` entry, so a unit selector is
//! never empty before a type is chosen.

use thiserror::Error;

use super::activity_type::ActivityType;
use super::intensity::EmissionIntensity;

/// A selectable quantity unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit {
    pub value: &'static str,
    pub label: &'static str,
}

/// One selectable value of a detail field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailOption {
    pub value: &'static str,
    pub label: &'static str,
    pub intensity: EmissionIntensity,
}

/// Key of the option list that backs a detail field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionsProvider {
    TransportModes,
    EnergySources,
    FoodTypes,
    WasteTypes,
    DisposalMethods,
}

impl OptionsProvider {
    /// Returns the options of this provider in display order.
    pub fn options(self) -> &'static [DetailOption] {
        match self {
            OptionsProvider::TransportModes => TRANSPORT_MODES,
            OptionsProvider::EnergySources => ENERGY_SOURCES,
            OptionsProvider::FoodTypes => FOOD_TYPES,
            OptionsProvider::WasteTypes => WASTE_TYPES,
            OptionsProvider::DisposalMethods => DISPOSAL_METHODS,
        }
    }
}

/// A type-specific sub-field of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub options: OptionsProvider,
}

impl FieldSpec {
    /// Returns the selectable options for this field.
    pub fn options(&self) -> &'static [DetailOption] {
        self.options.options()
    }

    /// Looks up one option by value.
    pub fn option(&self, value: &str) -> Option<&'static DetailOption> {
        self.options().iter().find(|o| o.value == value)
    }
}

/// Everything the form needs to know about one activity type.
#[derive(Debug, PartialEq, Eq)]
pub struct ActivityTypeDescriptor {
    pub activity_type: ActivityType,
    pub key: &'static str,
    pub label: &'static str,
    pub detail_field_specs: &'static [FieldSpec],
    pub allowed_units: &'static [Unit],
}

/// Returned by [`descriptor_for`] for a key with no registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown activity type: {0:?}")]
pub struct UnknownActivityType(pub String);

static TRANSPORT_MODES: &[DetailOption] = &[
    option("car_gasoline", "Gasoline Car", EmissionIntensity::High),
    option("car_diesel", "Diesel Car", EmissionIntensity::MediumHigh),
    option("car_hybrid", "Hybrid Car", EmissionIntensity::Medium),
    option("car_electric", "Electric Car", EmissionIntensity::Low),
    option("motorcycle", "Motorcycle", EmissionIntensity::Medium),
    option("bus", "Public Bus", EmissionIntensity::LowMedium),
    option("train", "Train", EmissionIntensity::Low),
    option("plane_domestic", "Domestic Flight", EmissionIntensity::High),
    option("plane_international", "International Flight", EmissionIntensity::VeryHigh),
    option("bicycle", "Bicycle", EmissionIntensity::Zero),
    option("walking", "Walking", EmissionIntensity::Zero),
];

static ENERGY_SOURCES: &[DetailOption] = &[
    option("grid_average", "Grid Average", EmissionIntensity::Medium),
    option("coal", "Coal Power", EmissionIntensity::VeryHigh),
    option("natural_gas", "Natural Gas", EmissionIntensity::MediumHigh),
    option("nuclear", "Nuclear Power", EmissionIntensity::Low),
    option("solar", "Solar Power", EmissionIntensity::VeryLow),
    option("wind", "Wind Power", EmissionIntensity::VeryLow),
    option("hydro", "Hydroelectric", EmissionIntensity::VeryLow),
];

static FOOD_TYPES: &[DetailOption] = &[
    option("beef", "Beef", EmissionIntensity::VeryHigh),
    option("dairy_cheese", "Cheese", EmissionIntensity::High),
    option("pork", "Pork", EmissionIntensity::MediumHigh),
    option("chicken", "Chicken", EmissionIntensity::Medium),
    option("fish", "Fish", EmissionIntensity::Medium),
    option("processed_food", "Processed Food", EmissionIntensity::Medium),
    option("dairy_milk", "Milk", EmissionIntensity::Medium),
    option("vegetables", "Vegetables", EmissionIntensity::Low),
    option("grains", "Grains", EmissionIntensity::Low),
    option("fruits", "Fruits", EmissionIntensity::VeryLow),
];

static WASTE_TYPES: &[DetailOption] = &[
    option("general_waste", "General Waste", EmissionIntensity::Medium),
    option("hazardous", "Hazardous Waste", EmissionIntensity::VeryHigh),
    option("compost", "Compostable", EmissionIntensity::Low),
    option("recycling", "Recycling", EmissionIntensity::Negative),
];

static DISPOSAL_METHODS: &[DetailOption] = &[
    option("landfill", "Landfill", EmissionIntensity::High),
    option("incineration", "Incineration", EmissionIntensity::Medium),
    option("recycling", "Recycling", EmissionIntensity::Negative),
    option("composting", "Composting", EmissionIntensity::Low),
];

static TRANSPORT: ActivityTypeDescriptor = ActivityTypeDescriptor {
    activity_type: ActivityType::Transport,
    key: "transport",
    label: "Transport",
    detail_field_specs: &[FieldSpec {
        key: "transportMode",
        label: "Transport Mode",
        required: true,
        options: OptionsProvider::TransportModes,
    }],
    allowed_units: &[
        unit("km", "Kilometers (km)"),
        unit("miles", "Miles"),
        unit("m", "Meters (m)"),
    ],
};

static ENERGY: ActivityTypeDescriptor = ActivityTypeDescriptor {
    activity_type: ActivityType::Energy,
    key: "energy",
    label: "Energy",
    detail_field_specs: &[FieldSpec {
        key: "energySource",
        label: "Energy Source",
        required: true,
        options: OptionsProvider::EnergySources,
    }],
    allowed_units: &[
        unit("kWh", "Kilowatt Hours (kWh)"),
        unit("MWh", "Megawatt Hours (MWh)"),
        unit("BTU", "British Thermal Units (BTU)"),
    ],
};

static FOOD: ActivityTypeDescriptor = ActivityTypeDescriptor {
    activity_type: ActivityType::Food,
    key: "food",
    label: "Food",
    detail_field_specs: &[FieldSpec {
        key: "foodType",
        label: "Food Type",
        required: true,
        options: OptionsProvider::FoodTypes,
    }],
    allowed_units: &[
        unit("kg", "Kilograms (kg)"),
        unit("lbs", "Pounds (lbs)"),
        unit("g", "Grams (g)"),
        unit("servings", "Servings"),
    ],
};

static WASTE: ActivityTypeDescriptor = ActivityTypeDescriptor {
    activity_type: ActivityType::Waste,
    key: "waste",
    label: "Waste",
    detail_field_specs: &[
        FieldSpec {
            key: "wasteType",
            label: "Waste Type",
            required: true,
            options: OptionsProvider::WasteTypes,
        },
        FieldSpec {
            key: "disposalMethod",
            label: "Disposal Method",
            required: false,
            options: OptionsProvider::DisposalMethods,
        },
    ],
    allowed_units: &[
        unit("kg", "Kilograms (kg)"),
        unit("lbs", "Pounds (lbs)"),
        unit("g", "Grams (g)"),
    ],
};

static OTHER: ActivityTypeDescriptor = ActivityTypeDescriptor {
    activity_type: ActivityType::Other,
    key: "other",
    label: "Other",
    detail_field_specs: &[],
    allowed_units: &[
        unit("items", "Items"),
        unit("pieces", "Pieces"),
        unit("hours", "Hours"),
        unit("days", "Days"),
    ],
};

static DESCRIPTORS: &[&ActivityTypeDescriptor] = &[&TRANSPORT, &ENERGY, &FOOD, &WASTE, &OTHER];

const fn option(
    value: &'static str,
    label: &'static str,
    intensity: EmissionIntensity,
) -> DetailOption {
    DetailOption {
        value,
        label,
        intensity,
    }
}

const fn unit(value: &'static str, label: &'static str) -> Unit {
    Unit { value, label }
}

impl ActivityType {
    /// Returns the registry entry for this type.
    pub fn descriptor(self) -> &'static ActivityTypeDescriptor {
        match self {
            ActivityType::Transport => &TRANSPORT,
            ActivityType::Energy => &ENERGY,
            ActivityType::Food => &FOOD,
            ActivityType::Waste => &WASTE,
            ActivityType::Other => &OTHER,
        }
    }
}

/// Returns every registry entry in selector order.
pub fn descriptors() -> &'static [&'static ActivityTypeDescriptor] {
    DESCRIPTORS
}

/// The entry used when no type (or an unknown type) is selected: `other`.
pub fn default_descriptor() -> &'static ActivityTypeDescriptor {
    &OTHER
}

/// Looks up the registry entry for a type key.
pub fn descriptor_for(key: &str) -> Result<&'static ActivityTypeDescriptor, UnknownActivityType> {
    descriptors()
        .iter()
        .copied()
        .find(|d| d.key == key)
        .ok_or_else(|| UnknownActivityType(key.to_string()))
}

/// Returns the allowed units for a type key, or the default (`other`) units
/// when the key is empty or unknown.
pub fn units_for(key: &str) -> &'static [Unit] {
    descriptor_for(key)
        .unwrap_or_else(|_| default_descriptor())
        .allowed_units
}

/// Returns the detail sub-fields for a type key. Empty for `other` and for
/// unknown keys.
pub fn detail_field_specs_for(key: &str) -> &'static [FieldSpec] {
    match descriptor_for(key) {
        Ok(d) => d.detail_field_specs,
        Err(_) => &[],
    }
}

/// Returns `true` if `unit` is one of the allowed units for `key`.
pub fn is_allowed_unit(key: &str, unit: &str) -> bool {
    units_for(key).iter().any(|u| u.value == unit)
}

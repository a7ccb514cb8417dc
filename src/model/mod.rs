mod activity;
mod activity_type;
mod draft;
mod format;
mod intensity;
pub mod registry;
mod validation;

pub use activity::{
    ActivityDetails, ActivityFilters, ActivityPage, ActivityRecord, CarbonPreview, Pagination,
    PreviewCalculation, PreviewQuery, Quantity, StoredActivity,
};
pub use activity_type::ActivityType;
pub use draft::{ActivityDraft, DraftError, DraftQuantity, PreviewInput, parse_quantity_value};
pub use format::{
    calculate_total_carbon, format_carbon_footprint, format_date, format_emission_factor,
    format_quantity, unit_label_from_calculation,
};
pub use intensity::EmissionIntensity;
pub use registry::{
    ActivityTypeDescriptor, DetailOption, FieldSpec, OptionsProvider, Unit, UnknownActivityType,
};
pub use validation::{
    ValidationError, ValidationResult, field, validate, validate_detail, validate_quantity_value,
    validate_required_text,
};

use std::collections::BTreeMap;

use thiserror::Error;

use super::activity_type::ActivityType;
use super::draft::ActivityDraft;
use super::registry::FieldSpec;

/// Field keys used in [`ValidationResult`]. Detail fields use their registry key.
pub mod field {
    pub const ACTIVITY_NAME: &str = "activityName";
    pub const ACTIVITY_TYPE: &str = "activityType";
    pub const DESCRIPTION: &str = "description";
    pub const QUANTITY: &str = "quantity";
    pub const UNIT: &str = "unit";
}

/// Validation errors for activity draft fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Activity name is required")]
    MissingName,
    #[error("Activity type is required")]
    MissingType,
    #[error("Description is required")]
    MissingDescription,
    #[error("Quantity value must be greater than 0")]
    NonPositiveQuantity,
    #[error("Quantity unit is required")]
    MissingUnit,
    #[error("{} is required for {activity_type} activities", sentence_case(.label))]
    MissingDetail {
        key: &'static str,
        label: &'static str,
        activity_type: ActivityType,
    },
}

impl ValidationError {
    /// Returns the key of the field this error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingName => field::ACTIVITY_NAME,
            ValidationError::MissingType => field::ACTIVITY_TYPE,
            ValidationError::MissingDescription => field::DESCRIPTION,
            ValidationError::NonPositiveQuantity => field::QUANTITY,
            ValidationError::MissingUnit => field::UNIT,
            ValidationError::MissingDetail { key, .. } => *key,
        }
    }
}

/// `"Transport Mode"` -> `"Transport mode"`.
fn sentence_case(label: &str) -> String {
    let mut words = label.split(' ');
    let mut out = words.next().unwrap_or_default().to_string();
    for word in words {
        out.push(' ');
        out.push_str(&word.to_lowercase());
    }
    out
}

/// Field errors of one validation run, keyed by field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    errors: BTreeMap<&'static str, ValidationError>,
}

impl ValidationResult {
    /// Returns `true` if no field has an error.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the errors keyed by field.
    pub fn errors(&self) -> &BTreeMap<&'static str, ValidationError> {
        &self.errors
    }

    /// Returns the error for one field, if any.
    pub fn get(&self, field: &str) -> Option<&ValidationError> {
        self.errors.get(field)
    }

    /// Returns the field keys that have errors, in key order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.keys().copied().collect()
    }

    /// Removes errors for fields that `keep` rejects.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.errors.retain(|k, _| keep(k));
    }

    /// Removes the error for one field.
    pub fn clear_field(&mut self, field: &str) {
        self.errors.remove(field);
    }

    fn record(&mut self, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.errors.insert(e.field(), e);
        }
    }
}

/// Validates that a text field is non-empty after trimming.
pub fn validate_required_text(value: &str, error: ValidationError) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error)
    } else {
        Ok(())
    }
}

/// Validates a quantity value: present and strictly greater than zero.
pub fn validate_quantity_value(value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v > 0.0 => Ok(()),
        _ => Err(ValidationError::NonPositiveQuantity),
    }
}

/// Validates that a required detail field has a value.
pub fn validate_detail(
    spec: &FieldSpec,
    activity_type: ActivityType,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    if !spec.required || value.is_some_and(|v| !v.is_empty()) {
        return Ok(());
    }
    Err(ValidationError::MissingDetail {
        key: spec.key,
        label: spec.label,
        activity_type,
    })
}

/// Validates a draft. Every rule runs; errors are accumulated per field.
pub fn validate(draft: &ActivityDraft) -> ValidationResult {
    let mut result = ValidationResult::default();

    result.record(validate_required_text(
        &draft.activity_name,
        ValidationError::MissingName,
    ));
    if draft.activity_type().is_none() {
        result.record(Err(ValidationError::MissingType));
    }
    result.record(validate_required_text(
        &draft.description,
        ValidationError::MissingDescription,
    ));
    result.record(validate_quantity_value(draft.quantity.value));
    result.record(validate_required_text(
        &draft.quantity.unit,
        ValidationError::MissingUnit,
    ));

    if let Some(activity_type) = draft.activity_type() {
        for spec in activity_type.descriptor().detail_field_specs {
            result.record(validate_detail(spec, activity_type, draft.detail(spec.key)));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::model::draft::DraftQuantity;

    fn commute() -> ActivityDraft {
        let mut draft = ActivityDraft::new();
        draft.activity_name = "Commute".into();
        draft.set_activity_type(Some(ActivityType::Transport));
        draft.description = "Drove to work".into();
        draft.quantity = DraftQuantity {
            value: Some(12.0),
            unit: "km".into(),
        };
        draft.set_detail("transportMode", "car_gasoline").unwrap();
        draft
    }

    fn filled(activity_type: ActivityType) -> ActivityDraft {
        let mut draft = ActivityDraft::new();
        draft.activity_name = "Something".into();
        draft.set_activity_type(Some(activity_type));
        draft.description = "Described".into();
        draft.quantity = DraftQuantity {
            value: Some(1.0),
            unit: activity_type.descriptor().allowed_units[0].value.into(),
        };
        draft
    }

    // --- end-to-end drafts ---

    #[test]
    fn commute_is_valid() {
        let result = validate(&commute());
        assert!(result.is_valid(), "{result:?}");
        assert!(result.errors().is_empty());
    }

    #[test]
    fn waste_without_waste_type_has_single_error() {
        let result = validate(&filled(ActivityType::Waste));
        assert!(!result.is_valid());
        assert_eq!(result.fields(), vec!["wasteType"]);
    }

    #[test]
    fn disposal_method_is_optional() {
        let mut draft = filled(ActivityType::Waste);
        draft.set_detail("wasteType", "compost").unwrap();
        assert!(validate(&draft).is_valid());
    }

    #[test]
    fn other_needs_no_details() {
        assert!(validate(&filled(ActivityType::Other)).is_valid());
    }

    #[test]
    fn empty_draft_reports_every_base_field() {
        let result = validate(&ActivityDraft::new());
        assert_eq!(
            result.fields(),
            vec!["activityName", "activityType", "description", "quantity", "unit"]
        );
    }

    // --- individual rules ---

    #[test]
    fn whitespace_name_and_description_rejected() {
        let mut draft = commute();
        draft.activity_name = "   ".into();
        draft.description = "\t".into();
        let result = validate(&draft);
        assert_eq!(result.get("activityName"), Some(&ValidationError::MissingName));
        assert_eq!(
            result.get("description"),
            Some(&ValidationError::MissingDescription)
        );
    }

    #[test]
    fn zero_quantity_rejected() {
        assert_eq!(
            validate_quantity_value(Some(0.0)),
            Err(ValidationError::NonPositiveQuantity)
        );
    }

    #[test]
    fn missing_quantity_rejected() {
        assert_eq!(
            validate_quantity_value(None),
            Err(ValidationError::NonPositiveQuantity)
        );
    }

    #[test]
    fn nan_quantity_rejected() {
        assert_eq!(
            validate_quantity_value(Some(f64::NAN)),
            Err(ValidationError::NonPositiveQuantity)
        );
    }

    #[test]
    fn small_positive_quantity_accepted() {
        assert_eq!(validate_quantity_value(Some(0.001)), Ok(()));
    }

    #[test]
    fn missing_unit_uses_unit_key() {
        let mut draft = commute();
        draft.quantity.unit.clear();
        let result = validate(&draft);
        assert_eq!(result.fields(), vec!["unit"]);
    }

    #[test]
    fn detail_messages_name_the_field_and_type() {
        let cases = [
            (
                ActivityType::Transport,
                "transportMode",
                "Transport mode is required for transport activities",
            ),
            (
                ActivityType::Energy,
                "energySource",
                "Energy source is required for energy activities",
            ),
            (
                ActivityType::Food,
                "foodType",
                "Food type is required for food activities",
            ),
            (
                ActivityType::Waste,
                "wasteType",
                "Waste type is required for waste activities",
            ),
        ];
        for (activity_type, key, message) in cases {
            let result = validate(&filled(activity_type));
            assert_eq!(result.fields(), vec![key]);
            assert_eq!(result.get(key).unwrap().to_string(), message);
        }
    }

    #[test]
    fn base_messages() {
        assert_eq!(
            ValidationError::NonPositiveQuantity.to_string(),
            "Quantity value must be greater than 0"
        );
        assert_eq!(
            ValidationError::MissingUnit.to_string(),
            "Quantity unit is required"
        );
    }

    #[test]
    fn retain_and_clear_field() {
        let mut result = validate(&ActivityDraft::new());
        result.clear_field("unit");
        result.retain(|k| k != "quantity");
        assert_eq!(
            result.fields(),
            vec!["activityName", "activityType", "description"]
        );
    }

    #[test]
    fn sentence_case_lowercases_trailing_words() {
        assert_eq!(sentence_case("Transport Mode"), "Transport mode");
        assert_eq!(sentence_case("Single"), "Single");
    }

    // --- properties ---

    #[quickcheck]
    fn non_positive_quantity_always_reported(value: f64, type_index: u8, name: String) -> bool {
        if value.is_nan() || value > 0.0 {
            return true; // only non-positive values are under test
        }
        let activity_type = ActivityType::all()[type_index as usize % ActivityType::all().len()];
        let mut draft = filled(activity_type);
        draft.activity_name = name;
        draft.quantity.value = Some(value);
        validate(&draft).get(field::QUANTITY) == Some(&ValidationError::NonPositiveQuantity)
    }

    #[quickcheck]
    fn transport_mode_rule_fires_only_for_transport(type_index: u8) -> bool {
        let activity_type = ActivityType::all()[type_index as usize % ActivityType::all().len()];
        let draft = filled(activity_type);
        let fired = validate(&draft).get("transportMode").is_some();
        fired == (activity_type == ActivityType::Transport)
    }

    #[quickcheck]
    fn positive_finite_quantity_never_reported(value: f64) -> bool {
        if !(value.is_finite() && value > 0.0) {
            return true;
        }
        let mut draft = commute();
        draft.quantity.value = Some(value);
        validate(&draft).is_valid()
    }
}

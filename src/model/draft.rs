use chrono::{DateTime, Utc};
use thiserror::Error;

use super::activity::{ActivityDetails, ActivityRecord, PreviewQuery, Quantity, StoredActivity};
use super::activity_type::ActivityType;
use super::registry;
use super::validation::{ValidationResult, validate};

/// Errors from editing a draft's detail fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("select an activity type before setting {0}")]
    NoActivityType(String),
    #[error("{key} is not a detail field of {activity_type} activities")]
    UnknownDetailField {
        key: String,
        activity_type: ActivityType,
    },
}

/// A possibly incomplete quantity as entered in the form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DraftQuantity {
    pub value: Option<f64>,
    pub unit: String,
}

/// The activity being edited in an open dialog.
///
/// Detail keys are always a subset of the current type's detail fields;
/// changing the type drops every detail value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActivityDraft {
    pub activity_name: String,
    activity_type: Option<ActivityType>,
    pub description: String,
    pub quantity: DraftQuantity,
    activity_details: ActivityDetails,
    /// Carried for edited activities but never sent: submissions are stamped
    /// with the submission instant.
    pub date: Option<DateTime<Utc>>,
}

/// A complete preview input: type, value and unit are all present.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewInput {
    pub activity_type: ActivityType,
    pub quantity: Quantity,
    pub activity_details: ActivityDetails,
}

impl PreviewInput {
    /// Converts this snapshot into the backend's preview request body.
    pub fn to_query(&self) -> PreviewQuery {
        PreviewQuery {
            activity_type: self.activity_type,
            quantity: self.quantity.clone(),
            activity_details: self.activity_details.clone(),
        }
    }
}

/// Parses a quantity typed by the user. Blank, malformed and non-finite input is unset.
pub fn parse_quantity_value(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl ActivityDraft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a draft pre-filled from a stored activity, for editing.
    ///
    /// Detail values that are not fields of the stored type are dropped.
    pub fn from_stored(activity: &StoredActivity) -> Self {
        let mut draft = Self {
            activity_name: activity.activity_name.clone(),
            activity_type: Some(activity.activity_type),
            description: activity.description.clone(),
            quantity: DraftQuantity {
                value: Some(activity.quantity.value),
                unit: activity.quantity.unit.clone(),
            },
            activity_details: ActivityDetails::new(),
            date: Some(activity.date),
        };
        for (key, value) in &activity.activity_details {
            // Foreign keys are dropped to keep the subset invariant.
            let _ = draft.set_detail(key, value);
        }
        draft
    }

    /// Returns the selected activity type.
    pub fn activity_type(&self) -> Option<ActivityType> {
        self.activity_type
    }

    /// Selects an activity type. Returns `true` if the type changed.
    ///
    /// A change clears all detail values, and clears the unit when it is not
    /// allowed for the new type.
    pub fn set_activity_type(&mut self, activity_type: Option<ActivityType>) -> bool {
        if self.activity_type == activity_type {
            return false;
        }
        self.activity_type = activity_type;
        self.activity_details.clear();
        if !self.quantity.unit.is_empty()
            && !registry::is_allowed_unit(self.type_key(), &self.quantity.unit)
        {
            self.quantity.unit.clear();
        }
        true
    }

    /// Returns the selected type's key, or `""` when unset.
    pub fn type_key(&self) -> &'static str {
        self.activity_type.map_or("", |t| t.key())
    }

    /// Returns the detail values.
    pub fn activity_details(&self) -> &ActivityDetails {
        &self.activity_details
    }

    /// Returns one detail value.
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.activity_details.get(key).map(String::as_str)
    }

    /// Sets a detail value. An empty value removes the detail.
    pub fn set_detail(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        let activity_type = self
            .activity_type
            .ok_or_else(|| DraftError::NoActivityType(key.to_string()))?;
        if !activity_type
            .descriptor()
            .detail_field_specs
            .iter()
            .any(|spec| spec.key == key)
        {
            return Err(DraftError::UnknownDetailField {
                key: key.to_string(),
                activity_type,
            });
        }
        if value.is_empty() {
            self.activity_details.remove(key);
        } else {
            self.activity_details
                .insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    /// Returns the preview snapshot, or `None` while type, value or unit is missing.
    ///
    /// Detail values may be partial.
    pub fn preview_input(&self) -> Option<PreviewInput> {
        let activity_type = self.activity_type?;
        let value = self.quantity.value?;
        if self.quantity.unit.is_empty() {
            return None;
        }
        Some(PreviewInput {
            activity_type,
            quantity: Quantity {
                value,
                unit: self.quantity.unit.clone(),
            },
            activity_details: self.activity_details.clone(),
        })
    }

    /// Validates the draft and builds the request body stamped with `date`.
    ///
    /// The draft's own [`date`](Self::date) is ignored.
    pub fn to_record(&self, date: DateTime<Utc>) -> Result<ActivityRecord, ValidationResult> {
        let result = validate(self);
        let (Some(activity_type), Some(value), true) =
            (self.activity_type, self.quantity.value, result.is_valid())
        else {
            return Err(result);
        };
        Ok(ActivityRecord {
            activity_name: self.activity_name.trim().to_string(),
            activity_type,
            description: self.description.trim().to_string(),
            quantity: Quantity {
                value,
                unit: self.quantity.unit.clone(),
            },
            activity_details: self.activity_details.clone(),
            date,
        })
    }
}

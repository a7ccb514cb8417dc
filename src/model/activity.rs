//! Wire records exchanged with the activity backend.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::activity_type::ActivityType;

/// Type-specific detail values keyed by detail-field key (e.g. `transportMode`).
pub type ActivityDetails = BTreeMap<String, String>;

/// A complete quantity as sent to and received from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

/// The body of a create or update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub activity_name: String,
    pub activity_type: ActivityType,
    pub description: String,
    pub quantity: Quantity,
    pub activity_details: ActivityDetails,
    pub date: DateTime<Utc>,
}

/// An activity as stored by the backend, with its computed footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredActivity {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub activity_name: String,
    pub activity_type: ActivityType,
    #[serde(default)]
    pub description: String,
    pub quantity: Quantity,
    #[serde(default)]
    pub activity_details: ActivityDetails,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub carbon_footprint: Option<f64>,
    #[serde(default)]
    pub emission_factor: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The body of a preview request: a record without name, description or date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewQuery {
    pub activity_type: ActivityType,
    pub quantity: Quantity,
    pub activity_details: ActivityDetails,
}

/// The backend's breakdown of a preview calculation.
///
/// Only `quantity` (e.g. `"12 km"`) is interpreted; other keys are kept as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PreviewCalculation {
    #[serde(default)]
    pub quantity: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The backend's answer to a preview request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonPreview {
    pub emission_factor: f64,
    pub calculated_carbon_footprint: f64,
    #[serde(default)]
    pub calculation: PreviewCalculation,
}

/// Optional, AND-combined filters for listing activities.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub activity_type: Option<ActivityType>,
    pub activity_name: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ActivityFilters {
    /// Returns the query-string pairs for the filters that are set.
    ///
    /// Blank names and zero page/limit values are treated as unset.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(date) = self.start_date {
            pairs.push(("startDate", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.end_date {
            pairs.push(("endDate", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(t) = self.activity_type {
            pairs.push(("activityType", t.key().to_string()));
        }
        if let Some(name) = self.activity_name.as_deref()
            && !name.trim().is_empty()
        {
            pairs.push(("activityName", name.to_string()));
        }
        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Pagination block of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

/// One page of stored activities.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityPage {
    pub activities: Vec<StoredActivity>,
    pub pagination: Pagination,
}

impl ActivityPage {
    /// Returns `true` if the backend reports a page after this one.
    pub fn has_next(&self) -> bool {
        self.pagination.page < self.pagination.pages
    }
}

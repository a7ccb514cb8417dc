//! Remote activity backend: the async capability the core consumes, and its
//! HTTP implementation.

mod error;
#[cfg(test)]
pub(crate) mod fake;
mod http;

use async_trait::async_trait;

use crate::model::{
    ActivityFilters, ActivityPage, ActivityRecord, CarbonPreview, PreviewQuery, StoredActivity,
};

pub use error::GatewayError;
pub use http::HttpGateway;

/// Backend operations on activities.
///
/// The backend owns storage and the emission-factor calculation; callers only
/// see these results.
#[async_trait]
pub trait ActivityGateway: Send + Sync {
    /// Stores a new activity; the backend computes its footprint.
    async fn create_activity(&self, record: &ActivityRecord)
    -> Result<StoredActivity, GatewayError>;

    /// Replaces an existing activity; the backend recomputes its footprint.
    async fn update_activity(
        &self,
        id: &str,
        record: &ActivityRecord,
    ) -> Result<StoredActivity, GatewayError>;

    /// Fetches one activity.
    async fn get_activity(&self, id: &str) -> Result<StoredActivity, GatewayError>;

    /// Deletes one activity.
    async fn delete_activity(&self, id: &str) -> Result<(), GatewayError>;

    /// Lists activities matching all set filters.
    async fn list_activities(&self, filters: &ActivityFilters)
    -> Result<ActivityPage, GatewayError>;

    /// Estimates the footprint of an unsaved activity.
    async fn calculate_carbon_preview(
        &self,
        query: &PreviewQuery,
    ) -> Result<CarbonPreview, GatewayError>;
}

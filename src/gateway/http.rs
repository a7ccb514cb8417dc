use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ActivityGateway, GatewayError};
use crate::model::{
    ActivityFilters, ActivityPage, ActivityRecord, CarbonPreview, PreviewQuery, StoredActivity,
};

/// Error bodies carry `message` (or `error`).
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// [`ActivityGateway`] over the backend's REST API.
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Creates a gateway for the API rooted at `base_url` (e.g. `http://localhost:5000/api`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Sends a request and returns the success body, or the mapped error.
    async fn send(&self, request: RequestBuilder) -> Result<String, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "backend returned an error status");
            return Err(GatewayError::from_status(
                status.as_u16(),
                error_message(status, &body),
            ));
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let body = self.send(request).await?;
        decode(&body)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Decodes a success body. Responses arrive either bare or wrapped as
/// `{ "data": ... }`; a wrapped payload is decoded strictly.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, GatewayError> {
    let decoded = serde_json::from_str::<Value>(body).and_then(|mut value| {
        let payload = if value.get("data").is_some() {
            value["data"].take()
        } else {
            value
        };
        serde_json::from_value(payload)
    });
    decoded.map_err(|e| {
        warn!(error = %e, "undecodable backend response");
        GatewayError::from(e)
    })
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

#[async_trait]
impl ActivityGateway for HttpGateway {
    async fn create_activity(
        &self,
        record: &ActivityRecord,
    ) -> Result<StoredActivity, GatewayError> {
        let url = self.url("activities");
        debug!(%url, "creating activity");
        self.send_json(self.client.post(url).json(record)).await
    }

    async fn update_activity(
        &self,
        id: &str,
        record: &ActivityRecord,
    ) -> Result<StoredActivity, GatewayError> {
        let url = self.url(&format!("activities/{id}"));
        debug!(%url, "updating activity");
        self.send_json(self.client.put(url).json(record)).await
    }

    async fn get_activity(&self, id: &str) -> Result<StoredActivity, GatewayError> {
        let url = self.url(&format!("activities/{id}"));
        debug!(%url, "fetching activity");
        self.send_json(self.client.get(url)).await
    }

    async fn delete_activity(&self, id: &str) -> Result<(), GatewayError> {
        let url = self.url(&format!("activities/{id}"));
        debug!(%url, "deleting activity");
        self.send(self.client.delete(url)).await.map(|_| ())
    }

    async fn list_activities(
        &self,
        filters: &ActivityFilters,
    ) -> Result<ActivityPage, GatewayError> {
        let url = self.url("activities");
        let query = filters.query_pairs();
        debug!(%url, ?query, "listing activities");
        self.send_json(self.client.get(url).query(&query)).await
    }

    async fn calculate_carbon_preview(
        &self,
        query: &PreviewQuery,
    ) -> Result<CarbonPreview, GatewayError> {
        let url = self.url("activities/calculate-preview");
        debug!(%url, activity_type = %query.activity_type, "requesting preview");
        self.send_json(self.client.post(url).json(query)).await
    }
}

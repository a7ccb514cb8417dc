//! In-memory [`ActivityGateway`] for tests.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{ActivityGateway, GatewayError};
use crate::model::{
    ActivityFilters, ActivityPage, ActivityRecord, CarbonPreview, Pagination, PreviewCalculation,
    PreviewQuery, StoredActivity,
};

type PreviewReply = Result<CarbonPreview, GatewayError>;

#[derive(Default)]
struct State {
    activities: Vec<StoredActivity>,
    next_id: u32,
    saves: Vec<(Option<String>, ActivityRecord)>,
    deleted: Vec<String>,
    list_calls: Vec<ActivityFilters>,
    preview_queries: Vec<PreviewQuery>,
    held: Vec<Option<oneshot::Sender<PreviewReply>>>,
    hold_previews: bool,
    fail_previews: bool,
    fail_next_save: Option<(u16, String)>,
}

/// Records every call. Previews answer immediately with a factor of `0.2`
/// unless held, in which case each is released explicitly by index.
#[derive(Default)]
pub(crate) struct FakeGateway {
    state: Mutex<State>,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Preview calls wait until [`release_preview`](Self::release_preview).
    pub(crate) fn holding_previews() -> Self {
        let fake = Self::default();
        fake.state().hold_previews = true;
        fake
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub(crate) fn with_activities(activities: Vec<StoredActivity>) -> Self {
        let fake = Self::default();
        fake.state().activities = activities;
        fake
    }

    pub(crate) fn fail_previews(&self) {
        self.state().fail_previews = true;
    }

    pub(crate) fn fail_next_save(&self, status: u16, message: &str) {
        self.state().fail_next_save = Some((status, message.to_string()));
    }

    pub(crate) fn preview_queries(&self) -> Vec<PreviewQuery> {
        self.state().preview_queries.clone()
    }

    pub(crate) fn saves(&self) -> Vec<(Option<String>, ActivityRecord)> {
        self.state().saves.clone()
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.state().deleted.clone()
    }

    pub(crate) fn list_calls(&self) -> Vec<ActivityFilters> {
        self.state().list_calls.clone()
    }

    fn take_held(&self, index: usize) -> Option<oneshot::Sender<PreviewReply>> {
        self.state().held.get_mut(index).and_then(Option::take)
    }

    /// Answers the `index`th held preview call, waiting for it to be issued.
    pub(crate) async fn release_preview(&self, index: usize, reply: PreviewReply) {
        let tx = loop {
            if let Some(tx) = self.take_held(index) {
                break tx;
            }
            tokio::task::yield_now().await;
        };
        let _ = tx.send(reply);
    }
}

/// The preview the fake computes for `query` at a factor of `factor`.
pub(crate) fn preview_for(query: &PreviewQuery, factor: f64) -> CarbonPreview {
    CarbonPreview {
        emission_factor: factor,
        calculated_carbon_footprint: query.quantity.value * factor,
        calculation: PreviewCalculation {
            quantity: format!("{} {}", query.quantity.value, query.quantity.unit),
            extra: serde_json::Map::new(),
        },
    }
}

fn stored_from(id: String, record: &ActivityRecord) -> StoredActivity {
    StoredActivity {
        id,
        activity_name: record.activity_name.clone(),
        activity_type: record.activity_type,
        description: record.description.clone(),
        quantity: record.quantity.clone(),
        activity_details: record.activity_details.clone(),
        date: record.date,
        carbon_footprint: Some(record.quantity.value * 0.2),
        emission_factor: Some(0.2),
        created_at: Some(record.date),
    }
}

#[async_trait]
impl ActivityGateway for FakeGateway {
    async fn create_activity(
        &self,
        record: &ActivityRecord,
    ) -> Result<StoredActivity, GatewayError> {
        let mut state = self.state();
        state.saves.push((None, record.clone()));
        if let Some((status, message)) = state.fail_next_save.take() {
            return Err(GatewayError::from_status(status, message));
        }
        state.next_id += 1;
        let stored = stored_from(format!("id-{}", state.next_id), record);
        state.activities.push(stored.clone());
        Ok(stored)
    }

    async fn update_activity(
        &self,
        id: &str,
        record: &ActivityRecord,
    ) -> Result<StoredActivity, GatewayError> {
        let mut state = self.state();
        state.saves.push((Some(id.to_string()), record.clone()));
        if let Some((status, message)) = state.fail_next_save.take() {
            return Err(GatewayError::from_status(status, message));
        }
        let stored = stored_from(id.to_string(), record);
        match state.activities.iter_mut().find(|a| a.id == id) {
            Some(existing) => *existing = stored.clone(),
            None => return Err(GatewayError::from_status(404, "Activity not found".into())),
        }
        Ok(stored)
    }

    async fn get_activity(&self, id: &str) -> Result<StoredActivity, GatewayError> {
        self.state()
            .activities
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::from_status(404, "Activity not found".into()))
    }

    async fn delete_activity(&self, id: &str) -> Result<(), GatewayError> {
        let mut state = self.state();
        let before = state.activities.len();
        state.activities.retain(|a| a.id != id);
        if state.activities.len() == before {
            return Err(GatewayError::from_status(404, "Activity not found".into()));
        }
        state.deleted.push(id.to_string());
        Ok(())
    }

    async fn list_activities(
        &self,
        filters: &ActivityFilters,
    ) -> Result<ActivityPage, GatewayError> {
        let mut state = self.state();
        state.list_calls.push(filters.clone());
        let matching: Vec<StoredActivity> = state
            .activities
            .iter()
            .filter(|a| filters.activity_type.is_none_or(|t| t == a.activity_type))
            .cloned()
            .collect();
        let limit = filters.limit.filter(|l| *l > 0).unwrap_or(20);
        let page = filters.page.filter(|p| *p > 0).unwrap_or(1);
        let total = matching.len();
        let pages = total.div_ceil(limit as usize) as u32;
        let activities = matching
            .into_iter()
            .skip((page as usize - 1) * limit as usize)
            .take(limit as usize)
            .collect();
        Ok(ActivityPage {
            activities,
            pagination: Pagination {
                page,
                limit,
                total: total as u64,
                pages,
            },
        })
    }

    async fn calculate_carbon_preview(
        &self,
        query: &PreviewQuery,
    ) -> Result<CarbonPreview, GatewayError> {
        let rx = {
            let mut state = self.state();
            state.preview_queries.push(query.clone());
            if state.fail_previews {
                return Err(GatewayError::from_status(500, "preview failed".into()));
            }
            if !state.hold_previews {
                return Ok(preview_for(query, 0.2));
            }
            let (tx, rx) = oneshot::channel();
            state.held.push(Some(tx));
            rx
        };
        rx.await
            .unwrap_or_else(|_| Err(GatewayError::from_status(500, "preview dropped".into())))
    }
}

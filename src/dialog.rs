//! The activity dialog: owns the draft, runs validation on submit, drives the
//! preview and submits through the gateway.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::gateway::{ActivityGateway, GatewayError};
use crate::model::{
    ActivityDraft, ActivityRecord, ActivityType, DraftError, FieldSpec, StoredActivity, Unit,
    ValidationResult, field, registry,
};
use crate::preview::{PreviewCoordinator, PreviewEvent, PreviewSettings, PreviewState};

/// Shown when a failed submission carries no message from the backend.
pub const SUBMIT_FALLBACK_MESSAGE: &str = "Failed to log activity. Please try again.";

/// Dialog lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogPhase {
    #[default]
    Closed,
    Open,
    /// A create or update request is in flight.
    Submitting,
}

/// Whether the dialog creates a new activity or edits a stored one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogMode {
    #[default]
    Create,
    Edit { id: String },
}

/// Notifications for the dialog's owner.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogAction {
    None,
    /// The dialog opened (`true`) or closed (`false`).
    OpenChanged(bool),
    /// The activity was stored; the dialog has closed.
    ActivitySaved(StoredActivity),
}

/// Events produced by the dialog's background work.
#[derive(Debug)]
pub enum DialogEvent {
    Preview(PreviewEvent),
    /// A submission finished. `session` identifies the dialog opening it
    /// belongs to.
    Submitted {
        session: u64,
        result: Result<StoredActivity, GatewayError>,
    },
}

type SubmitOutcome = (u64, Result<StoredActivity, GatewayError>);

/// Controller for the create/edit activity dialog.
pub struct ActivityDialog {
    gateway: Arc<dyn ActivityGateway>,
    phase: DialogPhase,
    mode: DialogMode,
    draft: ActivityDraft,
    errors: ValidationResult,
    submit_error: Option<String>,
    preview: PreviewCoordinator,
    /// Bumped on every open and close so late submission outcomes are ignored.
    session: u64,
    tx: UnboundedSender<SubmitOutcome>,
    rx: UnboundedReceiver<SubmitOutcome>,
}

impl ActivityDialog {
    pub fn new(gateway: Arc<dyn ActivityGateway>, settings: PreviewSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            preview: PreviewCoordinator::new(Arc::clone(&gateway), settings),
            gateway,
            phase: DialogPhase::Closed,
            mode: DialogMode::Create,
            draft: ActivityDraft::new(),
            errors: ValidationResult::default(),
            submit_error: None,
            session: 0,
            tx,
            rx,
        }
    }

    // --- lifecycle ---

    /// Opens the dialog with an empty draft.
    pub fn open_new(&mut self) -> DialogAction {
        self.start_session(DialogMode::Create, ActivityDraft::new())
    }

    /// Opens the dialog pre-filled from `activity`; submitting updates it.
    pub fn open_edit(&mut self, activity: &StoredActivity) -> DialogAction {
        self.start_session(
            DialogMode::Edit {
                id: activity.id.clone(),
            },
            ActivityDraft::from_stored(activity),
        )
    }

    fn start_session(&mut self, mode: DialogMode, draft: ActivityDraft) -> DialogAction {
        let was_open = self.is_open();
        self.clear();
        self.mode = mode;
        self.draft = draft;
        self.phase = DialogPhase::Open;
        self.refresh_preview();
        if was_open {
            DialogAction::None
        } else {
            DialogAction::OpenChanged(true)
        }
    }

    /// Closes the dialog, discarding the draft.
    pub fn close(&mut self) -> DialogAction {
        if self.phase == DialogPhase::Closed {
            return DialogAction::None;
        }
        if self.phase == DialogPhase::Submitting {
            debug!("dialog closed while a submission is in flight");
        }
        self.clear();
        self.phase = DialogPhase::Closed;
        DialogAction::OpenChanged(false)
    }

    fn clear(&mut self) {
        self.session += 1;
        self.mode = DialogMode::Create;
        self.draft = ActivityDraft::new();
        self.errors = ValidationResult::default();
        self.submit_error = None;
        self.preview.reset();
    }

    // --- accessors ---

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn mode(&self) -> &DialogMode {
        &self.mode
    }

    /// Returns `true` unless the dialog is closed.
    pub fn is_open(&self) -> bool {
        self.phase != DialogPhase::Closed
    }

    pub fn draft(&self) -> &ActivityDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn preview(&self) -> &PreviewState {
        self.preview.state()
    }

    /// Detail fields of the selected type, in display order.
    pub fn visible_detail_fields(&self) -> &'static [FieldSpec] {
        registry::detail_field_specs_for(self.draft.type_key())
    }

    /// Units offered for the selected type.
    pub fn units(&self) -> &'static [Unit] {
        registry::units_for(self.draft.type_key())
    }

    // --- edits ---

    fn editable(&self) -> bool {
        self.phase == DialogPhase::Open
    }

    pub fn set_activity_name(&mut self, name: &str) {
        if !self.editable() {
            return;
        }
        self.draft.activity_name = name.to_string();
        self.errors.clear_field(field::ACTIVITY_NAME);
    }

    pub fn set_description(&mut self, description: &str) {
        if !self.editable() {
            return;
        }
        self.draft.description = description.to_string();
        self.errors.clear_field(field::DESCRIPTION);
    }

    /// Selects the activity type. A change drops all detail values and the
    /// errors of fields the new type does not show.
    pub fn set_activity_type(&mut self, activity_type: Option<ActivityType>) {
        if !self.editable() {
            return;
        }
        if self.draft.set_activity_type(activity_type) {
            let details = self.visible_detail_fields();
            self.errors.retain(|key| {
                if key == field::ACTIVITY_TYPE {
                    activity_type.is_none()
                } else {
                    is_fixed_field(key) || details.iter().any(|spec| spec.key == key)
                }
            });
            self.refresh_preview();
        }
    }

    pub fn set_quantity_value(&mut self, value: Option<f64>) {
        if !self.editable() {
            return;
        }
        self.draft.quantity.value = value;
        self.errors.clear_field(field::QUANTITY);
        self.refresh_preview();
    }

    pub fn set_unit(&mut self, unit: &str) {
        if !self.editable() {
            return;
        }
        self.draft.quantity.unit = unit.to_string();
        self.errors.clear_field(field::UNIT);
        self.refresh_preview();
    }

    /// Sets a detail value of the selected type. An empty value clears it.
    pub fn set_detail(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        if !self.editable() {
            return Ok(());
        }
        self.draft.set_detail(key, value)?;
        self.errors.clear_field(key);
        self.refresh_preview();
        Ok(())
    }

    fn refresh_preview(&mut self) {
        self.preview.observe(self.draft.preview_input());
    }

    // --- submission ---

    /// Validates the draft and, when valid, starts the create or update
    /// request. An invalid draft only records its errors.
    pub fn submit(&mut self) {
        if !self.editable() {
            return;
        }
        self.submit_error = None;
        let record = match self.draft.to_record(Utc::now()) {
            Ok(record) => record,
            Err(errors) => {
                debug!(fields = ?errors.fields(), "activity draft is invalid");
                self.errors = errors;
                return;
            }
        };
        self.errors = ValidationResult::default();
        self.phase = DialogPhase::Submitting;
        self.spawn_submission(record);
    }

    fn spawn_submission(&self, record: ActivityRecord) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        let session = self.session;
        let mode = self.mode.clone();
        tokio::spawn(async move {
            let result = match &mode {
                DialogMode::Create => gateway.create_activity(&record).await,
                DialogMode::Edit { id } => gateway.update_activity(id, &record).await,
            };
            let _ = tx.send((session, result));
        });
    }

    // --- events ---

    /// Waits for the next preview or submission event.
    pub async fn next_event(&mut self) -> DialogEvent {
        tokio::select! {
            event = self.preview.next_event() => DialogEvent::Preview(event),
            Some((session, result)) = self.rx.recv() => DialogEvent::Submitted { session, result },
        }
    }

    pub fn apply(&mut self, event: DialogEvent) -> DialogAction {
        match event {
            DialogEvent::Preview(event) => {
                self.preview.apply(event);
                DialogAction::None
            }
            DialogEvent::Submitted { session, result } => self.on_submitted(session, result),
        }
    }

    fn on_submitted(
        &mut self,
        session: u64,
        result: Result<StoredActivity, GatewayError>,
    ) -> DialogAction {
        if session != self.session || self.phase != DialogPhase::Submitting {
            debug!(session, "ignoring submission outcome for a closed dialog");
            return DialogAction::None;
        }
        match result {
            Ok(stored) => {
                info!(id = %stored.id, name = %stored.activity_name, "activity saved");
                self.clear();
                self.phase = DialogPhase::Closed;
                DialogAction::ActivitySaved(stored)
            }
            Err(e) => {
                warn!(error = %e, "failed to save activity");
                self.phase = DialogPhase::Open;
                self.submit_error = Some(submission_message(&e));
                DialogAction::None
            }
        }
    }
}

fn is_fixed_field(key: &str) -> bool {
    [
        field::ACTIVITY_NAME,
        field::ACTIVITY_TYPE,
        field::DESCRIPTION,
        field::QUANTITY,
        field::UNIT,
    ]
    .contains(&key)
}

/// The message shown to the user for a failed submission.
fn submission_message(error: &GatewayError) -> String {
    match error {
        GatewayError::Rejected { message, .. } | GatewayError::Server { message, .. }
            if !message.trim().is_empty() =>
        {
            message.clone()
        }
        _ => SUBMIT_FALLBACK_MESSAGE.to_string(),
    }
}

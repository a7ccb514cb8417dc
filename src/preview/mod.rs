//! Live carbon-footprint preview.
//!
//! The coordinator debounces draft changes, issues one backend request per
//! quiet period and shows only the answer to the most recent request. Every
//! request carries a sequence id; a response whose id is no longer awaited is
//! dropped.

mod debounce;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::gateway::{ActivityGateway, GatewayError};
use crate::model::{CarbonPreview, PreviewInput, unit_label_from_calculation};

pub use debounce::Debouncer;

/// Default quiet period before a preview request is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// A settled preview, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewValue {
    pub emission_factor: f64,
    pub calculated_carbon_footprint: f64,
    /// Unit of the emission factor, e.g. `km`.
    pub unit_label: String,
}

/// What the preview card shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PreviewState {
    /// Nothing to show.
    #[default]
    Idle,
    /// A request is outstanding.
    Pending,
    /// The answer to the latest request.
    Settled(PreviewValue),
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("preview timed out after {0:?}")]
    TimedOut(Duration),
}

/// Timing knobs for the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSettings {
    pub debounce: Duration,
    /// Upper bound on a single request; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// Internal events the owner feeds back through [`PreviewCoordinator::apply`].
#[derive(Debug)]
pub enum PreviewEvent {
    /// A debounce timer ran out.
    Elapsed { generation: u64 },
    /// A backend request finished.
    Completed {
        sequence_id: u64,
        result: Result<CarbonPreview, PreviewError>,
    },
}

/// Drives the preview from draft snapshots.
///
/// The owner calls [`observe`](Self::observe) after every draft edit and
/// loops `apply(next_event().await)` alongside its other event sources.
pub struct PreviewCoordinator {
    gateway: Arc<dyn ActivityGateway>,
    settings: PreviewSettings,
    state: PreviewState,
    input: Option<PreviewInput>,
    debouncer: Debouncer,
    next_sequence: u64,
    awaited: Option<u64>,
    tx: UnboundedSender<PreviewEvent>,
    rx: UnboundedReceiver<PreviewEvent>,
}

impl PreviewCoordinator {
    pub fn new(gateway: Arc<dyn ActivityGateway>, settings: PreviewSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            settings,
            state: PreviewState::Idle,
            input: None,
            debouncer: Debouncer::new(),
            next_sequence: 0,
            awaited: None,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// Reacts to the current draft snapshot.
    ///
    /// `None` (type, value or unit missing) hides the preview at once and
    /// abandons any outstanding request. A changed snapshot restarts the
    /// debounce timer. An unchanged snapshot does nothing.
    pub fn observe(&mut self, input: Option<PreviewInput>) {
        if input == self.input {
            return;
        }
        self.input = input;
        self.awaited = None;
        if self.input.is_none() {
            self.debouncer.cancel();
            self.state = PreviewState::Idle;
            return;
        }
        if matches!(self.state, PreviewState::Settled(_)) {
            self.state = PreviewState::Idle;
        }
        let tx = self.tx.clone();
        self.debouncer.schedule(self.settings.debounce, move |generation| {
            let _ = tx.send(PreviewEvent::Elapsed { generation });
        });
    }

    /// Forgets the draft and returns to idle.
    pub fn reset(&mut self) {
        self.debouncer.cancel();
        self.input = None;
        self.awaited = None;
        self.state = PreviewState::Idle;
    }

    /// Waits for the next timer or response event.
    pub async fn next_event(&mut self) -> PreviewEvent {
        match self.rx.recv().await {
            Some(event) => event,
            // The coordinator holds a sender, so the channel never closes.
            None => std::future::pending().await,
        }
    }

    pub fn apply(&mut self, event: PreviewEvent) {
        match event {
            PreviewEvent::Elapsed { generation } => self.on_elapsed(generation),
            PreviewEvent::Completed {
                sequence_id,
                result,
            } => self.on_completed(sequence_id, result),
        }
    }

    fn on_elapsed(&mut self, generation: u64) {
        if !self.debouncer.settle(generation) {
            return;
        }
        let Some(input) = self.input.as_ref() else {
            return;
        };
        self.next_sequence += 1;
        let sequence_id = self.next_sequence;
        self.awaited = Some(sequence_id);
        self.state = PreviewState::Pending;
        debug!(sequence_id, activity_type = %input.activity_type, "requesting carbon preview");

        let query = input.to_query();
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        let timeout = self.settings.timeout;
        tokio::spawn(async move {
            let call = gateway.calculate_carbon_preview(&query);
            let result = match timeout {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(result) => result.map_err(PreviewError::from),
                    Err(_) => Err(PreviewError::TimedOut(limit)),
                },
                None => call.await.map_err(PreviewError::from),
            };
            let _ = tx.send(PreviewEvent::Completed {
                sequence_id,
                result,
            });
        });
    }

    fn on_completed(&mut self, sequence_id: u64, result: Result<CarbonPreview, PreviewError>) {
        if self.awaited != Some(sequence_id) {
            debug!(sequence_id, "discarding stale preview response");
            return;
        }
        self.awaited = None;
        self.state = match result {
            Ok(preview) => {
                let mut unit_label = unit_label_from_calculation(&preview.calculation.quantity);
                if unit_label.is_empty()
                    && let Some(input) = &self.input
                {
                    unit_label = input.quantity.unit.clone();
                }
                PreviewState::Settled(PreviewValue {
                    emission_factor: preview.emission_factor,
                    calculated_carbon_footprint: preview.calculated_carbon_footprint,
                    unit_label,
                })
            }
            Err(e) => {
                warn!(sequence_id, error = %e, "carbon preview failed");
                PreviewState::Idle
            }
        };
    }
}

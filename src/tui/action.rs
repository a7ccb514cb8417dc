//! Actions returned by screen event handlers.

use crate::model::ActivityFilters;

use super::app::Screen;

/// An action that a screen handler returns to the [`App`](super::App).
///
/// The `App` interprets these to start backend work and navigate between
/// screens.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No state change needed.
    None,
    /// Navigate to the given screen.
    Navigate(Screen),
    /// Open the dialog with an empty draft.
    NewActivity,
    /// Open the dialog on the listed activity at the given row.
    EditActivity(usize),
    /// Delete the activity with the given ID.
    DeleteActivity(String),
    /// Fetch the list page described by the filters.
    Load(ActivityFilters),
    /// The dialog stored an activity and closed.
    ActivitySaved,
    /// Quit the application.
    Quit,
}

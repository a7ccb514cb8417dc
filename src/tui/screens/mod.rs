//! TUI screen implementations.

pub mod activity_dialog;
pub mod activity_list;
pub mod help;

pub use activity_dialog::{ActivityDialogState, draw_activity_dialog};
pub use activity_list::{ActivityListState, draw_activity_list};
pub use help::{HelpState, draw_help};

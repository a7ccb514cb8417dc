//! Status bar widget: one-line summary of the listed activities.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::{ActivityType, format_carbon_footprint};

/// Data passed to the status bar widget; decoupled from the list state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusBarContext {
    /// Activities matching the current filter, across all pages.
    pub total_activities: u64,
    /// Current page (1-based); `0` before the first load.
    pub page: u32,
    /// Number of pages.
    pub pages: u32,
    /// Summed footprint of the activities on this page, in kg CO₂.
    pub page_carbon: f64,
    /// Active type filter.
    pub type_filter: Option<ActivityType>,
    /// A list request is in flight.
    pub loading: bool,
}

/// Renders a one-line status bar.
///
/// Display format (left-aligned, Cyan):
/// - `[Transport] 45 activities  page 1/3  page total: 12.40 kg CO₂`
/// - `0 activities` when nothing matches
/// - a trailing `loading…` (Yellow) while a request is in flight
#[mutants::skip]
pub fn draw_status_bar(ctx: &StatusBarContext, frame: &mut Frame, area: Rect) {
    let cyan = Style::default().fg(Color::Cyan);
    let yellow = Style::default().fg(Color::Yellow);

    let mut spans: Vec<Span> = Vec::new();

    if let Some(activity_type) = ctx.type_filter {
        spans.push(Span::styled(format!("[{}] ", activity_type.label()), cyan));
    }
    let noun = if ctx.total_activities == 1 {
        "activity"
    } else {
        "activities"
    };
    spans.push(Span::styled(
        format!("{} {noun}", ctx.total_activities),
        cyan,
    ));

    if ctx.total_activities > 0 {
        spans.push(Span::styled(
            format!("  page {}/{}", ctx.page, ctx.pages.max(1)),
            cyan,
        ));
        spans.push(Span::styled(
            format!("  page total: {}", format_carbon_footprint(ctx.page_carbon)),
            cyan,
        ));
    }

    if ctx.loading {
        spans.push(Span::styled("  loading…", yellow));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

//! Activity list screen: a paged table of stored activities.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};

use crate::model::{
    ActivityFilters, ActivityPage, ActivityType, Pagination, StoredActivity,
    calculate_total_carbon, format_carbon_footprint, format_date, format_quantity,
};
use crate::tui::action::Action;
use crate::tui::widgets::{StatusBarContext, draw_status_bar};

/// State for the activity list screen.
#[derive(Debug, Clone)]
pub struct ActivityListState {
    /// The most recently loaded page.
    page: ActivityPage,
    /// Filters of the page being shown or requested.
    filters: ActivityFilters,
    /// Index of the highlighted row.
    selected: usize,
    loading: bool,
    /// Error message from the last failed operation.
    error: Option<String>,
    /// ID of the activity awaiting delete confirmation.
    pending_delete: Option<String>,
}

impl ActivityListState {
    /// Creates an empty state requesting pages of `page_size` activities.
    pub fn new(page_size: u32) -> Self {
        Self {
            page: ActivityPage::default(),
            filters: ActivityFilters {
                page: Some(1),
                limit: Some(page_size),
                ..Default::default()
            },
            selected: 0,
            loading: false,
            error: None,
            pending_delete: None,
        }
    }

    /// Handles a key event, returning an [`Action`] for the app to apply.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if let Some(id) = self.pending_delete.take() {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Action::DeleteActivity(id),
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                Action::None
            }
            KeyCode::Down => {
                let count = self.page.activities.len();
                if count > 0 {
                    self.selected = (self.selected + 1).min(count - 1);
                }
                Action::None
            }
            KeyCode::Home => {
                self.selected = 0;
                Action::None
            }
            KeyCode::End => {
                self.selected = self.page.activities.len().saturating_sub(1);
                Action::None
            }
            KeyCode::Enter => match self.selected_activity() {
                Some(_) => Action::EditActivity(self.selected),
                None => Action::None,
            },
            KeyCode::Char('n') => Action::NewActivity,
            KeyCode::Char('d') => {
                self.pending_delete = self.selected_activity().map(|a| a.id.clone());
                Action::None
            }
            KeyCode::Char('t') => {
                self.filters.activity_type = next_type_filter(self.filters.activity_type);
                self.go_to_page(1)
            }
            KeyCode::PageDown | KeyCode::Right => {
                if self.page.has_next() {
                    self.go_to_page(self.current_page() + 1)
                } else {
                    Action::None
                }
            }
            KeyCode::PageUp | KeyCode::Left => {
                if self.current_page() > 1 {
                    self.go_to_page(self.current_page() - 1)
                } else {
                    Action::None
                }
            }
            KeyCode::Char('r') => self.load(),
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            _ => Action::None,
        }
    }

    /// Returns the action that fetches the page for the current filters.
    pub fn load(&self) -> Action {
        Action::Load(self.filters.clone())
    }

    /// Switches to page `page` and returns the action that fetches it.
    pub fn go_to_page(&mut self, page: u32) -> Action {
        self.filters.page = Some(page.max(1));
        self.selected = 0;
        self.load()
    }

    fn current_page(&self) -> u32 {
        self.filters.page.unwrap_or(1)
    }

    /// Marks a list request as in flight.
    pub fn set_loading(&mut self) {
        self.loading = true;
    }

    /// Shows a freshly loaded page.
    pub fn set_page(&mut self, page: ActivityPage) {
        self.selected = self
            .selected
            .min(page.activities.len().saturating_sub(1));
        self.page = page;
        self.loading = false;
        self.error = None;
    }

    /// Sets an error message to display on this screen.
    pub fn set_error(&mut self, msg: String) {
        self.loading = false;
        self.error = Some(msg);
    }

    /// Returns the filters of the current page.
    pub fn filters(&self) -> &ActivityFilters {
        &self.filters
    }

    /// Returns the listed activities.
    pub fn activities(&self) -> &[StoredActivity] {
        &self.page.activities
    }

    /// Returns the listed activity at `index`.
    pub fn activity(&self, index: usize) -> Option<&StoredActivity> {
        self.page.activities.get(index)
    }

    pub fn pagination(&self) -> Pagination {
        self.page.pagination
    }

    /// Returns the highlighted row index.
    pub fn selected(&self) -> usize {
        self.selected
    }

    fn selected_activity(&self) -> Option<&StoredActivity> {
        self.activity(self.selected)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns the current error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the ID awaiting delete confirmation, if any.
    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Summed footprint of the listed activities.
    pub fn page_carbon(&self) -> f64 {
        calculate_total_carbon(&self.page.activities)
    }

    fn status_context(&self) -> StatusBarContext {
        StatusBarContext {
            total_activities: self.page.pagination.total,
            page: self.page.pagination.page,
            pages: self.page.pagination.pages,
            page_carbon: self.page_carbon(),
            type_filter: self.filters.activity_type,
            loading: self.loading,
        }
    }
}

/// Cycles all types, then back to no filter.
fn next_type_filter(current: Option<ActivityType>) -> Option<ActivityType> {
    let all = ActivityType::all();
    match current {
        None => all.first().copied(),
        Some(t) => all
            .iter()
            .position(|&x| x == t)
            .and_then(|i| all.get(i + 1))
            .copied(),
    }
}

/// Renders the activity list screen.
#[mutants::skip]
pub fn draw_activity_list(state: &ActivityListState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" ecolog – Activities ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [status_area, table_area, message_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    draw_status_bar(&state.status_context(), frame, status_area);

    if state.activities().is_empty() {
        let text = if state.is_loading() {
            "Loading activities…"
        } else {
            "No activities logged yet. Press 'n' to log one."
        };
        let lines = vec![Line::from(""), Line::from(text)];
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            table_area,
        );
    } else {
        let header = Row::new(vec!["Date", "Activity", "Type", "Quantity", "CO₂"])
            .style(Style::default().add_modifier(Modifier::BOLD))
            .bottom_margin(1);

        let rows: Vec<Row> = state
            .activities()
            .iter()
            .enumerate()
            .map(|(i, activity)| {
                let style = if i == state.selected() {
                    Style::default().fg(Color::Black).bg(Color::Yellow)
                } else {
                    Style::default()
                };
                let footprint = activity
                    .carbon_footprint
                    .map(format_carbon_footprint)
                    .unwrap_or_else(|| "-".to_string());
                Row::new(vec![
                    format_date(activity.date),
                    activity.activity_name.clone(),
                    activity.activity_type.label().to_string(),
                    format_quantity(&activity.quantity),
                    footprint,
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(22),
            Constraint::Min(12),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(16),
        ];

        let table = Table::new(rows, widths).header(header);
        frame.render_widget(table, table_area);
    }

    let message = if state.pending_delete().is_some() {
        Some(Paragraph::new("Delete this activity? (y/n)").style(Style::default().fg(Color::Yellow)))
    } else {
        state
            .error()
            .map(|err| Paragraph::new(err.to_string()).style(Style::default().fg(Color::Red)))
    };
    if let Some(message) = message {
        frame.render_widget(message, message_area);
    }

    let footer = Paragraph::new(
        "n: new  Enter: edit  d: delete  t: type filter  ←/→: page  r: refresh  F1: help  q: quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, footer_area);
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    use super::*;
    use crate::model::Quantity;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn make_activity(id: &str, name: &str, footprint: Option<f64>) -> StoredActivity {
        StoredActivity {
            id: id.to_string(),
            activity_name: name.to_string(),
            activity_type: ActivityType::Transport,
            description: String::new(),
            quantity: Quantity {
                value: 12.0,
                unit: "km".into(),
            },
            activity_details: BTreeMap::new(),
            date: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
            carbon_footprint: footprint,
            emission_factor: None,
            created_at: None,
        }
    }

    fn make_page(n: usize, page: u32, pages: u32) -> ActivityPage {
        ActivityPage {
            activities: (0..n)
                .map(|i| make_activity(&format!("id-{i}"), &format!("Trip {i}"), Some(1.5)))
                .collect(),
            pagination: Pagination {
                page,
                limit: 20,
                total: (pages as u64) * 20,
                pages,
            },
        }
    }

    fn loaded(n: usize, page: u32, pages: u32) -> ActivityListState {
        let mut state = ActivityListState::new(20);
        state.set_page(make_page(n, page, pages));
        state
    }

    mod construction {
        use super::*;

        #[test]
        fn new_requests_first_page() {
            let state = ActivityListState::new(20);
            assert_eq!(state.filters().page, Some(1));
            assert_eq!(state.filters().limit, Some(20));
            assert!(state.activities().is_empty());
            assert!(!state.is_loading());
        }
    }

    mod navigation {
        use super::*;

        #[test]
        fn down_stops_at_last_row() {
            let mut state = loaded(2, 1, 1);
            state.handle_key(press(KeyCode::Down));
            state.handle_key(press(KeyCode::Down));
            assert_eq!(state.selected(), 1);
        }

        #[test]
        fn up_saturates() {
            let mut state = loaded(2, 1, 1);
            state.handle_key(press(KeyCode::Up));
            assert_eq!(state.selected(), 0);
        }

        #[test]
        fn home_and_end() {
            let mut state = loaded(5, 1, 1);
            state.handle_key(press(KeyCode::End));
            assert_eq!(state.selected(), 4);
            state.handle_key(press(KeyCode::Home));
            assert_eq!(state.selected(), 0);
        }

        #[test]
        fn smaller_page_clamps_selection() {
            let mut state = loaded(5, 1, 1);
            state.handle_key(press(KeyCode::End));
            state.set_page(make_page(2, 1, 1));
            assert_eq!(state.selected(), 1);
        }
    }

    mod actions {
        use super::*;

        #[test]
        fn enter_edits_selected_row() {
            let mut state = loaded(3, 1, 1);
            state.handle_key(press(KeyCode::Down));
            assert_eq!(
                state.handle_key(press(KeyCode::Enter)),
                Action::EditActivity(1)
            );
        }

        #[test]
        fn enter_on_empty_list_is_noop() {
            let mut state = ActivityListState::new(20);
            assert_eq!(state.handle_key(press(KeyCode::Enter)), Action::None);
        }

        #[test]
        fn n_opens_new_activity() {
            let mut state = ActivityListState::new(20);
            assert_eq!(
                state.handle_key(press(KeyCode::Char('n'))),
                Action::NewActivity
            );
        }

        #[test]
        fn q_and_esc_quit() {
            let mut state = ActivityListState::new(20);
            assert_eq!(state.handle_key(press(KeyCode::Char('q'))), Action::Quit);
            assert_eq!(state.handle_key(press(KeyCode::Esc)), Action::Quit);
        }

        #[test]
        fn r_reloads_current_filters() {
            let mut state = ActivityListState::new(20);
            let action = state.handle_key(press(KeyCode::Char('r')));
            assert_eq!(action, Action::Load(state.filters().clone()));
        }
    }

    mod delete {
        use super::*;

        #[test]
        fn d_then_y_deletes_selected() {
            let mut state = loaded(2, 1, 1);
            state.handle_key(press(KeyCode::Down));
            assert_eq!(state.handle_key(press(KeyCode::Char('d'))), Action::None);
            assert_eq!(state.pending_delete(), Some("id-1"));
            assert_eq!(
                state.handle_key(press(KeyCode::Char('y'))),
                Action::DeleteActivity("id-1".into())
            );
            assert_eq!(state.pending_delete(), None);
        }

        #[test]
        fn any_other_key_cancels() {
            let mut state = loaded(2, 1, 1);
            state.handle_key(press(KeyCode::Char('d')));
            assert_eq!(state.handle_key(press(KeyCode::Char('q'))), Action::None);
            assert_eq!(state.pending_delete(), None);
        }

        #[test]
        fn d_on_empty_list_asks_nothing() {
            let mut state = ActivityListState::new(20);
            state.handle_key(press(KeyCode::Char('d')));
            assert_eq!(state.pending_delete(), None);
        }
    }

    mod filtering_and_paging {
        use super::*;

        #[test]
        fn t_cycles_type_filter_and_resets_page() {
            let mut state = loaded(20, 2, 3);
            state.filters.page = Some(2);

            let action = state.handle_key(press(KeyCode::Char('t')));
            assert_eq!(state.filters().activity_type, Some(ActivityType::Transport));
            assert_eq!(state.filters().page, Some(1));
            assert_eq!(action, Action::Load(state.filters().clone()));

            for _ in 0..4 {
                state.handle_key(press(KeyCode::Char('t')));
            }
            assert_eq!(state.filters().activity_type, Some(ActivityType::Other));
            state.handle_key(press(KeyCode::Char('t')));
            assert_eq!(state.filters().activity_type, None);
        }

        #[test]
        fn page_down_only_when_next_exists() {
            let mut state = loaded(20, 1, 2);
            let action = state.handle_key(press(KeyCode::PageDown));
            assert_eq!(state.filters().page, Some(2));
            assert!(matches!(action, Action::Load(ref f) if f.page == Some(2)));

            state.set_page(make_page(20, 2, 2));
            assert_eq!(state.handle_key(press(KeyCode::PageDown)), Action::None);
            assert_eq!(state.filters().page, Some(2));
        }

        #[test]
        fn page_up_stops_at_first() {
            let mut state = loaded(20, 1, 2);
            assert_eq!(state.handle_key(press(KeyCode::PageUp)), Action::None);

            state.filters.page = Some(2);
            let action = state.handle_key(press(KeyCode::Left));
            assert!(matches!(action, Action::Load(ref f) if f.page == Some(1)));
        }

        #[test]
        fn go_to_page_resets_selection_and_floors_at_one() {
            let mut state = loaded(5, 1, 1);
            state.handle_key(press(KeyCode::End));
            let action = state.go_to_page(0);
            assert_eq!(state.selected(), 0);
            assert!(matches!(action, Action::Load(ref f) if f.page == Some(1)));
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn set_page_clears_loading_and_error() {
            let mut state = ActivityListState::new(20);
            state.set_loading();
            state.set_error("boom".into());
            assert!(!state.is_loading());
            state.set_loading();
            state.set_page(make_page(1, 1, 1));
            assert!(!state.is_loading());
            assert_eq!(state.error(), None);
        }

        #[test]
        fn page_carbon_sums_listed_footprints() {
            let state = loaded(4, 1, 1);
            assert_eq!(state.page_carbon(), 6.0);
        }
    }

    mod rendering {
        use ratatui::Terminal;
        use ratatui::backend::TestBackend;

        use super::*;

        fn buffer_to_string(buf: &ratatui::buffer::Buffer) -> String {
            let mut s = String::new();
            for y in 0..buf.area.height {
                for x in 0..buf.area.width {
                    s.push(buf[(x, y)].symbol().chars().next().unwrap_or(' '));
                }
                s.push('\n');
            }
            s
        }

        fn render(state: &ActivityListState) -> String {
            let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
            terminal
                .draw(|frame| draw_activity_list(state, frame, frame.area()))
                .unwrap();
            buffer_to_string(terminal.backend().buffer())
        }

        #[test]
        fn empty_list_prompts_for_new_activity() {
            let output = render(&ActivityListState::new(20));
            assert!(output.contains("No activities logged yet"));
        }

        #[test]
        fn rows_show_name_quantity_and_footprint() {
            let mut state = ActivityListState::new(20);
            state.set_page(ActivityPage {
                activities: vec![make_activity("a", "Commute", Some(2.304))],
                pagination: Pagination {
                    page: 1,
                    limit: 20,
                    total: 1,
                    pages: 1,
                },
            });
            let output = render(&state);
            assert!(output.contains("Commute"));
            assert!(output.contains("12km"));
            assert!(output.contains("2.30 kg"));
            assert!(output.contains("Oct 18, 2026"));
        }

        #[test]
        fn missing_footprint_renders_dash() {
            let mut state = ActivityListState::new(20);
            state.set_page(ActivityPage {
                activities: vec![make_activity("a", "Pending", None)],
                pagination: Pagination {
                    page: 1,
                    limit: 20,
                    total: 1,
                    pages: 1,
                },
            });
            let output = render(&state);
            assert!(output.contains("Pending"));
        }

        #[test]
        fn delete_prompt_is_shown() {
            let mut state = loaded(1, 1, 1);
            state.handle_key(press(KeyCode::Char('d')));
            let output = render(&state);
            assert!(output.contains("Delete this activity? (y/n)"));
        }
    }
}

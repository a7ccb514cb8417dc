//! Activity dialog screen: the create/edit form with its live preview card.
//!
//! The form is rebuilt from the registry whenever the activity type changes:
//! five fixed fields, then one select field per detail field of the type.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing::warn;

use crate::dialog::{ActivityDialog, DialogAction, DialogEvent, DialogMode, DialogPhase};
use crate::gateway::ActivityGateway;
use crate::model::{
    ActivityDraft, ActivityType, FieldSpec, StoredActivity, Unit, field, format_carbon_footprint,
    format_date, format_emission_factor, parse_quantity_value,
};
use crate::preview::{PreviewSettings, PreviewState};
use crate::tui::action::Action;
use crate::tui::app::Screen;
use crate::tui::widgets::form::{FIELD_HEIGHT, Form, FormField, SelectOption, draw_form};

/// Field index for the activity name.
const NAME: usize = 0;
/// Field index for the activity type selector.
const TYPE: usize = 1;
/// Field index for the description.
const DESCRIPTION: usize = 2;
/// Field index for the quantity value.
const QUANTITY: usize = 3;
/// Field index for the unit selector; detail fields follow it.
const UNIT: usize = 4;

/// State for the activity dialog screen.
pub struct ActivityDialogState {
    dialog: ActivityDialog,
    form: Form,
}

impl ActivityDialogState {
    pub fn new(gateway: Arc<dyn ActivityGateway>, settings: PreviewSettings) -> Self {
        let mut state = Self {
            dialog: ActivityDialog::new(gateway, settings),
            form: Form::default(),
        };
        state.rebuild_form();
        state
    }

    /// Opens the dialog for a new activity.
    pub fn open_new(&mut self) -> Action {
        let action = self.dialog.open_new();
        self.rebuild_form();
        to_action(action)
    }

    /// Opens the dialog to edit `activity`.
    pub fn open_edit(&mut self, activity: &StoredActivity) -> Action {
        let action = self.dialog.open_edit(activity);
        self.rebuild_form();
        to_action(action)
    }

    /// Returns the dialog controller.
    pub fn dialog(&self) -> &ActivityDialog {
        &self.dialog
    }

    /// Returns a reference to the form for rendering.
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Handles a key event, returning an [`Action`] for the app to apply.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if self.dialog.phase() == DialogPhase::Submitting {
            return match key.code {
                KeyCode::Esc => self.close(),
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Tab => {
                self.form.focus_next();
                Action::None
            }
            KeyCode::BackTab => {
                self.form.focus_prev();
                Action::None
            }
            KeyCode::Esc => self.close(),
            KeyCode::Enter => {
                self.dialog.submit();
                self.sync_errors();
                Action::None
            }
            KeyCode::Left | KeyCode::Right => {
                if self.form.cycle_option(key.code == KeyCode::Right) {
                    self.push_focused();
                }
                Action::None
            }
            KeyCode::Backspace => {
                if self.form.delete_char() {
                    self.push_focused();
                }
                Action::None
            }
            KeyCode::Char(ch) => {
                if self.form.insert_char(ch) {
                    self.push_focused();
                }
                Action::None
            }
            _ => Action::None,
        }
    }

    fn close(&mut self) -> Action {
        let action = self.dialog.close();
        self.rebuild_form();
        to_action(action)
    }

    /// Waits for the dialog's next background event.
    pub async fn next_event(&mut self) -> DialogEvent {
        self.dialog.next_event().await
    }

    /// Applies a background event, returning an [`Action`] for the app to apply.
    pub fn apply(&mut self, event: DialogEvent) -> Action {
        let action = self.dialog.apply(event);
        if matches!(action, DialogAction::ActivitySaved(_)) {
            self.rebuild_form();
        }
        to_action(action)
    }

    /// Copies the focused field's value into the draft.
    fn push_focused(&mut self) {
        let index = self.form.focus();
        let Some(focused) = self.form.focused() else {
            return;
        };
        let key = focused.key.clone();
        let value = focused.value.clone();
        match index {
            NAME => self.dialog.set_activity_name(&value),
            TYPE => {
                self.dialog
                    .set_activity_type(ActivityType::from_key(&value));
                self.rebuild_type_fields();
            }
            DESCRIPTION => self.dialog.set_description(&value),
            QUANTITY => self.dialog.set_quantity_value(parse_quantity_value(&value)),
            UNIT => self.dialog.set_unit(&value),
            _ => {
                if let Err(e) = self.dialog.set_detail(&key, &value) {
                    warn!(error = %e, "detail edit rejected");
                }
            }
        }
        self.sync_errors();
    }

    fn rebuild_form(&mut self) {
        let draft = self.dialog.draft();
        let quantity = draft
            .quantity
            .value
            .map(|v| v.to_string())
            .unwrap_or_default();
        self.form = Form::new(vec![
            FormField::text(field::ACTIVITY_NAME, "Activity Name", true)
                .with_value(draft.activity_name.as_str()),
            FormField::select(field::ACTIVITY_TYPE, "Activity Type", true, type_options())
                .with_value(draft.type_key()),
            FormField::text(field::DESCRIPTION, "Description", true)
                .with_value(draft.description.as_str()),
            FormField::number(field::QUANTITY, "Quantity", true).with_value(quantity),
        ]);
        self.rebuild_type_fields();
    }

    /// Replaces the unit selector and the detail fields to match the draft's type.
    fn rebuild_type_fields(&mut self) {
        let draft = self.dialog.draft();
        let mut fields = vec![
            FormField::select(field::UNIT, "Unit", true, unit_options(self.dialog.units()))
                .with_value(draft.quantity.unit.as_str()),
        ];
        fields.extend(
            self.dialog
                .visible_detail_fields()
                .iter()
                .map(|spec| detail_field(spec, draft)),
        );
        self.form.replace_from(UNIT, fields);
        self.sync_errors();
    }

    fn sync_errors(&mut self) {
        self.form.clear_errors();
        for (key, error) in self.dialog.errors().errors() {
            self.form.set_error_for(key, error.to_string());
        }
    }
}

fn to_action(action: DialogAction) -> Action {
    match action {
        DialogAction::None => Action::None,
        DialogAction::OpenChanged(true) => Action::Navigate(Screen::ActivityDialog),
        DialogAction::OpenChanged(false) => Action::Navigate(Screen::ActivityList),
        DialogAction::ActivitySaved(_) => Action::ActivitySaved,
    }
}

fn type_options() -> Vec<SelectOption> {
    ActivityType::all()
        .iter()
        .map(|t| SelectOption::new(t.key(), t.label()))
        .collect()
}

fn unit_options(units: &[Unit]) -> Vec<SelectOption> {
    units
        .iter()
        .map(|u| SelectOption::new(u.value, u.label))
        .collect()
}

fn detail_field(spec: &FieldSpec, draft: &ActivityDraft) -> FormField {
    let options = spec
        .options()
        .iter()
        .map(|o| SelectOption::new(o.value, o.label).with_intensity(o.intensity))
        .collect();
    FormField::select(spec.key, spec.label, spec.required, options)
        .with_value(draft.detail(spec.key).unwrap_or(""))
}

fn preview_lines(preview: &PreviewState) -> Vec<Line<'static>> {
    match preview {
        PreviewState::Idle => Vec::new(),
        PreviewState::Pending => vec![Line::from(Span::styled(
            "Calculating…",
            Style::default().fg(Color::Yellow),
        ))],
        PreviewState::Settled(value) => vec![
            Line::from(vec![
                Span::raw("Estimated footprint: "),
                Span::styled(
                    format_carbon_footprint(value.calculated_carbon_footprint),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!(
                    "Emission factor: {}",
                    format_emission_factor(value.emission_factor, &value.unit_label)
                ),
                Style::default().fg(Color::DarkGray),
            )),
        ],
    }
}

/// Renders the dialog as a centred popup over `area`.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_activity_dialog(
    state: &ActivityDialogState,
    now: DateTime<Utc>,
    frame: &mut Frame,
    area: Rect,
) {
    let dialog = state.dialog();
    let form = state.form();

    let form_height = form.fields().len() as u16 * FIELD_HEIGHT;
    let height = (form_height + 2 + 2 + 1 + 1 + 1 + 2).min(area.height);
    let width = area.width.min(72);

    let [popup] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(popup);

    let mut title = match dialog.mode() {
        DialogMode::Create => " Log Activity ".to_string(),
        DialogMode::Edit { .. } => " Edit Activity ".to_string(),
    };
    if dialog.phase() == DialogPhase::Submitting {
        title.push_str("(saving…) ");
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, popup);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [form_area, preview_area, logged_area, error_area, footer_area] = Layout::vertical([
        Constraint::Length(form_height),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    draw_form(form, frame, form_area);

    frame.render_widget(Paragraph::new(preview_lines(dialog.preview())), preview_area);

    let logged_at = Paragraph::new(format!(
        "Activity will be logged at: {}",
        format_date(now)
    ))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(logged_at, logged_area);

    let error_line = match dialog.submit_error() {
        Some(err) => Some(err),
        None if form.has_errors() => Some("Fix the highlighted fields to continue."),
        None => None,
    };
    if let Some(err) = error_line {
        let err_paragraph = Paragraph::new(Span::styled(err, Style::default().fg(Color::Red)));
        frame.render_widget(err_paragraph, error_area);
    }

    let footer = Paragraph::new("Tab: next  ←/→: choose  Enter: save  Esc: cancel  F1: help")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, footer_area);
}

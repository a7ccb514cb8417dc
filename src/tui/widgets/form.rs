//! Reusable form widget: text, numeric and select fields with focus management.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::EmissionIntensity;

/// One choice of a select field.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    /// Emission tier shown as a coloured badge.
    pub intensity: Option<EmissionIntensity>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            intensity: None,
        }
    }

    pub fn with_intensity(mut self, intensity: EmissionIntensity) -> Self {
        self.intensity = Some(intensity);
        self
    }
}

/// How a field accepts input.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Digits, one decimal point and a leading minus sign.
    Number,
    /// One of a fixed list, cycled with ←/→. An empty value means unselected.
    Select(Vec<SelectOption>),
}

/// A single field within a [`Form`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    /// Stable identifier, e.g. `activityName` or `transportMode`.
    pub key: String,
    /// Display label shown in the field border.
    pub label: String,
    /// Current value; for select fields, the selected option's value.
    pub value: String,
    /// Validation error message, if any.
    pub error: Option<String>,
    /// Whether the field is marked as required.
    pub required: bool,
    pub kind: FieldKind,
}

impl FormField {
    /// Creates an empty text field.
    pub fn text(key: impl Into<String>, label: impl Into<String>, required: bool) -> Self {
        Self::with_kind(key, label, required, FieldKind::Text)
    }

    /// Creates an empty numeric field.
    pub fn number(key: impl Into<String>, label: impl Into<String>, required: bool) -> Self {
        Self::with_kind(key, label, required, FieldKind::Number)
    }

    /// Creates an unselected select field.
    pub fn select(
        key: impl Into<String>,
        label: impl Into<String>,
        required: bool,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::with_kind(key, label, required, FieldKind::Select(options))
    }

    fn with_kind(
        key: impl Into<String>,
        label: impl Into<String>,
        required: bool,
        kind: FieldKind,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            value: String::new(),
            error: None,
            required,
            kind,
        }
    }

    /// Sets the initial value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Returns the option matching the current value of a select field.
    pub fn selected_option(&self) -> Option<&SelectOption> {
        match &self.kind {
            FieldKind::Select(options) => options.iter().find(|o| o.value == self.value),
            _ => None,
        }
    }

    fn accepts(&self, ch: char) -> bool {
        match self.kind {
            FieldKind::Text => true,
            FieldKind::Number => {
                ch.is_ascii_digit()
                    || (ch == '.' && !self.value.contains('.'))
                    || (ch == '-' && self.value.is_empty())
            }
            FieldKind::Select(_) => false,
        }
    }
}

/// A multi-field form with focus management.
#[derive(Debug, Clone, Default)]
pub struct Form {
    fields: Vec<FormField>,
    focus: usize,
}

impl Form {
    /// Creates a new form with the given fields. Focus starts on the first field.
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields, focus: 0 }
    }

    /// Returns the index of the currently focused field.
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Moves focus to `index`, if it exists.
    pub fn set_focus(&mut self, index: usize) {
        if index < self.fields.len() {
            self.focus = index;
        }
    }

    /// Returns the focused field.
    pub fn focused(&self) -> Option<&FormField> {
        self.fields.get(self.focus)
    }

    /// Moves focus to the next field, wrapping around.
    pub fn focus_next(&mut self) {
        if self.fields.is_empty() {
            return;
        }
        self.focus = (self.focus + 1) % self.fields.len();
    }

    /// Moves focus to the previous field, wrapping around.
    pub fn focus_prev(&mut self) {
        if self.fields.is_empty() {
            return;
        }
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    /// Appends a character to the focused field. Returns `true` if it was accepted.
    pub fn insert_char(&mut self, ch: char) -> bool {
        match self.fields.get_mut(self.focus) {
            Some(field) if field.accepts(ch) => {
                field.value.push(ch);
                true
            }
            _ => false,
        }
    }

    /// Deletes the last character of the focused field, or unselects a select
    /// field. Returns `true` if the value changed.
    pub fn delete_char(&mut self) -> bool {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return false;
        };
        if matches!(field.kind, FieldKind::Select(_)) {
            let changed = !field.value.is_empty();
            field.value.clear();
            return changed;
        }
        field.value.pop().is_some()
    }

    /// Selects the next (or previous) option of the focused select field,
    /// wrapping around. Returns `true` if the value changed.
    pub fn cycle_option(&mut self, forward: bool) -> bool {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return false;
        };
        let FieldKind::Select(options) = &field.kind else {
            return false;
        };
        if options.is_empty() {
            return false;
        }
        let len = options.len();
        let next = match options.iter().position(|o| o.value == field.value) {
            Some(pos) if forward => (pos + 1) % len,
            Some(pos) => (pos + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        let value = options[next].value.clone();
        let changed = value != field.value;
        field.value = value;
        changed
    }

    /// Returns the index of the field with `key`.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.key == key)
    }

    /// Sets an error message on a field by index.
    pub fn set_error(&mut self, index: usize, error: String) {
        if let Some(field) = self.fields.get_mut(index) {
            field.error = Some(error);
        }
    }

    /// Sets an error message on the field with `key`. Returns `false` if no
    /// such field is shown.
    pub fn set_error_for(&mut self, key: &str, error: String) -> bool {
        match self.index_of(key) {
            Some(index) => {
                self.set_error(index, error);
                true
            }
            None => false,
        }
    }

    /// Clears all field errors.
    pub fn clear_errors(&mut self) {
        for field in &mut self.fields {
            field.error = None;
        }
    }

    /// Returns `true` if any field has an error set.
    pub fn has_errors(&self) -> bool {
        self.fields.iter().any(|f| f.error.is_some())
    }

    /// Returns the value of the field at `index`, or an empty string if out of bounds.
    pub fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    /// Replaces every field from `index` on with `fields`, keeping focus in range.
    pub fn replace_from(&mut self, index: usize, fields: Vec<FormField>) {
        self.fields.truncate(index);
        self.fields.extend(fields);
        if self.focus >= self.fields.len() {
            self.focus = self.fields.len().saturating_sub(1);
        }
    }

    /// Returns a reference to the fields.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }
}

fn intensity_color(intensity: EmissionIntensity) -> Color {
    let (r, g, b) = intensity.rgb();
    Color::Rgb(r, g, b)
}

fn select_spans(field: &FormField, is_focused: bool) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    if is_focused {
        spans.push(Span::styled("◀ ", Style::default().fg(Color::Yellow)));
    }
    match field.selected_option() {
        Some(option) => {
            if let Some(intensity) = option.intensity {
                spans.push(Span::styled(
                    "● ",
                    Style::default().fg(intensity_color(intensity)),
                ));
            }
            spans.push(Span::raw(option.label.as_str()));
            if let Some(intensity) = option.intensity {
                spans.push(Span::styled(
                    format!("  [{intensity}]"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
        None => spans.push(Span::styled(
            "(select)",
            Style::default().fg(Color::DarkGray),
        )),
    }
    if is_focused {
        spans.push(Span::styled(" ▶", Style::default().fg(Color::Yellow)));
    }
    spans
}

/// Height of one field row.
pub const FIELD_HEIGHT: u16 = 3;

/// Renders a form within the given area.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_form(form: &Form, frame: &mut Frame, area: Rect) {
    let constraints: Vec<Constraint> = form
        .fields
        .iter()
        .map(|_| Constraint::Length(FIELD_HEIGHT))
        .collect();

    let rows = Layout::vertical(constraints).split(area);

    for (i, field) in form.fields.iter().enumerate() {
        let is_focused = i == form.focus;

        let border_color = if field.error.is_some() {
            Color::Red
        } else if is_focused {
            Color::Yellow
        } else {
            Color::DarkGray
        };

        let label = if field.required {
            format!("{} *", field.label)
        } else {
            field.label.clone()
        };

        let block = Block::default()
            .title(label)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));

        let spans = match field.kind {
            FieldKind::Select(_) => select_spans(field, is_focused),
            FieldKind::Text | FieldKind::Number => {
                let mut spans = vec![Span::raw(field.value.as_str())];
                if is_focused {
                    spans.push(Span::styled(
                        "\u{2588}",
                        Style::default().add_modifier(Modifier::SLOW_BLINK),
                    ));
                }
                spans
            }
        };

        let paragraph = Paragraph::new(Line::from(spans)).block(block);
        frame.render_widget(paragraph, rows[i]);

        // Error overlaps the bottom border of the field
        if let Some(ref err) = field.error {
            let error_line = Paragraph::new(Span::styled(err, Style::default().fg(Color::Red)));
            let err_area = Rect {
                x: rows[i].x + 2,
                y: rows[i].y + FIELD_HEIGHT.saturating_sub(1),
                width: rows[i].width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(error_line, err_area);
        }
    }
}

//! Form field component for user input

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::company_tui::ui::Styles;
use crate::form::validation;

/// Type of form field
#[derive(Debug, Clone, PartialEq)]
pub enum FormFieldType {
    Text,
    Email,
    Phone,
    Dropdown,
    ReadOnly,
}

/// Individual form field
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: String,
    pub value: String,
    pub placeholder: String,
    pub field_type: FormFieldType,
    pub is_focused: bool,
    /// Cursor position in characters, not bytes
    pub cursor_position: usize,
    pub validation_error: Option<String>,
    pub link: Option<String>,
}

impl FormField {
    pub fn new(label: &str, field_type: FormFieldType) -> Self {
        Self {
            label: label.to_string(),
            value: String::new(),
            placeholder: String::new(),
            field_type,
            is_focused: false,
            cursor_position: 0,
            validation_error: None,
            link: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self.cursor_position = value.chars().count();
        self
    }

    pub fn with_link(mut self, link: String) -> Self {
        self.link = Some(link);
        self
    }

    pub fn is_editable(&self) -> bool {
        !matches!(self.field_type, FormFieldType::Dropdown | FormFieldType::ReadOnly)
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.value
            .char_indices()
            .nth(chars)
            .map_or(self.value.len(), |(i, _)| i)
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.is_editable() {
            return;
        }
        let at = self.byte_index(self.cursor_position);
        self.value.insert(at, c);
        self.cursor_position += 1;
        self.validate();
    }

    pub fn delete_char(&mut self) {
        if !self.is_editable() || self.cursor_position == 0 {
            return;
        }
        self.cursor_position -= 1;
        let at = self.byte_index(self.cursor_position);
        self.value.remove(at);
        self.validate();
    }

    pub fn delete_char_forward(&mut self) {
        if !self.is_editable() || self.cursor_position >= self.char_count() {
            return;
        }
        let at = self.byte_index(self.cursor_position);
        self.value.remove(at);
        self.validate();
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.char_count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.char_count();
    }

    /// Terminal columns between the start of the value and the cursor
    pub fn cursor_offset(&self) -> u16 {
        let prefix = &self.value[..self.byte_index(self.cursor_position)];
        prefix.width() as u16
    }

    /// Validate field value. Emails get the structural check; other types
    /// carry no constraint.
    pub fn validate(&mut self) -> bool {
        self.validation_error = match self.field_type {
            FormFieldType::Email => validation::email_error(&self.value).map(str::to_string),
            _ => None,
        };
        self.validation_error.is_none()
    }

    fn display_text(&self) -> (&str, bool) {
        if self.value.is_empty() && !self.placeholder.is_empty() {
            (&self.placeholder, true)
        } else {
            (&self.value, false)
        }
    }

    /// Render the form field as a bordered box
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let (display_text, is_placeholder) = self.display_text();

        let border_style = if self.is_focused {
            Styles::active_border()
        } else if self.validation_error.is_some() {
            Styles::error()
        } else {
            Styles::inactive_border()
        };

        let title = if let Some(ref error) = self.validation_error {
            format!("{} - {}", self.label, error)
        } else {
            self.label.clone()
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let text_style = if is_placeholder {
            Styles::inactive()
        } else {
            Styles::default()
        };

        let paragraph = Paragraph::new(display_text.to_string())
            .style(text_style)
            .block(block);

        f.render_widget(paragraph, area);

        if self.is_focused && self.is_editable() {
            self.place_cursor(f, area.x + 1, area.y + 1, area.x + area.width.saturating_sub(1));
        }
    }

    /// Render the field as one line without borders, used for list entries
    /// and read-only rows
    pub fn render_inline(&self, f: &mut Frame, area: Rect) {
        let (display_text, is_placeholder) = self.display_text();

        let marker = if self.is_focused { "> " } else { "  " };
        let text_style = if self.is_focused && !self.is_editable() {
            Styles::selected()
        } else if self.validation_error.is_some() {
            Styles::error()
        } else if self.link.is_some() {
            Styles::link()
        } else if is_placeholder {
            Styles::inactive()
        } else {
            Styles::default()
        };

        let mut spans = vec![
            Span::styled(marker, Styles::active_border()),
            Span::styled(display_text.to_string(), text_style),
        ];
        if let Some(ref error) = self.validation_error {
            spans.push(Span::styled(format!("  {}", error), Styles::error()));
        }

        f.render_widget(Paragraph::new(Line::from(spans)), area);

        if self.is_focused && self.is_editable() {
            self.place_cursor(f, area.x + 2, area.y, area.x + area.width);
        }
    }

    fn place_cursor(&self, f: &mut Frame, x: u16, y: u16, limit: u16) {
        let cursor_x = x + self.cursor_offset();
        if cursor_x < limit {
            f.set_cursor(cursor_x, y);
        }
    }
}

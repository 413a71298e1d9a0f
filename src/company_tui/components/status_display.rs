//! Status display component for showing messages and progress

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::company_tui::ui::Styles;

/// Types of status messages
#[derive(Debug, Clone, PartialEq)]
pub enum StatusType {
    Info,
    Success,
    Warning,
    Error,
    Loading,
}

/// Status message with type and content
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub status_type: StatusType,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl StatusMessage {
    pub fn new(message: String, status_type: StatusType) -> Self {
        Self {
            message,
            status_type,
            timestamp: chrono::Local::now(),
        }
    }

    pub fn info(message: String) -> Self {
        Self::new(message, StatusType::Info)
    }

    pub fn success(message: String) -> Self {
        Self::new(message, StatusType::Success)
    }

    pub fn warning(message: String) -> Self {
        Self::new(message, StatusType::Warning)
    }

    pub fn error(message: String) -> Self {
        Self::new(message, StatusType::Error)
    }

    pub fn loading(message: String) -> Self {
        Self::new(message, StatusType::Loading)
    }
}

/// Status display component
pub struct StatusDisplay {
    current_message: Option<StatusMessage>,
    message_history: Vec<StatusMessage>,
    max_history: usize,
    show_timestamp: bool,
}

impl Default for StatusDisplay {
    fn default() -> Self {
        Self {
            current_message: None,
            message_history: Vec::new(),
            max_history: 100,
            show_timestamp: false,
        }
    }
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn with_timestamps(mut self) -> Self {
        self.show_timestamp = true;
        self
    }

    fn archive_current(&mut self) {
        if let Some(current) = self.current_message.take() {
            self.message_history.push(current);
            if self.message_history.len() > self.max_history {
                self.message_history.remove(0);
            }
        }
    }

    /// Set current status message
    pub fn set_message(&mut self, message: StatusMessage) {
        self.archive_current();
        self.current_message = Some(message);
    }

    pub fn set_info(&mut self, message: String) {
        self.set_message(StatusMessage::info(message));
    }

    pub fn set_success(&mut self, message: String) {
        self.set_message(StatusMessage::success(message));
    }

    pub fn set_warning(&mut self, message: String) {
        self.set_message(StatusMessage::warning(message));
    }

    pub fn set_error(&mut self, message: String) {
        self.set_message(StatusMessage::error(message));
    }

    pub fn set_loading(&mut self, message: String) {
        self.set_message(StatusMessage::loading(message));
    }

    /// Clear current message
    pub fn clear(&mut self) {
        self.archive_current();
    }

    pub fn get_current(&self) -> Option<&StatusMessage> {
        self.current_message.as_ref()
    }

    pub fn get_history(&self) -> &[StatusMessage] {
        &self.message_history
    }

    /// Render the status display
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let (content, style) = match &self.current_message {
            Some(message) => {
                let style = match message.status_type {
                    StatusType::Info => Styles::info(),
                    StatusType::Success => Styles::success(),
                    StatusType::Warning | StatusType::Loading => Styles::warning(),
                    StatusType::Error => Styles::error(),
                };
                (self.format_message(message), style)
            }
            None => ("Готово".to_string(), Styles::default()),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::inactive_border());

        let paragraph = Paragraph::new(content).style(style).block(block);

        f.render_widget(paragraph, area);
    }

    /// Format message for display
    fn format_message(&self, message: &StatusMessage) -> String {
        let prefix = match message.status_type {
            StatusType::Info => "ℹ",
            StatusType::Success => "✓",
            StatusType::Warning => "⚠",
            StatusType::Error => "✗",
            StatusType::Loading => "⟳",
        };

        if self.show_timestamp {
            format!(
                "{} [{}] {}",
                prefix,
                message.timestamp.format("%H:%M:%S"),
                message.message
            )
        } else {
            format!("{} {}", prefix, message.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let mut status = StatusDisplay::new().with_history(2);
        for i in 0..5 {
            status.set_info(format!("message {}", i));
        }
        assert_eq!(status.get_history().len(), 2);
        assert_eq!(status.get_history()[0].message, "message 2");
        assert_eq!(status.get_current().map(|m| m.message.as_str()), Some("message 4"));
    }

    #[test]
    fn test_clear_moves_message_to_history() {
        let mut status = StatusDisplay::new();
        status.set_error("Сбой".to_string());
        status.clear();
        assert!(status.get_current().is_none());
        assert_eq!(status.get_history()[0].status_type, StatusType::Error);
    }

    #[test]
    fn test_format_without_timestamp() {
        let status = StatusDisplay::new();
        let text = status.format_message(&StatusMessage::success("Сохранено".to_string()));
        assert_eq!(text, "✓ Сохранено");
    }
}

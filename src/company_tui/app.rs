//! Main TUI application state and logic

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tracing::{debug, info};

use crate::company_tui::components::StatusDisplay;
use crate::company_tui::screens::CompanyScreen;
use crate::company_tui::traits::ScreenAction;
use crate::company_tui::ui::{centered_rect, Styles};
use crate::config::Config;
use crate::form::{CompanyFormView, FormEvent};

/// How long to wait for a key before polling the outstanding request
const TICK_RATE: Duration = Duration::from_millis(100);

/// Main TUI application state
pub struct App {
    /// Application configuration
    pub config: Config,
    pub screen: CompanyScreen,
    pub status: StatusDisplay,

    pub should_quit: bool,
    pub show_help_popup: bool,
}

impl App {
    /// Create a new TUI application around an opened form view
    pub fn new(config: Config, view: CompanyFormView) -> Self {
        let mut status = StatusDisplay::new().with_timestamps();
        if view.is_loaded() {
            status.set_info("Запись открыта".to_string());
        } else {
            status.set_loading("Загрузка...".to_string());
        }

        Self {
            config,
            screen: CompanyScreen::new(view),
            status,
            should_quit: false,
            show_help_popup: false,
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!("Company editor connected to {}", self.config.server_url);

        loop {
            self.screen.sync();
            terminal.draw(|f| self.draw(f))?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key)?;
                    }
                }
            }

            if let Some(form_event) = self.screen.view_mut().update_progress().await {
                self.on_form_event(form_event);
            }

            if self.screen.is_closed() {
                self.should_quit = true;
            }
            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle keyboard input events
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Global shortcuts
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.screen.view_mut().close();
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::F(1) => {
                self.show_help_popup = !self.show_help_popup;
                return Ok(());
            }
            KeyCode::Esc if self.show_help_popup => {
                self.show_help_popup = false;
                return Ok(());
            }
            _ => {}
        }

        if self.show_help_popup {
            return Ok(());
        }

        let action = self.screen.handle_key_event(key)?;
        self.apply_action(action);
        Ok(())
    }

    fn apply_action(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::SetStatus(message) => self.status.set_info(message),
            ScreenAction::SetWarning(message) => self.status.set_warning(message),
            ScreenAction::SetError(message) => self.status.set_error(message),
            ScreenAction::ClearMessages => self.status.clear(),
            ScreenAction::None => {}
        }
    }

    /// Report a finished request in the status bar
    pub fn on_form_event(&mut self, form_event: FormEvent) {
        debug!("Form event: {:?}", form_event);
        match form_event {
            FormEvent::Loaded => self.status.set_info("Запись загружена".to_string()),
            FormEvent::Saved { id } => self.status.set_success(format!("Сохранено, id {}", id)),
            FormEvent::Deleted => self.status.set_success("Запись удалена".to_string()),
            FormEvent::Failed(message) if !self.screen.view().is_loaded() => {
                self.status.set_error(format!("{} (F5 - повторить)", message))
            }
            FormEvent::Failed(message) => self.status.set_error(message),
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        // Main layout: status bar at bottom, content area above
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.screen.draw(f, chunks[0]);
        self.status.render(f, chunks[1]);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 60, area);

        f.render_widget(Clear, popup_area);

        let help_popup = Paragraph::new(HELP_TEXT)
            .block(
                Block::default()
                    .title("Справка")
                    .borders(Borders::ALL)
                    .border_style(Styles::warning()),
            )
            .style(Styles::default());

        f.render_widget(help_popup, popup_area);
    }
}

const HELP_TEXT: &str = "Tab / ↓      - следующее поле\n\
    Shift+Tab / ↑ - предыдущее поле\n\
    ←/→ Home/End - курсор\n\
    Enter        - выбрать / нажать кнопку\n\
    Ctrl+S       - сохранить\n\
    F5           - загрузить заново\n\
    Esc          - закрыть запись\n\
    Ctrl+Q       - выход\n\
    F1           - эта справка";

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::company_tui::components::status_display::StatusType;
    use crate::errors::RpelError;
    use crate::remote::{MockRecordLoader, MockRecordSubmitter};

    fn failing_app() -> App {
        let mut loader = MockRecordLoader::new();
        loader
            .expect_fetch_list()
            .returning(|_| Err(RpelError::ConnectionClosed));
        let view = CompanyFormView::new(Arc::new(loader), Arc::new(MockRecordSubmitter::new()));
        App::new(Config::default(), view)
    }

    #[tokio::test]
    async fn test_failed_load_suggests_retry() {
        let mut app = failing_app();
        app.screen.view_mut().load(5).unwrap();
        let form_event = app.screen.view_mut().settle().await.unwrap();
        app.on_form_event(form_event);

        let message = app.status.get_current().map(|m| m.message.clone()).unwrap();
        assert!(message.contains("F5"));
    }

    #[test]
    fn test_help_popup_swallows_keys() {
        let mut app = failing_app();
        app.handle_key_event(KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE))
            .unwrap();
        assert!(app.show_help_popup);

        app.handle_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
            .unwrap();
        assert!(!app.show_help_popup);
        assert!(!app.screen.is_closed());
    }

    #[test]
    fn test_warning_action_reaches_status_bar() {
        let mut app = failing_app();
        app.apply_action(ScreenAction::SetWarning("Сохранение... (Неправильных email: 1)".to_string()));
        let current = app.status.get_current().unwrap();
        assert_eq!(current.status_type, StatusType::Warning);
    }

    #[test]
    fn test_ctrl_q_quits() {
        let mut app = failing_app();
        app.handle_key_event(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(app.should_quit);
        assert!(app.screen.is_closed());
    }
}

//! Company edit screen
//!
//! Renders a [`CompanyFormView`] as a keyboard-driven form. The screen keeps
//! one [`FormField`] per focusable target and rebuilds them whenever the
//! view's revision moves, so server results and list normalization show up
//! without the screen tracking them itself.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Color,
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use tracing::debug;

use crate::company_tui::components::{FormField, FormFieldType};
use crate::company_tui::traits::{FormHandler, ScreenAction};
use crate::company_tui::ui::{centered_rect, SelectableList, Styles};
use crate::form::list_field;
use crate::form::{CompanyField, CompanyFormView, ListKind, ViewState, DELETE_PROMPT};
use crate::models::SelectItem;

/// Buttons in the footer of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterButton {
    Save,
    Close,
    Delete,
}

impl FooterButton {
    pub const ALL: [FooterButton; 3] = [FooterButton::Save, FooterButton::Close, FooterButton::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            FooterButton::Save => "Сохранить",
            FooterButton::Close => "Закрыть",
            FooterButton::Delete => "Удалить",
        }
    }

    fn color(&self) -> Color {
        match self {
            FooterButton::Save => Color::Green,
            FooterButton::Close => Color::Cyan,
            FooterButton::Delete => Color::Red,
        }
    }
}

/// Anything on the screen that can take focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Field(CompanyField),
    Scope,
    Practice(usize),
    Contact(usize),
    Button(FooterButton),
}

fn list_label(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Emails => "Электронный адрес",
        ListKind::Phones => "Телефон",
        ListKind::Faxes => "Факс",
    }
}

enum Row {
    Header(String),
    Target(usize),
}

/// Company screen state
pub struct CompanyScreen {
    view: CompanyFormView,
    targets: Vec<Target>,
    fields: Vec<FormField>,
    current_field: usize,
    synced_revision: Option<u64>,
    scope_list: SelectableList<SelectItem>,
    show_scope_dropdown: bool,
    confirm_delete: bool,
}

impl CompanyScreen {
    pub fn new(view: CompanyFormView) -> Self {
        let mut screen = Self {
            view,
            targets: Vec::new(),
            fields: Vec::new(),
            current_field: 0,
            synced_revision: None,
            scope_list: SelectableList::new(Vec::new()),
            show_scope_dropdown: false,
            confirm_delete: false,
        };
        screen.sync();
        screen
    }

    pub fn view(&self) -> &CompanyFormView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut CompanyFormView {
        &mut self.view
    }

    pub fn is_closed(&self) -> bool {
        self.view.is_closed()
    }

    pub fn current_target(&self) -> Option<Target> {
        self.targets.get(self.current_field).copied()
    }

    fn position(&self, target: Target) -> Option<usize> {
        self.targets.iter().position(|t| *t == target)
    }

    fn build_targets(&self) -> Vec<Target> {
        let draft = self.view.draft();
        let mut targets = vec![
            Target::Field(CompanyField::Name),
            Target::Scope,
            Target::Field(CompanyField::Address),
        ];
        for kind in ListKind::ALL {
            targets.extend(
                (0..draft.list(kind).len()).map(|i| Target::Field(CompanyField::List(kind, i))),
            );
        }
        targets.extend((0..draft.practices.len()).map(Target::Practice));
        targets.extend((0..draft.contacts.len()).map(Target::Contact));
        targets.push(Target::Field(CompanyField::Note));
        targets.extend(FooterButton::ALL.into_iter().map(Target::Button));
        targets
    }

    fn build_field(&self, target: Target) -> FormField {
        let draft = self.view.draft();
        let mut field = match target {
            Target::Field(CompanyField::Name) => {
                FormField::new("Наименование организации", FormFieldType::Text).with_value(&draft.name)
            }
            Target::Field(CompanyField::Address) => {
                FormField::new("Адрес", FormFieldType::Text).with_value(&draft.address)
            }
            Target::Field(CompanyField::Note) => {
                FormField::new("Заметка", FormFieldType::Text).with_value(&draft.note)
            }
            Target::Field(field @ CompanyField::List(kind, _)) => {
                let field_type = match kind {
                    ListKind::Emails => FormFieldType::Email,
                    ListKind::Phones | ListKind::Faxes => FormFieldType::Phone,
                };
                FormField::new(list_label(kind), field_type)
                    .with_value(draft.value(field).unwrap_or_default())
                    .with_placeholder("...")
            }
            Target::Scope => FormField::new("Сфера деятельности", FormFieldType::Dropdown)
                .with_value(draft.scope().map(|s| s.label()).unwrap_or_default())
                .with_placeholder("Enter - выбрать"),
            Target::Practice(i) => {
                let practice = &draft.practices[i];
                FormField::new("Тренировки", FormFieldType::ReadOnly)
                    .with_value(&practice.summary())
                    .with_link(practice.link())
            }
            Target::Contact(i) => {
                let contact = &draft.contacts[i];
                FormField::new("Сотрудники", FormFieldType::ReadOnly)
                    .with_value(&contact.summary())
                    .with_link(contact.link())
            }
            Target::Button(button) => FormField::new(button.as_str(), FormFieldType::ReadOnly),
        };
        field.validate();
        field
    }

    /// Rebuild fields from the view if it changed since the last sync.
    /// Focus and cursor stay on the same target when it still exists.
    pub fn sync(&mut self) {
        let revision = self.view.revision();
        if self.synced_revision == Some(revision) {
            return;
        }

        let focused = self.current_target();
        let cursor = self.fields.get(self.current_field).map(|f| f.cursor_position);

        self.targets = self.build_targets();
        self.fields = self.targets.iter().map(|t| self.build_field(*t)).collect();

        self.current_field = match focused.and_then(|t| self.position(t)) {
            Some(index) => {
                if let (Some(cursor), Some(field)) = (cursor, self.fields.get_mut(index)) {
                    field.cursor_position = cursor.min(field.value.chars().count());
                }
                index
            }
            None => self.current_field.min(self.targets.len().saturating_sub(1)),
        };
        if let Some(field) = self.fields.get_mut(self.current_field) {
            field.set_focus(true);
        }

        let scopes = self.view.scopes().to_vec();
        let selected = self
            .view
            .draft()
            .scope_id()
            .and_then(|id| scopes.iter().position(|s| s.id == id));
        self.scope_list = SelectableList::new(scopes);
        if selected.is_some() {
            self.scope_list.select(selected);
        }

        self.synced_revision = Some(revision);
    }

    /// Push the focused input's text into the view
    fn push_current_value(&mut self) {
        let Some(Target::Field(field)) = self.current_target() else {
            return;
        };
        let value = self.fields[self.current_field].value.clone();
        match self.view.on_field_edit(field, value) {
            Ok(()) => self.synced_revision = Some(self.view.revision()),
            Err(e) => debug!("Edit ignored: {}", e),
        }
    }

    fn edit_current<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut FormField),
    {
        if !self.view.is_editable() {
            return;
        }
        if let Some(field) = self.fields.get_mut(self.current_field) {
            let before = field.value.clone();
            edit(field);
            if field.value != before {
                self.push_current_value();
            }
        }
    }

    fn focus_index(&mut self, index: usize) {
        if let Some(current) = self.fields.get_mut(self.current_field) {
            current.set_focus(false);
        }
        self.current_field = index;
        if let Some(field) = self.fields.get_mut(index) {
            field.set_focus(true);
        }
    }

    fn move_cursor<F>(&mut self, movement: F)
    where
        F: FnOnce(&mut FormField),
    {
        if let Some(field) = self.fields.get_mut(self.current_field) {
            movement(field);
        }
    }

    fn open_scope_dropdown(&mut self) -> ScreenAction {
        if !self.view.is_editable() {
            return ScreenAction::None;
        }
        if self.scope_list.is_empty() {
            return ScreenAction::SetError("Список сфер деятельности пуст".to_string());
        }
        self.show_scope_dropdown = true;
        ScreenAction::None
    }

    fn request_delete(&mut self) -> ScreenAction {
        if self.view.can_submit() {
            self.confirm_delete = true;
            ScreenAction::None
        } else {
            ScreenAction::SetError("Удаление сейчас недоступно".to_string())
        }
    }

    fn close_view(&mut self) -> ScreenAction {
        self.view.close();
        ScreenAction::Quit
    }

    /// Handle key events for the company screen
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<ScreenAction> {
        if self.confirm_delete {
            return Ok(self.handle_confirm_event(key));
        }
        if self.show_scope_dropdown {
            return Ok(self.handle_scope_dropdown_event(key));
        }

        let action = match key.code {
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return self.submit();
            }
            KeyCode::Esc => self.close_view(),
            KeyCode::F(5) => match self.view.reload() {
                Ok(()) => ScreenAction::SetStatus("Загрузка...".to_string()),
                Err(e) => ScreenAction::SetError(e.to_string()),
            },
            KeyCode::Tab | KeyCode::Down => {
                self.next_field();
                ScreenAction::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.previous_field();
                ScreenAction::None
            }
            KeyCode::Enter => match self.current_target() {
                Some(Target::Scope) => self.open_scope_dropdown(),
                Some(Target::Button(FooterButton::Save)) => return self.submit(),
                Some(Target::Button(FooterButton::Close)) => self.close_view(),
                Some(Target::Button(FooterButton::Delete)) => self.request_delete(),
                Some(Target::Practice(_)) | Some(Target::Contact(_)) => {
                    match &self.fields[self.current_field].link {
                        Some(link) => ScreenAction::SetStatus(format!("Ссылка: {}", link)),
                        None => ScreenAction::None,
                    }
                }
                Some(Target::Field(_)) => {
                    self.next_field();
                    ScreenAction::None
                }
                None => ScreenAction::None,
            },
            KeyCode::Char(c) => {
                self.handle_char_input(c);
                ScreenAction::None
            }
            KeyCode::Backspace => {
                self.handle_backspace();
                ScreenAction::None
            }
            KeyCode::Delete => {
                self.handle_delete();
                ScreenAction::None
            }
            KeyCode::Left => {
                self.move_cursor(FormField::move_cursor_left);
                ScreenAction::None
            }
            KeyCode::Right => {
                self.move_cursor(FormField::move_cursor_right);
                ScreenAction::None
            }
            KeyCode::Home => {
                self.move_cursor(FormField::move_cursor_to_start);
                ScreenAction::None
            }
            KeyCode::End => {
                self.move_cursor(FormField::move_cursor_to_end);
                ScreenAction::None
            }
            _ => ScreenAction::None,
        };
        Ok(action)
    }

    fn handle_scope_dropdown_event(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Up => self.scope_list.previous(),
            KeyCode::Down => self.scope_list.next(),
            KeyCode::Enter => {
                self.show_scope_dropdown = false;
                if let Some(scope) = self.scope_list.selected().cloned() {
                    if let Err(e) = self.view.on_scope_select(scope) {
                        return ScreenAction::SetError(e.to_string());
                    }
                }
            }
            KeyCode::Esc => self.show_scope_dropdown = false,
            _ => {}
        }
        ScreenAction::None
    }

    fn handle_confirm_event(&mut self, key: KeyEvent) -> ScreenAction {
        let answer = match key.code {
            KeyCode::Char('y') | KeyCode::Char('д') | KeyCode::Enter => true,
            KeyCode::Char('n') | KeyCode::Char('н') | KeyCode::Esc => false,
            _ => return ScreenAction::None,
        };
        self.confirm_delete = false;

        match self.view.delete(|_| answer) {
            Ok(true) if self.view.is_closed() => ScreenAction::Quit,
            Ok(true) => ScreenAction::SetStatus("Удаление...".to_string()),
            Ok(false) => ScreenAction::ClearMessages,
            Err(e) => ScreenAction::SetError(e.to_string()),
        }
    }

    /// Draw the company screen
    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(0),    // Form
                Constraint::Length(3), // Buttons
            ])
            .split(area);

        self.draw_title(f, chunks[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        self.draw_scalar_fields(f, columns[0]);
        self.draw_list_fields(f, columns[1]);

        self.draw_buttons(f, chunks[2]);

        if self.show_scope_dropdown {
            self.draw_scope_dropdown(f, area);
        }
        if self.confirm_delete {
            self.draw_confirm_popup(f, area);
        }
    }

    fn draw_title(&self, f: &mut Frame, area: Rect) {
        let draft = self.view.draft();
        let mut title = if draft.is_new() {
            "Новая организация".to_string()
        } else {
            format!("Организация #{}", draft.id)
        };
        match self.view.state() {
            ViewState::Loading => title.push_str(" - загрузка..."),
            ViewState::Submitting => title.push_str(" - сохранение..."),
            ViewState::Ready if self.view.is_dirty() => title.push_str(" *"),
            ViewState::Ready => {}
        }

        let style = if self.view.state() == ViewState::Ready {
            Styles::title()
        } else {
            Styles::warning()
        };
        let title_widget = Paragraph::new(title)
            .style(style)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title_widget, area);
    }

    fn draw_scalar_fields(&self, f: &mut Frame, area: Rect) {
        let scalars = [
            Target::Field(CompanyField::Name),
            Target::Scope,
            Target::Field(CompanyField::Address),
            Target::Field(CompanyField::Note),
        ];
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        for (target, chunk) in scalars.iter().zip(chunks.iter()) {
            if let Some(index) = self.position(*target) {
                self.fields[index].render(f, *chunk);
            }
        }
    }

    fn draw_list_fields(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::inactive_border());
        let inner = block.inner(area);
        f.render_widget(block, area);

        let mut rows = Vec::new();
        let mut last_label: Option<&str> = None;
        for (index, target) in self.targets.iter().enumerate() {
            let listed = matches!(
                target,
                Target::Field(CompanyField::List(..)) | Target::Practice(_) | Target::Contact(_)
            );
            if !listed {
                continue;
            }
            let label = self.fields[index].label.as_str();
            if last_label != Some(label) {
                rows.push(Row::Header(label.to_string()));
                last_label = Some(label);
            }
            rows.push(Row::Target(index));
        }

        let height = inner.height as usize;
        let focused_row = rows
            .iter()
            .position(|row| matches!(row, Row::Target(i) if *i == self.current_field))
            .unwrap_or(0);
        let offset = if height > 0 && focused_row >= height {
            focused_row + 1 - height
        } else {
            0
        };

        for (n, row) in rows.iter().skip(offset).take(height).enumerate() {
            let line = Rect::new(inner.x, inner.y + n as u16, inner.width, 1);
            match row {
                Row::Header(label) => {
                    f.render_widget(Paragraph::new(label.as_str()).style(Styles::title()), line)
                }
                Row::Target(index) => self.fields[*index].render_inline(f, line),
            }
        }
    }

    fn draw_buttons(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        for (button, chunk) in FooterButton::ALL.iter().zip(chunks.iter()) {
            let focused = self.current_target() == Some(Target::Button(*button));
            let enabled = match button {
                FooterButton::Close => true,
                FooterButton::Save | FooterButton::Delete => self.view.can_submit(),
            };
            let widget = Paragraph::new(button.as_str())
                .alignment(Alignment::Center)
                .style(Styles::button(button.color(), focused, enabled))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(widget, *chunk);
        }
    }

    fn draw_scope_dropdown(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(50, 50, area);
        f.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = self
            .scope_list
            .items
            .iter()
            .map(|scope| ListItem::new(scope.label().to_string()))
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title("Сфера деятельности")
                    .borders(Borders::ALL)
                    .border_style(Styles::active_border()),
            )
            .highlight_style(Styles::selected());

        f.render_stateful_widget(list, popup_area, &mut self.scope_list.state);
    }

    fn draw_confirm_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(50, 25, area);
        f.render_widget(Clear, popup_area);

        let text = format!("{}\n\n[y] Да    [n] Нет", DELETE_PROMPT);
        let popup = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(FooterButton::Delete.as_str())
                    .borders(Borders::ALL)
                    .border_style(Styles::warning()),
            );
        f.render_widget(popup, popup_area);
    }
}

impl FormHandler for CompanyScreen {
    fn get_current_field(&self) -> usize {
        self.current_field
    }

    /// Leaving a list entry is a blur: the list is normalized and focus
    /// follows the target entry to its new position.
    fn set_current_field(&mut self, field: usize) {
        if field >= self.targets.len() {
            return;
        }
        let previous = self.current_target();
        let mut next = self.targets[field];
        self.focus_index(field);

        let Some(Target::Field(CompanyField::List(kind, _))) = previous else {
            return;
        };
        if previous == Some(next) {
            return;
        }

        if let Target::Field(CompanyField::List(next_kind, index)) = next {
            if next_kind == kind {
                let moved = list_field::index_after_blur(self.view.draft().list(kind), index);
                next = Target::Field(CompanyField::List(kind, moved));
            }
        }
        self.view.on_blur(kind);
        self.sync();
        if let Some(index) = self.position(next) {
            self.focus_index(index);
        }
    }

    fn get_field_count(&self) -> usize {
        self.targets.len()
    }

    fn handle_char_input(&mut self, c: char) {
        self.edit_current(|field| field.insert_char(c));
    }

    fn handle_backspace(&mut self) {
        self.edit_current(FormField::delete_char);
    }

    fn handle_delete(&mut self) {
        self.edit_current(FormField::delete_char_forward);
    }

    fn validate(&self) -> Result<(), String> {
        match self.view.invalid_email_count() {
            0 => Ok(()),
            n => Err(format!("Неправильных email: {}", n)),
        }
    }

    fn submit(&mut self) -> Result<ScreenAction> {
        let warning = FormHandler::validate(self).err();
        match self.view.submit() {
            Ok(()) => Ok(match warning {
                Some(warning) => ScreenAction::SetWarning(format!("Сохранение... ({})", warning)),
                None => ScreenAction::SetStatus("Сохранение...".to_string()),
            }),
            Err(e) => Ok(ScreenAction::SetError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::form::FormEvent;
    use crate::models::{Company, ContactShort};
    use crate::remote::{DbObject, MockRecordLoader, MockRecordSubmitter};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(screen: &mut CompanyScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
    }

    async fn loaded_screen(company: Option<Company>, submitter: MockRecordSubmitter) -> CompanyScreen {
        let id = company.as_ref().map_or(0, |c| c.id);
        let mut loader = MockRecordLoader::new();
        loader.expect_fetch_list().returning(|_| {
            Ok(DbObject::SelectItem(vec![
                SelectItem::new(1, "Торговля"),
                SelectItem::new(2, "Производство"),
            ]))
        });
        loader
            .expect_fetch_item()
            .returning(move |_| Ok(DbObject::Company(Box::new(company.clone().unwrap_or_default()))));

        let mut view = CompanyFormView::open(Arc::new(loader), Arc::new(submitter), id).unwrap();
        assert_eq!(view.settle().await, Some(FormEvent::Loaded));
        CompanyScreen::new(view)
    }

    fn stored_company() -> Company {
        Company {
            id: 12,
            name: Some("ООО Ромашка".to_string()),
            scope_id: Some(1),
            contacts: vec![ContactShort {
                id: 4,
                name: Some("Иванов И.И.".to_string()),
                department_name: None,
                post_name: Some("Директор".to_string()),
                post_go_name: None,
            }],
            ..Default::default()
        }
    }

    fn focus(screen: &mut CompanyScreen, target: Target) {
        let index = screen.position(target).unwrap();
        screen.set_current_field(index);
    }

    #[tokio::test]
    async fn test_typing_updates_view() {
        let mut screen = loaded_screen(None, MockRecordSubmitter::new()).await;
        assert_eq!(screen.current_target(), Some(Target::Field(CompanyField::Name)));

        type_text(&mut screen, "ООО Лютик");
        screen.handle_key_event(key(KeyCode::Backspace)).unwrap();
        assert_eq!(screen.view().draft().name, "ООО Люти");
        assert!(screen.view().is_dirty());
    }

    #[tokio::test]
    async fn test_leaving_list_appends_blank() {
        let mut screen = loaded_screen(None, MockRecordSubmitter::new()).await;
        focus(&mut screen, Target::Field(CompanyField::List(ListKind::Emails, 0)));
        type_text(&mut screen, "a@b.co");

        screen.handle_key_event(key(KeyCode::Tab)).unwrap();
        assert_eq!(screen.view().draft().list(ListKind::Emails), ["a@b.co", ""]);
        assert_eq!(
            screen.current_target(),
            Some(Target::Field(CompanyField::List(ListKind::Phones, 0)))
        );
        assert!(screen
            .position(Target::Field(CompanyField::List(ListKind::Emails, 1)))
            .is_some());
    }

    fn company_with_emails(emails: &[&str]) -> Company {
        Company {
            id: 12,
            emails: emails.iter().map(|e| e.to_string()).collect(),
            ..Default::default()
        }
    }

    fn clear_current(screen: &mut CompanyScreen) {
        let len = screen.fields[screen.current_field].value.chars().count();
        for _ in 0..len {
            screen.handle_key_event(key(KeyCode::Backspace)).unwrap();
        }
    }

    #[tokio::test]
    async fn test_moving_within_list_normalizes() {
        let company = company_with_emails(&["a@b.co", "x@y.z"]);
        let mut screen = loaded_screen(Some(company), MockRecordSubmitter::new()).await;
        focus(&mut screen, Target::Field(CompanyField::List(ListKind::Emails, 1)));
        clear_current(&mut screen);
        assert_eq!(screen.view().draft().list(ListKind::Emails), ["a@b.co", "", ""]);

        screen.handle_key_event(key(KeyCode::Up)).unwrap();
        assert_eq!(screen.view().draft().list(ListKind::Emails), ["a@b.co", ""]);
        assert_eq!(
            screen.current_target(),
            Some(Target::Field(CompanyField::List(ListKind::Emails, 0)))
        );
        assert_eq!(screen.fields[screen.current_field].value, "a@b.co");
        assert!(screen.fields[screen.current_field].is_focused);
        assert_eq!(screen.fields.iter().filter(|f| f.is_focused).count(), 1);
    }

    #[tokio::test]
    async fn test_focus_follows_entry_when_blank_is_dropped() {
        let company = company_with_emails(&["a@b.co", "x@y.z"]);
        let mut screen = loaded_screen(Some(company), MockRecordSubmitter::new()).await;
        focus(&mut screen, Target::Field(CompanyField::List(ListKind::Emails, 0)));
        clear_current(&mut screen);

        screen.handle_key_event(key(KeyCode::Down)).unwrap();
        assert_eq!(screen.view().draft().list(ListKind::Emails), ["x@y.z", ""]);
        assert_eq!(
            screen.current_target(),
            Some(Target::Field(CompanyField::List(ListKind::Emails, 0)))
        );
        assert_eq!(screen.fields[screen.current_field].value, "x@y.z");
    }

    #[tokio::test]
    async fn test_save_with_invalid_email_warns() {
        let mut submitter = MockRecordSubmitter::new();
        submitter.expect_update_item().times(1).returning(|_| Ok(1));
        let company = company_with_emails(&["not-an-email"]);
        let mut screen = loaded_screen(Some(company), submitter).await;

        let action = screen
            .handle_key_event(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(matches!(action, ScreenAction::SetWarning(ref m) if m.contains("1")));
        assert_eq!(
            screen.view_mut().settle().await,
            Some(FormEvent::Saved { id: 12 })
        );
    }

    #[tokio::test]
    async fn test_invalid_email_is_flagged_inline() {
        let mut screen = loaded_screen(None, MockRecordSubmitter::new()).await;
        focus(&mut screen, Target::Field(CompanyField::List(ListKind::Emails, 0)));
        type_text(&mut screen, "not-an-email");

        let field = &screen.fields[screen.current_field];
        assert_eq!(field.validation_error.as_deref(), Some("Неправильный email"));
        assert!(FormHandler::validate(&screen).is_err());
    }

    #[tokio::test]
    async fn test_scope_dropdown_selects_scope() {
        let mut screen = loaded_screen(Some(stored_company()), MockRecordSubmitter::new()).await;
        focus(&mut screen, Target::Scope);

        screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(screen.show_scope_dropdown);
        screen.handle_key_event(key(KeyCode::Down)).unwrap();
        screen.handle_key_event(key(KeyCode::Enter)).unwrap();

        assert!(!screen.show_scope_dropdown);
        assert_eq!(screen.view().draft().scope_id(), Some(2));
        screen.sync();
        let index = screen.position(Target::Scope).unwrap();
        assert_eq!(screen.fields[index].value, "Производство");
    }

    #[tokio::test]
    async fn test_declined_delete_keeps_record() {
        let mut submitter = MockRecordSubmitter::new();
        submitter.expect_delete_item().never();
        let mut screen = loaded_screen(Some(stored_company()), submitter).await;

        focus(&mut screen, Target::Button(FooterButton::Delete));
        screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(screen.confirm_delete);

        let action = screen.handle_key_event(key(KeyCode::Char('n'))).unwrap();
        assert_eq!(action, ScreenAction::ClearMessages);
        assert!(!screen.confirm_delete);
        assert!(!screen.is_closed());
    }

    #[tokio::test]
    async fn test_ctrl_s_saves() {
        let mut submitter = MockRecordSubmitter::new();
        submitter.expect_update_item().times(1).returning(|_| Ok(1));
        let mut screen = loaded_screen(Some(stored_company()), submitter).await;

        let action = screen
            .handle_key_event(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(action, ScreenAction::SetStatus("Сохранение...".to_string()));
        assert_eq!(screen.view().state(), ViewState::Submitting);
        assert_eq!(
            screen.view_mut().settle().await,
            Some(FormEvent::Saved { id: 12 })
        );
    }

    #[tokio::test]
    async fn test_contact_row_shows_link() {
        let mut screen = loaded_screen(Some(stored_company()), MockRecordSubmitter::new()).await;
        focus(&mut screen, Target::Contact(0));

        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(action, ScreenAction::SetStatus("Ссылка: /contact/4".to_string()));
    }

    #[tokio::test]
    async fn test_escape_closes_view() {
        let mut screen = loaded_screen(Some(stored_company()), MockRecordSubmitter::new()).await;
        let action = screen.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert_eq!(action, ScreenAction::Quit);
        assert!(screen.is_closed());
    }
}

use crate::ui::conversation::commands::{command_entries, parse_slash_command, CommandEntry, ParsedCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};
use std::cell::{Cell, RefCell};

const ENABLED_PLACEHOLDER: &str = "Type your message...";
const DISABLED_PLACEHOLDER: &str = "Choose a merchant to start chatting";

/// Result returned when the user interacts with the conversation composer
#[derive(Debug, PartialEq)]
pub enum ConversationResult {
    Submitted(String),
    Command(ParsedCommand),
    None,
}

/// State for the text area within the composer
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    /// Byte offset, always on a char boundary
    pub cursor_position: usize,
}

/// Conversation composer for user input
#[derive(Clone)]
pub struct ConversationComposer {
    state: RefCell<TextAreaState>,
    title: String,
    has_focus: bool,
    enabled: bool,
    command_entries: Vec<CommandEntry>,
    filtered_commands: RefCell<Vec<CommandEntry>>,
    show_command_palette: Cell<bool>,
    selected_command: Cell<Option<usize>>,
}

impl ConversationComposer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            state: RefCell::new(TextAreaState::default()),
            title: title.into(),
            has_focus: false,
            enabled: false,
            command_entries: command_entries(),
            filtered_commands: RefCell::new(Vec::new()),
            show_command_palette: Cell::new(false),
            selected_command: Cell::new(None),
        }
    }

    /// Handle key input
    pub fn handle_key(&self, key: KeyEvent) -> ConversationResult {
        if key.kind != KeyEventKind::Press {
            return ConversationResult::None;
        }

        let mut state = self.state.borrow_mut();

        match key.code {
            KeyCode::Enter => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    if self.enabled {
                        self.insert_char(&mut state, '\n');
                    }
                } else if self.show_command_palette.get()
                    && !self.palette_complete(&state)
                    && self.apply_selected_command(&mut state)
                {
                    // completed the highlighted keyword
                } else {
                    let content = std::mem::take(&mut state.content);
                    state.cursor_position = 0;
                    drop(state);
                    return self.finish_input(content);
                }
            }
            KeyCode::Up => {
                if self.show_command_palette.get() {
                    self.move_command_selection(-1);
                }
            }
            KeyCode::Down => {
                if self.show_command_palette.get() {
                    self.move_command_selection(1);
                }
            }
            KeyCode::Esc => {
                if self.show_command_palette.get() {
                    self.close_command_palette();
                }
            }
            KeyCode::Tab => {
                if self.show_command_palette.get() {
                    self.apply_selected_command(&mut state);
                }
            }
            KeyCode::Char(c) => {
                if c == '/' && state.content.is_empty() {
                    self.insert_char(&mut state, c);
                    self.open_command_palette(&state);
                    return ConversationResult::None;
                }

                // A disabled composer only takes slash commands.
                if !self.enabled && !state.content.starts_with('/') {
                    return ConversationResult::None;
                }

                self.insert_char(&mut state, c);

                if self.show_command_palette.get() {
                    if c.is_whitespace() {
                        self.close_command_palette();
                    } else {
                        self.refresh_command_palette(&state);
                    }
                }
            }
            KeyCode::Backspace => {
                if self.backspace(&mut state) {
                    self.sync_palette(&state);
                }
            }
            KeyCode::Delete => {
                if self.delete(&mut state) {
                    self.sync_palette(&state);
                }
            }
            KeyCode::Left => {
                let prev = state.content[..state.cursor_position].chars().next_back();
                if let Some(prev) = prev {
                    state.cursor_position -= prev.len_utf8();
                }
            }
            KeyCode::Right => {
                let next = state.content[state.cursor_position..].chars().next();
                if let Some(next) = next {
                    state.cursor_position += next.len_utf8();
                }
            }
            KeyCode::Home => {
                state.cursor_position = 0;
            }
            KeyCode::End => {
                state.cursor_position = state.content.len();
            }
            _ => {}
        }

        ConversationResult::None
    }

    /// Insert pasted text at the cursor
    pub fn paste(&self, text: &str) {
        let mut state = self.state.borrow_mut();
        if !self.enabled && !state.content.starts_with('/') && !text.starts_with('/') {
            return;
        }
        for c in text.chars().filter(|c| *c != '\r') {
            self.insert_char(&mut state, c);
        }
    }

    fn finish_input(&self, content: String) -> ConversationResult {
        self.close_command_palette();

        if let Some(command) = parse_slash_command(&content) {
            return ConversationResult::Command(command);
        }

        // Empty text still submits so pending images can go out alone.
        if self.enabled {
            ConversationResult::Submitted(content)
        } else {
            ConversationResult::None
        }
    }

    /// Insert a character at the cursor position
    fn insert_char(&self, state: &mut TextAreaState, c: char) {
        state.content.insert(state.cursor_position, c);
        state.cursor_position += c.len_utf8();
    }

    /// Delete character before cursor
    fn backspace(&self, state: &mut TextAreaState) -> bool {
        let prev = state.content[..state.cursor_position].chars().next_back();
        match prev {
            Some(prev) => {
                state.cursor_position -= prev.len_utf8();
                state.content.remove(state.cursor_position);
                true
            }
            None => false,
        }
    }

    /// Delete character at cursor
    fn delete(&self, state: &mut TextAreaState) -> bool {
        if state.cursor_position < state.content.len() {
            state.content.remove(state.cursor_position);
            true
        } else {
            false
        }
    }

    fn sync_palette(&self, state: &TextAreaState) {
        if self.show_command_palette.get() {
            if state.content.starts_with('/') {
                self.refresh_command_palette(state);
            } else {
                self.close_command_palette();
            }
        }
    }

    fn open_command_palette(&self, state: &TextAreaState) {
        self.show_command_palette.set(true);
        self.refresh_command_palette(state);
        self.selected_command.set(Some(0));
    }

    fn close_command_palette(&self) {
        self.show_command_palette.set(false);
        self.filtered_commands.borrow_mut().clear();
        self.selected_command.set(None);
    }

    fn refresh_command_palette(&self, state: &TextAreaState) {
        let query = state.content.trim_start_matches('/').to_lowercase();
        let mut filtered = self.filtered_commands.borrow_mut();
        filtered.clear();

        for entry in &self.command_entries {
            let usable = self.enabled || entry.command.available_without_store();
            if usable && (query.is_empty() || entry.keyword.starts_with(&query)) {
                filtered.push(*entry);
            }
        }

        if filtered.is_empty() {
            self.selected_command.set(None);
        } else {
            let index = self.selected_command.get().unwrap_or(0);
            self.selected_command.set(Some(index.min(filtered.len() - 1)));
        }
    }

    fn move_command_selection(&self, delta: isize) {
        let filtered = self.filtered_commands.borrow();
        if filtered.is_empty() {
            self.selected_command.set(None);
            return;
        }

        let current = self.selected_command.get().unwrap_or(0) as isize;
        let len = filtered.len() as isize;
        let next = (current + delta).rem_euclid(len);
        self.selected_command.set(Some(next as usize));
    }

    /// Whether the typed keyword already equals the highlighted command
    fn palette_complete(&self, state: &TextAreaState) -> bool {
        let typed = state.content.trim_start_matches('/');
        let filtered = self.filtered_commands.borrow();
        self.selected_command
            .get()
            .and_then(|i| filtered.get(i))
            .is_some_and(|entry| entry.keyword == typed)
    }

    fn apply_selected_command(&self, state: &mut TextAreaState) -> bool {
        let filtered = self.filtered_commands.borrow();
        let Some(entry) = self.selected_command.get().and_then(|i| filtered.get(i).copied()) else {
            return false;
        };
        drop(filtered);

        state.content = format!("/{} ", entry.keyword);
        state.cursor_position = state.content.len();
        self.close_command_palette();
        true
    }

    /// Set focus state
    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    /// Enable or disable free-text input
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Get current content
    pub fn get_content(&self) -> String {
        self.state.borrow().content.clone()
    }

    /// Clear content
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.content.clear();
        state.cursor_position = 0;
        drop(state);
        self.close_command_palette();
    }

    fn placeholder(&self) -> &'static str {
        if self.enabled {
            ENABLED_PLACEHOLDER
        } else {
            DISABLED_PLACEHOLDER
        }
    }
}

impl Widget for &ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.state.borrow();

        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.as_str())
            .style(if self.has_focus {
                Style::default().fg(Color::LightRed)
            } else {
                Style::default().fg(Color::Gray)
            });

        let inner_area = block.inner(area);
        block.render(area, buf);

        if state.content.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                self.placeholder(),
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
        } else {
            let mut content = state.content.clone();
            if self.has_focus {
                content.insert(state.cursor_position.min(content.len()), '▌');
            }

            for (i, line_text) in content.split('\n').enumerate() {
                if i < inner_area.height as usize {
                    let line = Line::from(vec![Span::raw(line_text)]);
                    buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
                }
            }
        }

        if self.show_command_palette.get() {
            let filtered = self.filtered_commands.borrow();
            let palette_height = (filtered.len().min(7) + 2) as u16;
            let palette_area = Rect {
                x: area.x,
                y: area.y.saturating_sub(palette_height),
                width: area.width,
                height: palette_height.min(area.y),
            };
            if palette_area.height < 3 {
                return;
            }

            Clear.render(palette_area, buf);
            let block = Block::default()
                .borders(Borders::ALL)
                .title("Commands")
                .style(Style::default().fg(Color::Cyan));
            let inner = block.inner(palette_area);
            block.render(palette_area, buf);

            let selected = self.selected_command.get();
            for (index, entry) in filtered.iter().enumerate() {
                if index >= inner.height as usize {
                    break;
                }

                let style = if selected == Some(index) {
                    Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                let line = Line::from(vec![
                    Span::styled(format!("/{}", entry.keyword), style),
                    Span::styled("  ", Style::default()),
                    Span::styled(entry.description, Style::default().fg(Color::Gray)),
                ]);

                buf.set_line(inner.x, inner.y + index as u16, &line, inner.width);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::conversation::commands::SlashCommand;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(composer: &ConversationComposer, text: &str) {
        for c in text.chars() {
            composer.handle_key(press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn enabled_composer_submits_text() {
        let mut composer = ConversationComposer::new("Nautical Treasures");
        composer.set_enabled(true);
        type_text(&composer, "héllo");

        assert_eq!(
            composer.handle_key(press(KeyCode::Enter)),
            ConversationResult::Submitted("héllo".to_string())
        );
        assert!(composer.get_content().is_empty());
    }

    #[test]
    fn disabled_composer_ignores_plain_text() {
        let composer = ConversationComposer::new("Amy");
        type_text(&composer, "hello");
        assert!(composer.get_content().is_empty());
        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ConversationResult::None);
    }

    #[test]
    fn disabled_composer_still_runs_commands() {
        let composer = ConversationComposer::new("Amy");
        type_text(&composer, "/store 2");
        // palette closes on the space, so Enter submits the line
        match composer.handle_key(press(KeyCode::Enter)) {
            ConversationResult::Command(parsed) => {
                assert_eq!(parsed.command, SlashCommand::Store);
                assert_eq!(parsed.argument(), Some("2"));
            }
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn palette_completion_fills_keyword() {
        let mut composer = ConversationComposer::new("Nautical Treasures");
        composer.set_enabled(true);
        type_text(&composer, "/att");
        composer.handle_key(press(KeyCode::Tab));
        assert_eq!(composer.get_content(), "/attach ");
    }

    #[test]
    fn enter_runs_fully_typed_command() {
        let composer = ConversationComposer::new("Amy");
        type_text(&composer, "/new");
        match composer.handle_key(press(KeyCode::Enter)) {
            ConversationResult::Command(parsed) => assert_eq!(parsed.command, SlashCommand::New),
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn backspace_handles_multibyte() {
        let mut composer = ConversationComposer::new("x");
        composer.set_enabled(true);
        type_text(&composer, "a⛵");
        composer.handle_key(press(KeyCode::Backspace));
        assert_eq!(composer.get_content(), "a");
    }
}

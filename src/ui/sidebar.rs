//! Store list with search

use crate::catalog::{self, Store};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

const SEARCH_PLACEHOLDER: &str = "Search stores or products";

/// What the sidebar asks the app to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarAction {
    None,
    Select(&'static str),
    NewChat,
}

/// Sidebar state: search query and highlighted row
#[derive(Debug, Clone, Default)]
pub struct StoreSidebar {
    query: String,
    cursor: usize,
    has_focus: bool,
    active_store: Option<&'static str>,
}

impl StoreSidebar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores matching the current query, catalog order
    pub fn visible(&self) -> Vec<&'static Store> {
        catalog::filter_catalog(&self.query)
    }

    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    /// Mark the store currently being chatted with
    pub fn set_active(&mut self, store_id: Option<&'static str>) {
        self.active_store = store_id;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SidebarAction {
        if key.kind != KeyEventKind::Press {
            return SidebarAction::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('n') => SidebarAction::NewChat,
                _ => SidebarAction::None,
            };
        }

        match key.code {
            KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                let last = self.visible().len().saturating_sub(1);
                self.cursor = (self.cursor + 1).min(last);
            }
            KeyCode::Enter => {
                if let Some(store) = self.visible().get(self.cursor) {
                    return SidebarAction::Select(store.id);
                }
            }
            KeyCode::Esc => {
                self.query.clear();
                self.cursor = 0;
            }
            KeyCode::Backspace => {
                self.query.pop();
                self.cursor = 0;
            }
            KeyCode::Char(c) => {
                self.query.push(c);
                self.cursor = 0;
            }
            _ => {}
        }

        SidebarAction::None
    }

    fn store_lines(&self, store: &Store, highlighted: bool) -> [Line<'static>; 2] {
        let marker = if self.active_store == Some(store.id) { "● " } else { "  " };
        let name_style = if highlighted {
            Style::default().fg(Color::Black).bg(Color::LightRed).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        };

        let mut header = vec![
            Span::styled(marker, Style::default().fg(Color::LightRed)),
            Span::styled(store.name, name_style),
        ];
        if store.unread > 0 {
            header.push(Span::styled(
                format!(" ({})", store.unread),
                Style::default().fg(Color::Yellow),
            ));
        }

        [
            Line::from(header),
            Line::from(vec![
                Span::raw("  "),
                Span::styled(store.last_message, Style::default().fg(Color::DarkGray)),
            ]),
        ]
    }
}

impl Widget for &StoreSidebar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(catalog::MARKETPLACE_NAME)
            .border_style(if self.has_focus {
                Style::default().fg(Color::LightRed)
            } else {
                Style::default().fg(Color::Gray)
            });
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        let search = if self.query.is_empty() {
            Line::from(Span::styled(
                format!("🔍 {SEARCH_PLACEHOLDER}"),
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(format!("🔍 {}", self.query))
        };
        buf.set_line(chunks[0].x, chunks[0].y, &search, chunks[0].width);

        let stores = self.visible();
        if stores.is_empty() {
            let empty = Line::from(Span::styled("No matches", Style::default().fg(Color::DarkGray)));
            buf.set_line(chunks[1].x, chunks[1].y, &empty, chunks[1].width);
        }

        let mut y = chunks[1].y;
        for (i, store) in stores.iter().enumerate() {
            if y + 1 >= chunks[1].bottom() {
                break;
            }
            for line in self.store_lines(store, self.has_focus && i == self.cursor) {
                buf.set_line(chunks[1].x, y, &line, chunks[1].width);
                y += 1;
            }
            y += 1;
        }

        let hint = Line::from(Span::styled(
            "Enter chat · Ctrl+N new chat",
            Style::default().fg(Color::DarkGray),
        ));
        buf.set_line(chunks[2].x, chunks[2].y, &hint, chunks[2].width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_filters_the_list() {
        let mut sidebar = StoreSidebar::new();
        for c in "compass".chars() {
            sidebar.handle_key(key(KeyCode::Char(c)));
        }
        let names: Vec<_> = sidebar.visible().iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Nautical Treasures"]);
        assert_eq!(sidebar.handle_key(key(KeyCode::Enter)), SidebarAction::Select("1"));
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut sidebar = StoreSidebar::new();
        for _ in 0..10 {
            sidebar.handle_key(key(KeyCode::Down));
        }
        assert_eq!(sidebar.handle_key(key(KeyCode::Enter)), SidebarAction::Select("5"));

        sidebar.handle_key(key(KeyCode::Up));
        assert_eq!(sidebar.handle_key(key(KeyCode::Enter)), SidebarAction::Select("4"));
    }

    #[test]
    fn enter_with_no_matches_does_nothing() {
        let mut sidebar = StoreSidebar::new();
        for c in "zzz".chars() {
            sidebar.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(sidebar.handle_key(key(KeyCode::Enter)), SidebarAction::None);

        sidebar.handle_key(key(KeyCode::Esc));
        assert!(sidebar.query.is_empty());
        assert_eq!(sidebar.visible().len(), 5);
    }

    #[test]
    fn ctrl_n_starts_new_chat() {
        let mut sidebar = StoreSidebar::new();
        let action = sidebar.handle_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL));
        assert_eq!(action, SidebarAction::NewChat);
    }
}

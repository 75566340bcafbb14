use crate::catalog::{MARKETPLACE_NAME, MARKETPLACE_TAGLINE};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Paragraph, Widget},
};

/// Full-screen title card shown at startup
pub struct SplashScreen;

impl Widget for SplashScreen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Block::default()
            .style(Style::default().bg(Color::Rgb(234, 88, 12)))
            .render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Length(4),
                Constraint::Min(0),
            ])
            .split(area);

        let text = vec![
            Line::styled(
                MARKETPLACE_NAME,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Line::from(""),
            Line::styled(
                MARKETPLACE_TAGLINE,
                Style::default().fg(Color::White).add_modifier(Modifier::ITALIC),
            ),
        ];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .render(rows[1], buf);
    }
}

use crate::catalog::UserProfile;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Modal showing the signed-in user's details
pub struct ProfileDialog<'a> {
    profile: &'a UserProfile,
}

impl<'a> ProfileDialog<'a> {
    pub fn new(profile: &'a UserProfile) -> Self {
        Self { profile }
    }

    /// Centered rectangle of at most `width` x `height` inside `area`
    pub fn area(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        }
    }
}

impl Widget for ProfileDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dialog = Self::area(area, 46, 9);
        Clear.render(dialog, buf);

        let label = Style::default().fg(Color::DarkGray);
        let lines = vec![
            Line::from(Span::styled(
                self.profile.name,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(self.profile.email),
            Line::from(""),
            Line::from(Span::styled("Member Since", label)),
            Line::from(self.profile.member_since),
            Line::from(""),
            Line::from(Span::styled("Esc to close", label)),
        ];

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("User Profile")
                    .border_style(Style::default().fg(Color::LightRed)),
            )
            .render(dialog, buf);
    }
}

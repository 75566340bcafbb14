//! Conversation history display component

use crate::events::{Message, Sender};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Read-only view over the session's messages
pub struct ConversationHistory<'a> {
    messages: &'a [Message],
    typing: Option<Line<'static>>,
}

impl<'a> ConversationHistory<'a> {
    pub fn new(messages: &'a [Message]) -> Self {
        Self {
            messages,
            typing: None,
        }
    }

    /// Show a trailing "is typing" line under the last message
    pub fn with_typing(mut self, line: Option<Line<'static>>) -> Self {
        self.typing = line;
        self
    }

    /// Render a single message into lines
    fn render_message(&self, message: &Message, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let timestamp = message.timestamp.with_timezone(&chrono::Local).format("%H:%M");
        let header = format!("{} · {}", message.author, timestamp);
        lines.push(Line::from(vec![Span::styled(
            header,
            sender_style(message.sender).add_modifier(Modifier::BOLD),
        )]));

        if let Some(text) = &message.text {
            for content_line in wrap_text(text, width.saturating_sub(2) as usize) {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(content_line, sender_style(message.sender)),
                ]));
            }
        }

        if let Some(image) = &message.image {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    format!("[image: {}]", image.file_name),
                    Style::default().fg(Color::Magenta),
                ),
            ]));
        }

        lines
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("Messages");

        let inner_area = block.inner(area);
        block.render(area, buf);

        let mut all_lines: Vec<Line> = Vec::new();
        for message in self.messages {
            all_lines.extend(self.render_message(message, inner_area.width));
            all_lines.push(Line::from(""));
        }
        if let Some(typing) = self.typing.clone() {
            all_lines.push(typing);
        }

        // Keep the newest lines in view.
        let height = inner_area.height as usize;
        let start = all_lines.len().saturating_sub(height);

        for (i, line) in all_lines[start..].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

fn sender_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::Blue),
        Sender::Store => Style::default().fg(Color::LightRed),
        Sender::Assistant => Style::default().fg(Color::Green),
    }
}

/// Wrap text to fit within the given width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = current_line.chars().count() + word.chars().count() + 1;
            if current_line.is_empty() || needed <= width {
                if !current_line.is_empty() {
                    current_line.push(' ');
                }
                current_line.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current_line));
                current_line.push_str(word);
            }
        }
        lines.push(current_line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ImageBlob;

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("free shipping on orders over fifty", 12);
        assert!(lines.iter().all(|l| l.chars().count() <= 12));
        assert_eq!(lines.join(" "), "free shipping on orders over fifty");
    }

    #[test]
    fn wrap_keeps_explicit_newlines() {
        assert_eq!(wrap_text("a\nb", 10), vec!["a", "b"]);
    }

    #[test]
    fn image_message_renders_file_name() {
        let message = Message::image(
            Sender::User,
            "Jack Sparrow",
            ImageBlob::from_path("/tmp/compass.png"),
        );
        let history = ConversationHistory::new(std::slice::from_ref(&message));
        let lines = history.render_message(&message, 40);

        let text: String = lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        assert!(text.contains("Jack Sparrow"));
        assert!(text.contains("[image: compass.png]"));
    }

    #[test]
    fn newest_lines_stay_visible() {
        let messages: Vec<_> = (0..20)
            .map(|i| Message::text(Sender::Store, "Ocean Apparel", format!("line {i}")))
            .collect();
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        ConversationHistory::new(&messages).render(area, &mut buf);

        let rendered: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("line 19"));
        assert!(!rendered.contains("line 0 "));
    }

    #[test]
    fn label_uses_author_recorded_on_the_message() {
        let messages = vec![
            Message::text(Sender::Store, "Nautical Treasures", "Welcome aboard"),
            Message::text(Sender::Store, "Ocean Apparel", "Late reply"),
        ];
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        ConversationHistory::new(&messages).render(area, &mut buf);

        let rendered: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("Nautical Treasures ·"));
        assert!(rendered.contains("Ocean Apparel ·"));
    }
}

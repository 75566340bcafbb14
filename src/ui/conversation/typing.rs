use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use std::time::{Duration, Instant};

/// "... is typing" indicator shown while a reply is scheduled
#[derive(Debug, Clone)]
pub struct TypingIndicator {
    started: Option<Instant>,
}

impl Default for TypingIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl TypingIndicator {
    pub fn new() -> Self {
        Self { started: None }
    }

    /// Begin animating; keeps the original start if already running
    pub fn start(&mut self) {
        self.started.get_or_insert_with(Instant::now);
    }

    pub fn stop(&mut self) {
        self.started = None;
    }

    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }

    /// Line to draw under the history, if the indicator is running
    pub fn line(&self, party: &str) -> Option<Line<'static>> {
        let started = self.started?;
        let dots = dots_for(started.elapsed());

        Some(Line::from(vec![
            Span::styled(
                format!("{party} is typing"),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
            Span::styled(dots, Style::default().fg(Color::Yellow)),
        ]))
    }
}

fn dots_for(elapsed: Duration) -> &'static str {
    match (elapsed.as_millis() / 300) % 4 {
        0 => ".",
        1 => "..",
        2 => "...",
        _ => "   ",
    }
}

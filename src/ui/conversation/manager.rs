use crate::catalog;
use crate::config::Config;
use crate::events::{ImageBlob, Message};
use crate::scheduler::ReplyScheduler;
use crate::session::{ChatSession, PendingReply, StaleReplyPolicy};
use crate::ui::conversation::{
    get_help_text, ConversationComposer, ConversationHistory, ParsedCommand, SlashCommand,
    TypingIndicator,
};
use crate::ui::conversation::composer::ConversationResult;
use crossterm::event::KeyEvent;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
    ShowProfile,
    /// A merchant was chosen, so narrow layouts may hide the store list
    StoreSelected,
}

/// Owns the chat session and wires user input to it
pub struct ConversationManager {
    session: ChatSession,
    scheduler: ReplyScheduler,
    composer: ConversationComposer,
    typing: TypingIndicator,
    awaiting_replies: usize,
    notice: Option<String>,
}

impl ConversationManager {
    /// Create the manager and the receiver scheduled replies arrive on
    pub fn new(config: &Config) -> (Self, mpsc::UnboundedReceiver<PendingReply>) {
        let (scheduler, reply_rx) = ReplyScheduler::new(config.reply_delay());
        let session = ChatSession::new(config.stale_replies);
        let mut manager = Self {
            composer: ConversationComposer::new(String::new()),
            session,
            scheduler,
            typing: TypingIndicator::new(),
            awaiting_replies: 0,
            notice: None,
        };
        manager.sync_composer();
        (manager, reply_rx)
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        match self.composer.handle_key(key) {
            ConversationResult::Submitted(text) => {
                self.submit(&text);
                ConversationAction::None
            }
            ConversationResult::Command(command) => self.handle_slash_command(command),
            ConversationResult::None => ConversationAction::None,
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.composer.paste(text);
    }

    /// Send composed text and pending images, then schedule the reply
    pub fn submit(&mut self, text: &str) {
        self.notice = None;
        match self.session.submit(text) {
            Some(reply) => {
                let generation = self.scheduler.schedule(reply).generation();
                debug!(generation, "reply pending");
                self.awaiting_replies += 1;
                self.typing.start();
            }
            None if !self.session.composer_enabled() => {
                self.notice = Some("Choose a merchant to start chatting".to_string());
            }
            None => {}
        }
    }

    /// Switch to a merchant. Returns false for unknown ids.
    pub fn select_store(&mut self, store_id: &str) -> bool {
        if !self.session.select_store(store_id) {
            return false;
        }
        self.conversation_replaced();
        info!(
            store = self.session.active_party_name(),
            generation = self.session.generation(),
            "chatting with store"
        );
        true
    }

    /// Start over with the assistant
    pub fn reset_conversation(&mut self) {
        self.session.reset_conversation();
        self.conversation_replaced();
        info!("conversation reset");
    }

    /// Queue local image files for the next message
    pub fn attach_paths<'p>(&mut self, paths: impl IntoIterator<Item = &'p str>) {
        let files: Vec<_> = paths.into_iter().map(ImageBlob::from_path).collect();
        if files.is_empty() {
            self.notice = Some("Usage: /attach <path> [path...]".to_string());
            return;
        }

        let added = self.session.attach_images(files);
        self.notice = Some(if added == 0 {
            "Choose a merchant before attaching images".to_string()
        } else {
            format!("{added} image(s) ready to send")
        });
    }

    /// Discard a pending image by zero-based index
    pub fn remove_attachment(&mut self, index: usize) {
        self.notice = self
            .session
            .remove_attachment(index)
            .map(|removed| format!("Removed {}", removed.file_name));
    }

    /// Append a reply whose timer fired
    pub fn deliver_reply(&mut self, reply: PendingReply) {
        self.awaiting_replies = self.awaiting_replies.saturating_sub(1);
        if self.awaiting_replies == 0 {
            self.typing.stop();
        }
        self.session.deliver_reply(reply);
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn messages(&self) -> &[Message] {
        self.session.messages()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_waiting_for_reply(&self) -> bool {
        self.awaiting_replies > 0
    }

    /// Set focus state
    pub fn set_focus(&mut self, has_focus: bool) {
        self.composer.set_focus(has_focus);
    }

    fn conversation_replaced(&mut self) {
        self.composer.clear();
        self.notice = None;
        if self.session.stale_replies() == StaleReplyPolicy::Drop {
            self.scheduler.cancel_all();
            self.awaiting_replies = 0;
            self.typing.stop();
        }
        self.sync_composer();
    }

    fn sync_composer(&mut self) {
        self.composer.set_enabled(self.session.composer_enabled());
        let title = match self.session.active_store() {
            Some(store) => format!("Message {}", store.name),
            None => "Hi! Amy at your service".to_string(),
        };
        self.composer.set_title(title);
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, command: ParsedCommand) -> ConversationAction {
        debug!(command = command.command.command(), "slash command");
        self.notice = None;

        match command.command {
            SlashCommand::Attach => {
                self.attach_paths(command.paths());
                ConversationAction::None
            }
            SlashCommand::Detach => {
                match command.attachment_index() {
                    Some(index) => self.remove_attachment(index),
                    None => self.notice = Some("Usage: /detach <number>".to_string()),
                }
                ConversationAction::None
            }
            SlashCommand::Store => {
                let resolved = command.argument().and_then(catalog::resolve_store);
                match resolved {
                    Some(store) if self.select_store(store.id) => ConversationAction::StoreSelected,
                    _ => {
                        self.notice = Some(format!(
                            "No store matches '{}'",
                            command.argument().unwrap_or_default()
                        ));
                        ConversationAction::None
                    }
                }
            }
            SlashCommand::New => {
                self.reset_conversation();
                ConversationAction::None
            }
            SlashCommand::Profile => ConversationAction::ShowProfile,
            SlashCommand::Help => {
                self.notice = Some(get_help_text());
                ConversationAction::None
            }
            SlashCommand::Bye => ConversationAction::Exit,
        }
    }

    fn attachment_line(&self) -> Option<Line<'static>> {
        let pending = self.session.pending_attachments();
        if pending.is_empty() {
            return None;
        }

        let mut spans = vec![Span::styled("Attached: ", Style::default().fg(Color::DarkGray))];
        for (i, image) in pending.iter().enumerate() {
            spans.push(Span::styled(
                format!("[{}] {}  ", i + 1, image.file_name),
                Style::default().fg(Color::Magenta),
            ));
        }
        Some(Line::from(spans))
    }

    /// Render the history, pending attachments, notices and composer
    pub fn render_conversation_ui(&self, area: Rect, buf: &mut Buffer) {
        let attachments = self.attachment_line();
        let notice_lines: Vec<&str> = self.notice.as_deref().map(|n| n.lines().collect()).unwrap_or_default();
        let status_height = notice_lines.len() as u16 + u16::from(attachments.is_some());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),                // History
                Constraint::Length(status_height), // Attachments and notices
                Constraint::Length(3),             // Composer
            ])
            .split(area);

        ConversationHistory::new(self.session.messages())
            .with_typing(self.typing.line(self.session.active_party_name()))
            .render(chunks[0], buf);

        let mut y = chunks[1].y;
        if let Some(line) = attachments {
            buf.set_line(chunks[1].x, y, &line, chunks[1].width);
            y += 1;
        }
        for text in notice_lines {
            if y >= chunks[1].bottom() {
                break;
            }
            let line = Line::from(Span::styled(text.to_string(), Style::default().fg(Color::Yellow)));
            buf.set_line(chunks[1].x, y, &line, chunks[1].width);
            y += 1;
        }

        (&self.composer).render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Sender;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::time::Duration;

    fn test_config(stale_replies: StaleReplyPolicy) -> Config {
        Config {
            reply_delay_ms: 1000,
            stale_replies,
            ..Config::default()
        }
    }

    fn type_and_enter(manager: &mut ConversationManager, text: &str) -> ConversationAction {
        for c in text.chars() {
            manager.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        manager.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
    }

    #[tokio::test(start_paused = true)]
    async fn hello_gets_store_reply_after_delay() {
        let (mut manager, mut replies) = ConversationManager::new(&test_config(StaleReplyPolicy::Drop));
        assert!(manager.select_store("1"));

        manager.submit("hello, and what about shipping");
        assert_eq!(manager.messages().len(), 2);
        assert!(manager.is_waiting_for_reply());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(replies.try_recv().is_err());

        let reply = replies.recv().await.expect("reply scheduled");
        manager.deliver_reply(reply);

        let last = manager.messages().last().unwrap();
        assert_eq!(last.sender, Sender::Store);
        assert_eq!(
            last.text.as_deref(),
            Some("Hello! Welcome to Nautical Treasures. How can I help you today?")
        );
        assert!(!manager.is_waiting_for_reply());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_pending_reply() {
        let (mut manager, mut replies) = ConversationManager::new(&test_config(StaleReplyPolicy::Drop));
        manager.select_store("2");
        manager.submit("Do you sell towels?");
        manager.reset_conversation();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(replies.try_recv().is_err());
        assert_eq!(manager.messages().len(), 1);
        assert_eq!(manager.messages()[0].sender, Sender::Assistant);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_store_cancels_pending_reply() {
        let (mut manager, mut replies) = ConversationManager::new(&test_config(StaleReplyPolicy::Drop));
        assert!(manager.select_store("1"));
        manager.submit("hello");
        assert!(manager.is_waiting_for_reply());

        assert!(manager.select_store("2"));
        assert!(!manager.is_waiting_for_reply());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(replies.try_recv().is_err());
        assert_eq!(manager.messages().len(), 1);
        assert_eq!(
            manager.messages()[0].text.as_deref(),
            Some("Welcome to Ocean Apparel customer service! How can we help you today?")
        );
        assert_eq!(manager.messages()[0].author, "Ocean Apparel");
    }

    #[tokio::test(start_paused = true)]
    async fn keep_policy_reply_keeps_original_store_label() {
        let (mut manager, mut replies) = ConversationManager::new(&test_config(StaleReplyPolicy::Keep));
        manager.select_store("1");
        manager.submit("hello");
        manager.select_store("2");

        let reply = replies.recv().await.expect("reply still scheduled");
        manager.deliver_reply(reply);
        let last = manager.messages().last().unwrap();
        assert_eq!(last.author, "Nautical Treasures");

        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        manager.render_conversation_ui(area, &mut buf);
        let rendered: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("Nautical Treasures ·"));
    }

    #[tokio::test(start_paused = true)]
    async fn keep_policy_lets_reply_land_after_reset() {
        let (mut manager, mut replies) = ConversationManager::new(&test_config(StaleReplyPolicy::Keep));
        manager.select_store("2");
        manager.submit("Do you sell towels?");
        manager.reset_conversation();

        let reply = replies.recv().await.expect("reply still scheduled");
        manager.deliver_reply(reply);
        assert_eq!(manager.messages().len(), 2);
    }

    #[tokio::test]
    async fn commands_drive_the_session() {
        let (mut manager, _replies) = ConversationManager::new(&test_config(StaleReplyPolicy::Drop));

        assert_eq!(type_and_enter(&mut manager, "/store Ocean Apparel"), ConversationAction::StoreSelected);
        assert_eq!(manager.session().active_store().map(|s| s.id), Some("2"));

        type_and_enter(&mut manager, "/attach a.png b.png c.png");
        assert_eq!(manager.session().pending_attachments().len(), 3);

        type_and_enter(&mut manager, "/detach 2");
        let names: Vec<_> = manager
            .session()
            .pending_attachments()
            .iter()
            .map(|i| i.file_name.clone())
            .collect();
        assert_eq!(names, vec!["a.png", "c.png"]);

        assert_eq!(type_and_enter(&mut manager, "/profile"), ConversationAction::ShowProfile);
        assert_eq!(type_and_enter(&mut manager, "/bye"), ConversationAction::Exit);
    }

    #[tokio::test]
    async fn unknown_store_leaves_a_notice() {
        let (mut manager, _replies) = ConversationManager::new(&test_config(StaleReplyPolicy::Drop));
        assert_eq!(type_and_enter(&mut manager, "/store Atlantis"), ConversationAction::None);
        assert!(manager.session().active_store().is_none());
        assert_eq!(manager.notice(), Some("No store matches 'Atlantis'"));
    }

    #[tokio::test]
    async fn attaching_before_selecting_a_store_is_refused() {
        let (mut manager, _replies) = ConversationManager::new(&test_config(StaleReplyPolicy::Drop));
        manager.attach_paths(["map.png"]);
        assert!(manager.session().pending_attachments().is_empty());
        assert_eq!(manager.notice(), Some("Choose a merchant before attaching images"));
    }
}

use crate::catalog;
use crate::config::Config;
use crate::events::{AppEvent, TuiEvent};
use crate::session::PendingReply;
use crate::ui::conversation::{ConversationAction, ConversationManager};
use crate::ui::profile::ProfileDialog;
use crate::ui::sidebar::{SidebarAction, StoreSidebar};
use crate::ui::splash::SplashScreen;
use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const SIDEBAR_WIDTH: u16 = 34;
const TICK: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Sidebar,
    Composer,
}

/// Top-level terminal application state
pub struct App {
    conversation: ConversationManager,
    sidebar: StoreSidebar,
    focus: Focus,
    sidebar_visible: bool,
    show_splash: bool,
    show_profile: bool,
    should_quit: bool,
    width: u16,
    narrow_width: u16,
}

impl App {
    pub fn new(config: &Config, width: u16) -> (Self, mpsc::UnboundedReceiver<PendingReply>) {
        let (conversation, replies) = ConversationManager::new(config);
        let mut app = Self {
            conversation,
            sidebar: StoreSidebar::new(),
            focus: Focus::Sidebar,
            sidebar_visible: true,
            show_splash: config.ui.show_splash,
            show_profile: false,
            should_quit: false,
            width,
            narrow_width: config.ui.narrow_width,
        };
        app.apply_focus();
        (app, replies)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Apply one event to the app state
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tui(TuiEvent::Key(key)) => self.handle_key(key),
            AppEvent::Tui(TuiEvent::Paste(text)) => {
                if self.focus == Focus::Composer && !self.show_splash && !self.show_profile {
                    self.conversation.handle_paste(&text);
                }
            }
            AppEvent::Tui(TuiEvent::Resize(width, _)) => {
                self.width = width;
            }
            AppEvent::ReplyDue(reply) => self.conversation.deliver_reply(reply),
            AppEvent::SplashElapsed => self.show_splash = false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.show_splash {
            self.show_splash = false;
            return;
        }

        if self.show_profile {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.show_profile = false;
            }
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.toggle_focus();
                return;
            }
            KeyCode::Char('b') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.sidebar_visible = !self.sidebar_visible;
                if !self.sidebar_visible {
                    self.focus = Focus::Composer;
                }
                self.apply_focus();
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Sidebar => match self.sidebar.handle_key(key) {
                SidebarAction::Select(store_id) => {
                    if self.conversation.select_store(store_id) {
                        self.store_selected();
                    }
                }
                SidebarAction::NewChat => {
                    self.conversation.reset_conversation();
                    self.sidebar.set_active(None);
                }
                SidebarAction::None => {}
            },
            Focus::Composer => match self.conversation.handle_key(key) {
                ConversationAction::Exit => self.should_quit = true,
                ConversationAction::ShowProfile => self.show_profile = true,
                ConversationAction::StoreSelected => self.store_selected(),
                ConversationAction::None => {
                    let active = self.conversation.session().active_store().map(|s| s.id);
                    self.sidebar.set_active(active);
                }
            },
        }
    }

    fn store_selected(&mut self) {
        let active = self.conversation.session().active_store().map(|s| s.id);
        self.sidebar.set_active(active);
        if self.width < self.narrow_width {
            debug!(width = self.width, "narrow terminal, collapsing store list");
            self.sidebar_visible = false;
        }
        self.focus = Focus::Composer;
        self.apply_focus();
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Composer,
            Focus::Composer if self.sidebar_visible => Focus::Sidebar,
            Focus::Composer => Focus::Composer,
        };
        self.apply_focus();
    }

    fn apply_focus(&mut self) {
        self.sidebar.set_focus(self.focus == Focus::Sidebar);
        self.conversation.set_focus(self.focus == Focus::Composer);
    }

    /// Draw the whole screen
    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.size();

        if self.show_splash {
            frame.render_widget(SplashScreen, area);
            return;
        }

        let chat_area = if self.sidebar_visible {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
                .split(area);
            frame.render_widget(&self.sidebar, columns[0]);
            columns[1]
        } else {
            area
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(5)])
            .split(chat_area);

        self.draw_header(frame, rows[0]);
        self.conversation.render_conversation_ui(rows[1], frame.buffer_mut());

        if self.show_profile {
            frame.render_widget(ProfileDialog::new(catalog::user_profile()), area);
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let title = match self.conversation.session().active_store() {
            Some(store) => store.name.to_string(),
            None => "Hi! Amy at your service".to_string(),
        };
        let user = format!("{} · /profile", catalog::user_profile().name);

        let padding = (area.width as usize).saturating_sub(title.chars().count() + user.chars().count());
        let line = Line::from(vec![
            Span::styled(title, Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD)),
            Span::raw(" ".repeat(padding)),
            Span::styled(user, Style::default().fg(Color::DarkGray)),
        ]);
        frame.buffer_mut().set_line(area.x, area.y, &line, area.width);
    }
}

fn to_tui_event(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(key) => Some(TuiEvent::Key(key)),
        Event::Paste(text) => Some(TuiEvent::Paste(text)),
        Event::Resize(width, height) => Some(TuiEvent::Resize(width, height)),
        _ => None,
    }
}

/// Run the terminal UI until the user quits
pub async fn run(config: Config) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, &config).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn run_loop(terminal: &mut Tui, config: &Config) -> Result<()> {
    let size = terminal.size().context("Failed to read terminal size")?;
    let (mut app, mut replies) = App::new(config, size.width);
    info!(width = size.width, "terminal UI started");

    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);
    let splash = tokio::time::sleep(config.splash_duration());
    tokio::pin!(splash);
    let mut splash_pending = config.ui.show_splash;

    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .context("Failed to draw frame")?;

        let event = tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => to_tui_event(event).map(AppEvent::Tui),
                Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                None => break,
            },
            Some(reply) = replies.recv() => Some(AppEvent::ReplyDue(reply)),
            _ = &mut splash, if splash_pending => {
                splash_pending = false;
                Some(AppEvent::SplashElapsed)
            }
            _ = tick.tick() => None,
        };

        if let Some(event) = event {
            app.handle_event(event);
        }
        if app.should_quit() {
            break;
        }
    }

    info!("terminal UI stopped");
    Ok(())
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
        default_hook(info);
    }));

    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

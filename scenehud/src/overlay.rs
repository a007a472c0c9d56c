//! # Overlay TUI
//!
//! The always-on-top spy window, terminal edition: a live scrolling log of
//! lifecycle notes with a status panel, running on its own thread and fed by
//! a bounded channel from the designated thread.
//!
//! ## Keys
//!
//! - `p` push, `o` pop, `m` present modal, `x` dismiss modal, `t` detach
//!   root, `n` churn: host operations, relayed to the designated thread
//! - `d` presented-scene dump, `c` clear log, `y` yank selected line
//! - arrows / PgUp / PgDn / Home / End scroll, `?` help, `q` quit
//!
//! The log sticks to the bottom until the user scrolls up; `End` re-sticks.

use std::collections::HashSet;
use std::io;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Terminal,
};

use scenehud_common::NoteKind;

use crate::domain::OverlayError;
use crate::notes::{LogData, OverlayMsg, UiCommand};
use crate::tracking::TrackerStats;

mod log_view;
mod status;
mod theme;

use log_view::LogView;
use status::StatusPanel;
use theme::{CAUTION_AMBER, HUD_GREEN, INFO_DIM};

const STYLE_KEY: Style = Style::new().fg(CAUTION_AMBER);
const STYLE_DIM: Style = Style::new().fg(INFO_DIM);

/// Overlay application state.
struct App {
    log_data: LogData,
    stats: TrackerStats,
    dropped: u64,
    view: LogView,
    dump: Option<String>,
    show_help: bool,
    footer_msg: Option<String>,
    should_quit: bool,
}

impl App {
    fn new(ignored: HashSet<NoteKind>) -> Self {
        Self {
            log_data: LogData::new(ignored),
            stats: TrackerStats::default(),
            dropped: 0,
            view: LogView::new(),
            dump: None,
            show_help: false,
            footer_msg: None,
            should_quit: false,
        }
    }

    /// Drain pending messages. Returns false once the designated thread is
    /// gone and the overlay should wind down.
    fn drain(&mut self, rx: &Receiver<OverlayMsg>) -> bool {
        loop {
            match rx.try_recv() {
                Ok(OverlayMsg::Note(note)) => {
                    self.log_data.add_note(note);
                }
                Ok(OverlayMsg::Stats { stats, dropped }) => {
                    self.stats = stats;
                    self.dropped = dropped;
                }
                Ok(OverlayMsg::Dump(text)) => self.dump = Some(text),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers, cmd_tx: &Sender<UiCommand>) {
        self.footer_msg = None;

        // Modal overlays swallow everything except their dismiss keys
        if self.dump.is_some() || self.show_help {
            if matches!(key, KeyCode::Esc | KeyCode::Char('q' | 'd' | '?')) {
                self.dump = None;
                self.show_help = false;
            }
            return;
        }

        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.quit(cmd_tx);
            return;
        }

        let relay = |cmd: UiCommand| {
            let _ = cmd_tx.send(cmd);
        };
        match key {
            KeyCode::Char('q') => self.quit(cmd_tx),
            KeyCode::Char('?') => self.show_help = true,

            // Host operations
            KeyCode::Char('p') => relay(UiCommand::Push),
            KeyCode::Char('o') => relay(UiCommand::Pop),
            KeyCode::Char('m') => relay(UiCommand::PresentModal),
            KeyCode::Char('x') => relay(UiCommand::DismissModal),
            KeyCode::Char('t') => relay(UiCommand::DetachRoot),
            KeyCode::Char('n') => relay(UiCommand::Churn),
            KeyCode::Char('d') => relay(UiCommand::RequestDump),

            // Log operations
            KeyCode::Char('c') => {
                self.log_data.clear();
                self.view.reset();
            }
            KeyCode::Char('y') => self.yank(),
            KeyCode::Up => self.view.scroll_up(1),
            KeyCode::Down => self.view.scroll_down(1, self.log_data.len()),
            KeyCode::PageUp => self.view.scroll_up(10),
            KeyCode::PageDown => self.view.scroll_down(10, self.log_data.len()),
            KeyCode::Home => self.view.jump_top(),
            KeyCode::End => self.view.jump_bottom(self.log_data.len()),
            _ => {}
        }
    }

    fn quit(&mut self, cmd_tx: &Sender<UiCommand>) {
        let _ = cmd_tx.send(UiCommand::Quit);
        self.should_quit = true;
    }

    fn yank(&mut self) {
        let Some(note) = self.view.selected_note(&self.log_data) else {
            return;
        };
        let line = format!(
            "[{:>9.3}s] {} {} {}",
            note.elapsed_secs,
            note.kind.label(),
            note.source.label(),
            note.sender
        );
        self.footer_msg = Some(match arboard::Clipboard::new().and_then(|mut c| c.set_text(line))
        {
            Ok(()) => "yanked".to_string(),
            Err(e) => format!("clipboard unavailable: {e}"),
        });
    }

    fn render(&mut self, f: &mut ratatui::Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(f.area());
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(24)])
            .split(rows[0]);

        self.view.render(f, cols[0], &self.log_data);
        StatusPanel::new(&self.stats, &self.log_data, self.dropped).render(f, cols[1]);
        self.render_footer(f, rows[1]);

        if self.show_help {
            render_modal(f, "Help", HELP_TEXT);
        } else if let Some(dump) = &self.dump {
            render_modal(f, "Presented Scenes", dump);
        }
    }

    fn render_footer(&self, f: &mut ratatui::Frame, area: Rect) {
        let line = if let Some(msg) = &self.footer_msg {
            Line::styled(format!(" {msg}"), STYLE_KEY)
        } else {
            Line::styled(" p push  o pop  m modal  x dismiss  t detach  n churn  d dump  ? help  q quit", STYLE_DIM)
        };
        f.render_widget(Paragraph::new(line), area);
    }
}

const HELP_TEXT: &str = "\
 Host operations
   p  push a scene          o  pop the top scene
   m  present a modal       x  dismiss the modal
   t  detach the root nav   n  churn an arena slot

 Log
   c  clear                 y  yank selected line
   d  presented-scene dump  arrows/PgUp/PgDn/Home/End scroll

 q or Ctrl-C quits.";

fn render_modal(f: &mut ratatui::Frame, title: &str, text: &str) {
    let area = centered_rect(70, 60, f.area());
    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(HUD_GREEN)),
    );
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Run the overlay until quit or until the designated thread hangs up.
///
/// # Errors
///
/// Terminal setup or I/O failure.
pub fn run_live(
    rx: Receiver<OverlayMsg>,
    cmd_tx: Sender<UiCommand>,
    ignored: HashSet<NoteKind>,
) -> Result<(), OverlayError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(ignored);

    let result = (|| -> Result<(), OverlayError> {
        loop {
            let connected = app.drain(&rx);
            terminal.draw(|f| app.render(f))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        app.handle_key(key.code, key.modifiers, &cmd_tx);
                    }
                }
            }
            if app.should_quit || !connected {
                return Ok(());
            }
        }
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

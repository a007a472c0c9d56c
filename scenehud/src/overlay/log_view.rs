//! Scrolling note log view.
//!
//! Sticks to the bottom while the user is at the bottom, exactly the
//! behavior of the spy window this descends from, and stops following the
//! moment they scroll up, until they return to the last line.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use scenehud_common::Note;

use super::theme::{note_color, HUD_GREEN, INFO_DIM};
use crate::notes::LogData;

pub struct LogView {
    /// Selected line (absolute index into the log). Follows the tail while
    /// stuck to the bottom.
    selected: usize,
    stick_to_bottom: bool,
    state: ListState,
}

impl LogView {
    #[must_use]
    pub fn new() -> Self {
        Self { selected: 0, stick_to_bottom: true, state: ListState::default() }
    }

    pub fn scroll_up(&mut self, by: usize) {
        self.selected = self.selected.saturating_sub(by);
        self.stick_to_bottom = false;
    }

    pub fn scroll_down(&mut self, by: usize, len: usize) {
        if len == 0 {
            return;
        }
        self.selected = (self.selected + by).min(len - 1);
        if self.selected == len - 1 {
            self.stick_to_bottom = true;
        }
    }

    pub fn jump_top(&mut self) {
        self.selected = 0;
        self.stick_to_bottom = false;
    }

    pub fn jump_bottom(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
        self.stick_to_bottom = true;
    }

    /// Called after the log was cleared.
    pub fn reset(&mut self) {
        self.selected = 0;
        self.stick_to_bottom = true;
    }

    /// The note under the cursor, for yanking.
    #[must_use]
    pub fn selected_note<'a>(&self, log: &'a LogData) -> Option<&'a Note> {
        log.notes().get(self.selected)
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, log: &LogData) {
        let len = log.len();
        if self.stick_to_bottom {
            self.selected = len.saturating_sub(1);
        } else if len > 0 {
            self.selected = self.selected.min(len - 1);
        }

        let items: Vec<ListItem> = log
            .notes()
            .iter()
            .map(|note| {
                let color = note_color(note.kind, note.source);
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:>9.3}s ", note.elapsed_secs),
                        Style::default().fg(INFO_DIM),
                    ),
                    Span::styled(format!("{:<18}", note.kind.label()), Style::default().fg(color)),
                    Span::styled(note.sender.clone(), Style::default().fg(color)),
                ]))
            })
            .collect();

        self.state.select(if len == 0 { None } else { Some(self.selected) });

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Notes ({len})"))
                    .border_style(Style::default().fg(HUD_GREEN)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(list, area, &mut self.state);
    }
}

impl Default for LogView {
    fn default() -> Self {
        Self::new()
    }
}

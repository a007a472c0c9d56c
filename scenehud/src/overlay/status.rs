use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::theme::{CAUTION_AMBER, HUD_GREEN, INFO_DIM};
use crate::notes::LogData;
use crate::tracking::TrackerStats;

/// Tracker status panel
pub struct StatusPanel {
    live: u64,
    presented: u64,
    dismissed: u64,
    guard_noops: u64,
    table_len: usize,
    sweeps: u64,
    note_count: usize,
    ignored_count: u64,
    dropped: u64,
    has_warnings: bool,
}

impl StatusPanel {
    #[must_use]
    pub fn new(stats: &TrackerStats, log: &LogData, dropped: u64) -> Self {
        Self {
            live: stats.live(),
            presented: stats.presented,
            dismissed: stats.dismissed,
            guard_noops: stats.guard_noops,
            table_len: stats.table_len,
            sweeps: stats.sweeps,
            note_count: log.len(),
            ignored_count: log.ignored_count,
            dropped,
            has_warnings: dropped > 0,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let mut lines = vec![];

        let (status_text, status_color) = if self.has_warnings {
            ("[!] DROPPING", CAUTION_AMBER)
        } else {
            ("[-] NOMINAL", HUD_GREEN)
        };
        lines.push(Line::from(Span::styled(
            format!(" {status_text}"),
            Style::default().fg(status_color).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));

        let stat = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!(" {label:<9}"), Style::default().fg(INFO_DIM)),
                Span::styled(value, Style::default().fg(HUD_GREEN)),
            ])
        };
        lines.push(stat("Live", self.live.to_string()));
        lines.push(stat("Presented", self.presented.to_string()));
        lines.push(stat("Dismissed", self.dismissed.to_string()));
        lines.push(stat("Noise", self.guard_noops.to_string()));
        lines.push(Line::from(""));
        lines.push(stat("Notes", self.note_count.to_string()));
        lines.push(stat("Ignored", self.ignored_count.to_string()));
        lines.push(stat("Table", self.table_len.to_string()));
        lines.push(stat("Sweeps", self.sweeps.to_string()));
        if self.dropped > 0 {
            lines.push(Line::from(Span::styled(
                format!(" Dropped  {}", self.dropped),
                Style::default().fg(CAUTION_AMBER),
            )));
        }

        let border_color = if self.has_warnings { CAUTION_AMBER } else { HUD_GREEN };
        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Status")
                .border_style(Style::default().fg(border_color)),
        );
        f.render_widget(paragraph, area);
    }
}

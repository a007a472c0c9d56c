//! Overlay color theme
//!
//! HUD-inspired color scheme for the terminal interface

use ratatui::style::Color;

use scenehud_common::{NoteKind, NoteSource};

// HUD color scheme
pub const HUD_GREEN: Color = Color::Rgb(0, 255, 0);
pub const CRITICAL_RED: Color = Color::Rgb(255, 0, 0);
pub const CAUTION_AMBER: Color = Color::Rgb(255, 191, 0);
pub const INFO_DIM: Color = Color::Rgb(0, 180, 0);
pub const PLATFORM_BLUE: Color = Color::Rgb(80, 160, 255);

/// Color for one log line. Milestones stand out from the raw stream the way
/// the two notification families did in the window this overlay descends
/// from: presentations amber, dismissals red, raw scene traffic dim green,
/// platform signals blue.
#[must_use]
pub fn note_color(kind: NoteKind, source: NoteSource) -> Color {
    match (kind, source) {
        (NoteKind::DidPresent, _) => CAUTION_AMBER,
        (NoteKind::DidDismiss, _) => CRITICAL_RED,
        (_, NoteSource::Platform) => PLATFORM_BLUE,
        _ => INFO_DIM,
    }
}

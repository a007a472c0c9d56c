//! Headless-mode note and statistics formatting.

use scenehud_common::Note;

use super::normalizer::TrackerStats;

/// Print one note in headless mode.
pub fn display_note(note: &Note) {
    println!(
        "[{:>9.3}s] {:<18} {:<8} {}",
        note.elapsed_secs,
        note.kind.label(),
        note.source.label(),
        note.sender
    );
}

/// Print periodic statistics in headless mode.
pub fn display_stats(stats: &TrackerStats) {
    eprintln!(
        "stats: presented={} dismissed={} live={} noops={} table={} sweeps={}",
        stats.presented,
        stats.dismissed,
        stats.live(),
        stats.guard_noops,
        stats.table_len,
        stats.sweeps
    );
}

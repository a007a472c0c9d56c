//! JSON note-log exporter.

use std::collections::HashSet;
use std::io::Write;

use serde::Serialize;

use scenehud_common::{Note, NoteKind};

use crate::domain::ExportError;
use crate::tracking::TrackerStats;

#[derive(Serialize)]
struct NoteLogDump<'a> {
    version: &'a str,
    summary: &'a TrackerStats,
    note_count: usize,
    notes: &'a [Note],
}

/// Collects notes during the run and serializes them at exit.
pub struct LogExporter {
    notes: Vec<Note>,
    ignored: HashSet<NoteKind>,
}

impl LogExporter {
    #[must_use]
    pub fn new(ignored: HashSet<NoteKind>) -> Self {
        Self { notes: Vec::new(), ignored }
    }

    /// Append one note; ignored kinds are filtered here too, so the export
    /// matches what the overlay would have shown.
    pub fn append(&mut self, note: &Note) {
        if !self.ignored.contains(&note.kind) {
            self.notes.push(note.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Write the log as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Serialization or I/O failure.
    pub fn export<W: Write>(&self, writer: W, stats: &TrackerStats) -> Result<(), ExportError> {
        let dump = NoteLogDump {
            version: env!("CARGO_PKG_VERSION"),
            summary: stats,
            note_count: self.notes.len(),
            notes: &self.notes,
        };
        serde_json::to_writer_pretty(writer, &dump)?;
        Ok(())
    }
}

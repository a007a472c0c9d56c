//! CLI argument definitions

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use scenehud_common::{NoteKind, DEFAULT_SWEEP_THRESHOLD};

use crate::tracking::normalizer::ignore_set;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioArg {
    /// Guided tour over every lifecycle path, then interactive
    Tour,
    /// Arena-churn stress (slot reuse), then interactive
    Churn,
    /// No scripted steps; drive the host from the overlay keys
    Interactive,
}

#[derive(Parser)]
#[command(
    name = "scenehud",
    about = "Live scene lifecycle HUD: watch presents and dismisses as they happen",
    after_help = "\
EXAMPLES:
    scenehud                                 Guided tour in the overlay
    scenehud --scenario interactive          Drive the host from the keyboard
    scenehud --headless --export log.json    Scripted run, log dumped as JSON
    scenehud --sweep-threshold 4             Aggressive metadata reclamation"
)]
pub struct Args {
    /// Scripted scenario to run
    #[arg(long, value_enum, default_value_t = ScenarioArg::Tour)]
    pub scenario: ScenarioArg,

    /// Run without the overlay (requires --export)
    #[arg(long, requires = "export")]
    pub headless: bool,

    /// Dump the captured note log to FILE as JSON at exit
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Stop after N seconds (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub duration: u64,

    /// Mutating metadata-table operations between sweeps (debug knob)
    #[arg(long, value_name = "N", default_value_t = DEFAULT_SWEEP_THRESHOLD)]
    pub sweep_threshold: usize,

    /// Additional note kinds to drop from the log (repeatable)
    #[arg(long, value_name = "KIND")]
    pub ignore: Vec<String>,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// The effective ignore list: defaults plus `--ignore` extras.
    ///
    /// # Errors
    ///
    /// An unknown kind name (a usage error).
    pub fn ignored_kinds(&self) -> Result<HashSet<NoteKind>> {
        let mut extra = Vec::new();
        for name in &self.ignore {
            match NoteKind::from_label(name) {
                Some(kind) => extra.push(kind),
                None => bail!(
                    "unknown note kind '{name}'\n\nKnown kinds: {}",
                    NoteKind::ALL.map(|k| k.label()).join(", ")
                ),
            }
        }
        Ok(ignore_set(&extra))
    }
}

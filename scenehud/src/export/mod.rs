//! Note log export functionality
//!
//! Writes the captured (non-ignored) note log as JSON when the operator asks
//! for it with `--export`. An explicit dump at exit; nothing is ever read
//! back across runs.

pub mod json_log;

pub use json_log::LogExporter;

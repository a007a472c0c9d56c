//! Structured error types for scenehud
//!
//! Using thiserror for automatic Display implementation and error chaining.
//!
//! Install failures are configuration errors: they are surfaced once, at
//! startup, and abort the run. They are distinct from the normalizer's silent
//! guard no-ops (expected noise) and from observer invariant violations
//! (programming errors, which panic).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Method '{0}' does not exist on the scene base type")]
    MethodMissing(&'static str),

    #[error("Method '{0}' already has a replacement installed")]
    AlreadyInstalled(&'static str),
}

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Overlay requires a terminal (run with --headless --export FILE instead)")]
    NotATerminal,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write note log: {0}")]
    WriteFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

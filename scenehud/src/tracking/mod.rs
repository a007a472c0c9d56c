//! Lifecycle tracking core
//!
//! This module contains the observation pipeline between the host's raw
//! lifecycle dispatch and the overlay:
//! - Method replacement at the single designated startup point
//! - Raw-signal normalization into at-most-once presented/dismissed milestones
//! - Weak, sweep-reclaimed side table of per-scene tracking state
//! - Fan-out of notes to independent subscribers
//! - The presented-scene registry with its fatal ordering checks and dump

pub mod display;
pub mod fanout;
pub mod installer;
pub mod metadata;
pub mod normalizer;
pub mod registry;

// Re-export common types
pub use display::{display_note, display_stats};
pub use fanout::{BusNote, EventBus, KindFilter, SubscriberToken};
pub use installer::install_lifecycle_taps;
pub use metadata::{MetaEntry, MetadataTable};
pub use normalizer::{Tracker, TrackerStats};
pub use registry::PresentedRegistry;

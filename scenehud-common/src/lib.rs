//! # Shared Event Model (host ↔ tracker ↔ overlay)
//!
//! Defines the event vocabulary shared between the scene host, the lifecycle
//! tracker, and the overlay/export consumers. Everything here is plain data:
//! the host side owns the live scene tree, consumers only ever see these
//! records.
//!
//! ## Key Types
//!
//! - [`SceneId`] - Generation-tagged scene handle (slot index + generation)
//! - [`LifecycleEvent`] - Raw per-scene lifecycle signal, may repeat
//! - [`Milestone`] - Normalized at-most-once presented/dismissed signal
//! - [`NoteKind`] - Closed set of observable note kinds (replaces the
//!   string-named notification dispatch of the platforms this tool grew up on)
//! - [`Note`] - One line of the observable log
//!
//! The `serde` feature gates derive impls used by the export path; the crate
//! is dependency-free without it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Tuning Constants
// ============================================================================

/// Default number of mutating metadata-table operations between sweeps.
///
/// A sweep walks the whole table and reclaims entries whose scene is gone.
/// Lower values bound staleness tighter at higher amortized cost. Exposed as
/// `--sweep-threshold` for debugging.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 16;

/// Bound on the overlay event channel. Notes beyond this are dropped (and
/// counted) rather than blocking the designated thread.
pub const OVERLAY_CHANNEL_BOUND: usize = 1000;

// ============================================================================
// Scene Identity
// ============================================================================

/// Generation-tagged scene handle.
///
/// The `index` is a host arena slot and IS reused after a scene is dropped;
/// the `generation` is bumped on every reuse of a slot. Anything that stores
/// state keyed by scene identity must treat the bare index as unstable and
/// validate the full id (or a live back-reference) before trusting an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SceneId {
    pub index: u32,
    pub generation: u32,
}

impl SceneId {
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl core::fmt::Display for SceneId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "S{}.{}", self.index, self.generation)
    }
}

// ============================================================================
// Lifecycle Events
// ============================================================================

/// Raw lifecycle signal for one scene, as the host emits it.
///
/// These are noisy: a scene can appear and disappear any number of times, and
/// reparent callbacks interleave with them in host-defined order. Only the
/// normalizer's guard conditions give them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Appeared,
    Disappeared,
    /// The scene moved to a new parent container (`None` = detached from all).
    Reparented(Option<SceneId>),
}

/// Normalized lifecycle milestone, emitted at most once per tracked scene:
/// `Presented` on first appearance, `Dismissed` on final disappearance or
/// detachment, never `Dismissed` without a preceding `Presented`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Presented,
    Dismissed,
}

impl From<Milestone> for NoteKind {
    fn from(milestone: Milestone) -> Self {
        match milestone {
            Milestone::Presented => NoteKind::DidPresent,
            Milestone::Dismissed => NoteKind::DidDismiss,
        }
    }
}

// ============================================================================
// Observable Notes
// ============================================================================

/// Where a note came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NoteSource {
    /// Emitted on the designated thread by an installed scene method.
    Scene,
    /// Low-level platform channel, redispatched onto the designated thread.
    Platform,
}

impl NoteSource {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            NoteSource::Scene => "scene",
            NoteSource::Platform => "platform",
        }
    }
}

/// Closed set of note kinds observable on the bus.
///
/// Raw kinds mirror the installed methods one-to-one; milestone kinds are the
/// normalizer's output; platform kinds arrive from outside the scene host.
/// Consumers match on the kind instead of comparing notification name
/// strings, and the ignore list is a set-membership check over this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NoteKind {
    // Raw taps, one per installed method
    ViewDidLoad,
    ViewDidAppear,
    ViewDidDisappear,
    DidReparent,

    // Normalized milestones
    DidPresent,
    DidDismiss,

    // Platform signals
    MuteSwitchChanged,
    OrientationChanged,
}

impl NoteKind {
    /// Every kind, in display order.
    pub const ALL: [NoteKind; 8] = [
        NoteKind::ViewDidLoad,
        NoteKind::ViewDidAppear,
        NoteKind::ViewDidDisappear,
        NoteKind::DidReparent,
        NoteKind::DidPresent,
        NoteKind::DidDismiss,
        NoteKind::MuteSwitchChanged,
        NoteKind::OrientationChanged,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            NoteKind::ViewDidLoad => "ViewDidLoad",
            NoteKind::ViewDidAppear => "ViewDidAppear",
            NoteKind::ViewDidDisappear => "ViewDidDisappear",
            NoteKind::DidReparent => "DidReparent",
            NoteKind::DidPresent => "DidPresent",
            NoteKind::DidDismiss => "DidDismiss",
            NoteKind::MuteSwitchChanged => "MuteSwitchChanged",
            NoteKind::OrientationChanged => "OrientationChanged",
        }
    }

    /// Kinds dropped from the observable log unless explicitly enabled.
    /// Orientation churn is constant background noise on real devices.
    #[must_use]
    pub const fn ignored_by_default(self) -> bool {
        matches!(self, NoteKind::OrientationChanged)
    }

    /// True for the at-most-once normalized milestones.
    #[must_use]
    pub const fn is_milestone(self) -> bool {
        matches!(self, NoteKind::DidPresent | NoteKind::DidDismiss)
    }

    /// Parse a kind from its label (used by `--ignore`).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.label().eq_ignore_ascii_case(label))
    }
}

impl core::fmt::Display for NoteKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of the observable log.
///
/// `sender` is a human label, not an identity: the scene's title if it has
/// one, otherwise its id rendered as text (platform notes carry no sender at
/// all and say so). `elapsed_secs` is measured from tracker start.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Note {
    pub seq: u64,
    pub kind: NoteKind,
    pub sender: String,
    pub source: NoteSource,
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_id_display_shows_index_and_generation() {
        assert_eq!(SceneId::new(3, 2).to_string(), "S3.2");
    }

    #[test]
    fn labels_are_unique_and_roundtrip() {
        for kind in NoteKind::ALL {
            assert_eq!(NoteKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(NoteKind::from_label("didpresent"), Some(NoteKind::DidPresent));
        assert_eq!(NoteKind::from_label("NoSuchKind"), None);
    }

    #[test]
    fn milestones_map_onto_their_note_kinds() {
        assert_eq!(NoteKind::from(Milestone::Presented), NoteKind::DidPresent);
        assert_eq!(NoteKind::from(Milestone::Dismissed), NoteKind::DidDismiss);
    }

    #[test]
    fn rotation_noise_is_ignored_by_default() {
        assert!(NoteKind::OrientationChanged.ignored_by_default());
        assert!(!NoteKind::MuteSwitchChanged.ignored_by_default());
        assert!(!NoteKind::DidPresent.ignored_by_default());
    }
}

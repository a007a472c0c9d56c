//! # Presented-Scene Registry
//!
//! Bus subscriber that mirrors the normalized stream into an ordered record
//! of every presentation, and asserts the stream's contract while doing so.
//!
//! A duplicate `DidPresent`, a `DidPresent` for a scene it already saw
//! dismissed, or a `DidDismiss` with no live presentation are programming
//! errors in the interception setup. Everything downstream trusts the
//! normalized stream, so these panic instead of being tolerated. They are
//! not the normalizer's silent guard no-ops; by the time a milestone reaches
//! the bus the guards have already passed.
//!
//! Keyed by the full generation-tagged [`SceneId`], so a recycled slot index
//! arrives as a brand-new identity and never trips the checks.

use std::collections::HashMap;
use std::fmt::Write as _;

use scenehud_common::{NoteKind, SceneId};

use crate::domain::OrderIndex;

use super::fanout::BusNote;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SceneState {
    Presented,
    Dismissed,
}

impl SceneState {
    fn label(self) -> &'static str {
        match self {
            SceneState::Presented => "presented",
            SceneState::Dismissed => "dismissed",
        }
    }
}

struct SceneRecord {
    state: SceneState,
    order: OrderIndex,
    title: String,
}

/// Ordered record of presentations, plus the diagnostic dump.
pub struct PresentedRegistry {
    records: HashMap<SceneId, SceneRecord>,
    next_order: u64,
}

impl PresentedRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { records: HashMap::new(), next_order: 0 }
    }

    /// Feed one bus note through the registry. Non-milestone kinds pass
    /// through untouched.
    ///
    /// # Panics
    ///
    /// On any ordering violation in the normalized stream; see module docs.
    pub fn observe(&mut self, bus_note: &BusNote) {
        if !bus_note.note.kind.is_milestone() {
            return;
        }
        let Some(scene) = &bus_note.scene else {
            panic!("{} note without a scene sender", bus_note.note.kind);
        };
        let (id, title) = {
            let s = scene.borrow();
            (s.id(), s.label())
        };
        match bus_note.note.kind {
            NoteKind::DidPresent => self.did_present(id, &title),
            NoteKind::DidDismiss => self.did_dismiss(id, &title),
            _ => unreachable!("is_milestone covers exactly the two kinds above"),
        }
    }

    fn did_present(&mut self, id: SceneId, title: &str) {
        match self.records.get(&id).map(|r| r.state) {
            Some(SceneState::Presented) => {
                panic!("Did present: scene '{title}' ({id}) has already been presented.")
            }
            Some(SceneState::Dismissed) => {
                panic!("Did present: scene '{title}' ({id}) has already been dismissed.")
            }
            None => {
                self.next_order += 1;
                self.records.insert(
                    id,
                    SceneRecord {
                        state: SceneState::Presented,
                        order: OrderIndex(self.next_order),
                        title: title.to_string(),
                    },
                );
            }
        }
    }

    fn did_dismiss(&mut self, id: SceneId, title: &str) {
        match self.records.get_mut(&id) {
            Some(record) if record.state == SceneState::Presented => {
                record.state = SceneState::Dismissed;
            }
            Some(_) => {
                panic!("Did dismiss: scene '{title}' ({id}) has already been dismissed.")
            }
            None => panic!("Did dismiss: scene '{title}' ({id}) has not been presented."),
        }
    }

    /// Scenes currently presented.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.records.values().filter(|r| r.state == SceneState::Presented).count()
    }

    /// Human-readable report of every currently-presented scene, in
    /// presentation order: identity, order index, state, label. For manual
    /// inspection only.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut live: Vec<(&SceneId, &SceneRecord)> =
            self.records.iter().filter(|(_, r)| r.state == SceneState::Presented).collect();
        live.sort_by_key(|(_, r)| r.order);

        let mut out = String::from("=====================\n");
        for (id, record) in live {
            let _ = writeln!(
                out,
                "{id}\t{}\t{}\t{}",
                record.order,
                record.state.label(),
                record.title
            );
        }
        out.push_str("=====================");
        out
    }
}

impl Default for PresentedRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SceneHost;
    use scenehud_common::{Note, NoteSource};

    fn milestone(kind: NoteKind, scene: &crate::host::SceneRef) -> BusNote {
        BusNote {
            note: Note {
                seq: 0,
                kind,
                sender: scene.borrow().label(),
                source: NoteSource::Scene,
                elapsed_secs: 0.0,
            },
            scene: Some(scene.clone()),
        }
    }

    #[test]
    fn present_then_dismiss_is_the_happy_path() {
        let mut host = SceneHost::new();
        let mut registry = PresentedRegistry::new();
        let scene = host.spawn("Home");

        registry.observe(&milestone(NoteKind::DidPresent, &scene));
        assert_eq!(registry.live_count(), 1);
        registry.observe(&milestone(NoteKind::DidDismiss, &scene));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn dump_lists_presented_scenes_in_order() {
        let mut host = SceneHost::new();
        let mut registry = PresentedRegistry::new();
        let a = host.spawn("First");
        let b = host.spawn("Second");

        registry.observe(&milestone(NoteKind::DidPresent, &a));
        registry.observe(&milestone(NoteKind::DidPresent, &b));

        let dump = registry.dump();
        let first = dump.find("First").unwrap();
        let second = dump.find("Second").unwrap();
        assert!(first < second);
        assert!(dump.contains("#1"));
        assert!(dump.contains("presented"));
    }

    #[test]
    fn dismissed_scenes_leave_the_dump() {
        let mut host = SceneHost::new();
        let mut registry = PresentedRegistry::new();
        let scene = host.spawn("Transient");

        registry.observe(&milestone(NoteKind::DidPresent, &scene));
        registry.observe(&milestone(NoteKind::DidDismiss, &scene));
        assert!(!registry.dump().contains("Transient"));
    }

    #[test]
    fn raw_kinds_pass_through() {
        let mut host = SceneHost::new();
        let mut registry = PresentedRegistry::new();
        let scene = host.spawn("Raw");
        registry.observe(&milestone(NoteKind::ViewDidAppear, &scene));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    #[should_panic(expected = "already been presented")]
    fn duplicate_present_is_fatal() {
        let mut host = SceneHost::new();
        let mut registry = PresentedRegistry::new();
        let scene = host.spawn("Twice");
        registry.observe(&milestone(NoteKind::DidPresent, &scene));
        registry.observe(&milestone(NoteKind::DidPresent, &scene));
    }

    #[test]
    #[should_panic(expected = "has not been presented")]
    fn dismiss_without_present_is_fatal() {
        let mut host = SceneHost::new();
        let mut registry = PresentedRegistry::new();
        let scene = host.spawn("Never");
        registry.observe(&milestone(NoteKind::DidDismiss, &scene));
    }

    #[test]
    #[should_panic(expected = "already been dismissed")]
    fn double_dismiss_is_fatal() {
        let mut host = SceneHost::new();
        let mut registry = PresentedRegistry::new();
        let scene = host.spawn("Flicker");
        registry.observe(&milestone(NoteKind::DidPresent, &scene));
        registry.observe(&milestone(NoteKind::DidDismiss, &scene));
        registry.observe(&milestone(NoteKind::DidDismiss, &scene));
    }

    #[test]
    fn recycled_identity_is_a_fresh_record() {
        let mut host = SceneHost::new();
        let mut registry = PresentedRegistry::new();

        let first = host.spawn("First Holder");
        let first_id = first.borrow().id();
        registry.observe(&milestone(NoteKind::DidPresent, &first));
        registry.observe(&milestone(NoteKind::DidDismiss, &first));
        drop(first);

        let second = host.spawn("Second Holder");
        assert_eq!(second.borrow().id().index, first_id.index);
        // Same slot, new generation: presents cleanly instead of tripping
        // the already-dismissed check.
        registry.observe(&milestone(NoteKind::DidPresent, &second));
        assert_eq!(registry.live_count(), 1);
    }
}

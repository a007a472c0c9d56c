//! # Lifecycle Normalizer
//!
//! Consumes the raw appear/disappear/reparent stream and derives the two
//! at-most-once milestones per scene: `DidPresent` on first appearance,
//! `DidDismiss` on final disappearance or detachment.
//!
//! Raw signals are noisy: a scene appears again every time something covering
//! it goes away, and disappears for reasons that have nothing to do with
//! teardown. Only the guard conditions here define meaningful edges; raw
//! events that fail them are counted and dropped, silently.
//!
//! ## Dismissal guard
//!
//! A disappearance dismisses the scene iff it is being removed, has no parent
//! container, or its parent container is itself being removed. A detachment
//! (`did_move_to_parent` with no new parent) always dismisses. Either trigger
//! dismisses still-presented descendants first, most-recently-added first,
//! then the scene itself, so a container torn down with children that never
//! individually disappeared still accounts for every one of them, and a
//! second trigger in the same teardown finds the metadata entries already
//! gone and does nothing.

use std::collections::HashSet;
use std::time::Instant;

use log::debug;
use serde::Serialize;

use scenehud_common::{LifecycleEvent, Milestone, Note, NoteKind, NoteSource};

use crate::export::LogExporter;
use crate::host::SceneRef;

use super::fanout::{BusNote, EventBus, KindFilter, SubscriberToken};
use super::metadata::MetadataTable;

/// Counters surfaced in the overlay status panel and the exit summary.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct TrackerStats {
    pub raw_loads: u64,
    pub raw_appears: u64,
    pub raw_disappears: u64,
    pub raw_reparents: u64,
    pub presented: u64,
    pub dismissed: u64,
    /// Raw events that failed a transition guard (expected noise).
    pub guard_noops: u64,
    pub platform_signals: u64,
    pub notes_published: u64,
    pub table_len: usize,
    pub sweeps: u64,
}

impl TrackerStats {
    /// Scenes currently presented and not yet dismissed.
    #[must_use]
    pub fn live(&self) -> u64 {
        self.presented.saturating_sub(self.dismissed)
    }
}

/// Encapsulates normalization state and fan-out.
///
/// One instance per process, owned by the designated thread and reached only
/// from the installed method replacements and the redispatched platform
/// channel. Constructed once at startup and passed to the interception
/// points; nothing here is a process-wide static.
pub struct Tracker {
    table: MetadataTable,
    bus: EventBus,
    seq: u64,
    started: Instant,

    // Mutable counters
    raw_loads: u64,
    raw_appears: u64,
    raw_disappears: u64,
    raw_reparents: u64,
    presented: u64,
    dismissed: u64,
    guard_noops: u64,
    platform_signals: u64,

    // Optional outputs
    exporter: Option<LogExporter>,
}

impl Tracker {
    #[must_use]
    pub fn new(sweep_threshold: usize) -> Self {
        Self {
            table: MetadataTable::new(sweep_threshold),
            bus: EventBus::new(),
            seq: 0,
            started: Instant::now(),
            raw_loads: 0,
            raw_appears: 0,
            raw_disappears: 0,
            raw_reparents: 0,
            presented: 0,
            dismissed: 0,
            guard_noops: 0,
            platform_signals: 0,
            exporter: None,
        }
    }

    /// Attach the note-log exporter (`--export`).
    pub fn set_exporter(&mut self, exporter: LogExporter) {
        self.exporter = Some(exporter);
    }

    /// Take the exporter back for the final write (teardown path).
    pub fn take_exporter(&mut self) -> Option<LogExporter> {
        self.exporter.take()
    }

    pub fn subscribe(
        &mut self,
        filter: KindFilter,
        handler: Box<dyn FnMut(&BusNote)>,
    ) -> SubscriberToken {
        self.bus.subscribe(filter, handler)
    }

    pub fn unsubscribe(&mut self, token: SubscriberToken) -> bool {
        self.bus.unsubscribe(token)
    }

    #[must_use]
    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            raw_loads: self.raw_loads,
            raw_appears: self.raw_appears,
            raw_disappears: self.raw_disappears,
            raw_reparents: self.raw_reparents,
            presented: self.presented,
            dismissed: self.dismissed,
            guard_noops: self.guard_noops,
            platform_signals: self.platform_signals,
            notes_published: self.seq,
            table_len: self.table.len(),
            sweeps: self.table.sweeps(),
        }
    }

    // ── Raw observation entry points (called from installed replacements) ──

    /// Load is a raw tap only; it never advances the state machine.
    pub fn observe_loaded(&mut self, scene: &SceneRef) {
        self.raw_loads += 1;
        self.publish(NoteKind::ViewDidLoad, Some(scene));
    }

    /// Feed one raw lifecycle signal through the state machine.
    pub fn observe(&mut self, scene: &SceneRef, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Appeared => self.appeared(scene),
            LifecycleEvent::Disappeared => self.disappeared(scene),
            LifecycleEvent::Reparented(new_parent) => self.reparented(scene, new_parent.is_some()),
        }
    }

    /// `Untracked --Appeared--> Presented` fires the milestone; appearing
    /// again on an already-presented scene is a no-op.
    fn appeared(&mut self, scene: &SceneRef) {
        self.raw_appears += 1;
        self.publish(NoteKind::ViewDidAppear, Some(scene));

        let first = {
            let entry = self.table.get_or_create(scene);
            if entry.presented {
                false
            } else {
                entry.presented = true;
                true
            }
        };
        if first {
            let delegate = scene.borrow().delegate();
            if let Some(delegate) = delegate {
                delegate.scene_did_present(scene);
            }
            self.presented += 1;
            self.publish(Milestone::Presented.into(), Some(scene));
        } else {
            self.guard_noops += 1;
        }
    }

    fn disappeared(&mut self, scene: &SceneRef) {
        self.raw_disappears += 1;
        self.publish(NoteKind::ViewDidDisappear, Some(scene));

        let (being_removed, has_parent, parent_being_removed) = {
            let s = scene.borrow();
            let parent_removed = s.parent().is_some_and(|p| p.borrow().is_being_removed());
            (s.is_being_removed(), s.has_parent(), parent_removed)
        };
        if being_removed || !has_parent || parent_being_removed {
            self.dismiss_recursively(scene);
        } else {
            self.guard_noops += 1;
        }
    }

    /// Losing all parents dismisses the scene (and its still-presented
    /// descendants first). A move to a live parent is raw noise only.
    fn reparented(&mut self, scene: &SceneRef, has_new_parent: bool) {
        self.raw_reparents += 1;
        self.publish(NoteKind::DidReparent, Some(scene));

        if has_new_parent {
            self.guard_noops += 1;
        } else {
            self.dismiss_recursively(scene);
        }
    }

    /// One platform signal, already redispatched onto the designated thread.
    /// The kind is the only trustworthy field; there is no sender.
    pub fn platform_signal(&mut self, kind: NoteKind) {
        self.platform_signals += 1;
        self.publish(kind, None);
    }

    // ── Internals ──────────────────────────────────────────────────────────

    /// Dismiss `scene`'s still-presented descendants (most-recently-added
    /// first), then `scene` itself if it is presented. Scenes with no live
    /// presented entry are skipped silently; Untracked and already-Dismissed
    /// are not errors here.
    fn dismiss_recursively(&mut self, scene: &SceneRef) {
        let children = scene.borrow().children_snapshot();
        for child in children.iter().rev() {
            self.dismiss_recursively(child);
        }

        let index = match self.table.live_entry(scene) {
            Some(entry) if entry.presented => Some(entry.id.index),
            _ => None,
        };
        let Some(index) = index else {
            debug!("dismiss skipped for untracked scene {}", scene.borrow().label());
            return;
        };

        let delegate = scene.borrow().delegate();
        if let Some(delegate) = delegate {
            delegate.scene_did_dismiss(scene);
        }
        self.dismissed += 1;
        self.publish(Milestone::Dismissed.into(), Some(scene));
        self.table.remove(index);
    }

    fn publish(&mut self, kind: NoteKind, scene: Option<&SceneRef>) {
        self.seq += 1;
        let (sender, source) = match scene {
            Some(scene) => (scene.borrow().label(), NoteSource::Scene),
            None => ("platform".to_string(), NoteSource::Platform),
        };
        let note = Note {
            seq: self.seq,
            kind,
            sender,
            source,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        };
        if let Some(exporter) = &mut self.exporter {
            exporter.append(&note);
        }
        self.bus.publish(&BusNote { note, scene: scene.cloned() });
    }
}

/// Ignore set used by log consumers: the defaults plus any extras.
#[must_use]
pub fn ignore_set(extra: &[NoteKind]) -> HashSet<NoteKind> {
    let mut set: HashSet<NoteKind> =
        NoteKind::ALL.iter().copied().filter(|k| k.ignored_by_default()).collect();
    set.extend(extra.iter().copied());
    set
}

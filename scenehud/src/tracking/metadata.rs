//! # Weak Metadata Table
//!
//! Identity-keyed side table mapping live scenes to per-scene tracking state.
//! Keys are the reusable slot-index component of a [`SceneId`]; every entry
//! carries a weak back-reference used only to validate identity, never to
//! extend a scene's lifetime.
//!
//! Dismissal is not observable on every teardown path, so entries can outlive
//! their scene. Reclamation is batched: a sweep walks the whole table and
//! drops dead entries, and runs automatically every Nth mutating call rather
//! than per-operation: bounded staleness for amortized O(1) typical cost.
//! A stale hit (the slot index was reused by a new scene) sweeps immediately
//! before reallocating, so a recycled identity can never inherit the previous
//! holder's state.
//!
//! None of these operations can fail; "no entry" is a valid, silent outcome.

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::debug;
use scenehud_common::SceneId;

use crate::host::{Scene, SceneRef};

/// Per-scene tracking state.
pub struct MetaEntry {
    pub id: SceneId,
    back: Weak<std::cell::RefCell<Scene>>,
    /// Set on the first observed appearance; the scene is never presented
    /// again while this entry is live.
    pub presented: bool,
}

impl MetaEntry {
    fn fresh(id: SceneId, scene: &SceneRef) -> Self {
        Self { id, back: Rc::downgrade(scene), presented: false }
    }

    /// True when the back-reference still resolves to exactly `scene`.
    fn is_backed_by(&self, scene: &SceneRef) -> bool {
        self.back.upgrade().is_some_and(|live| Rc::ptr_eq(&live, scene))
    }

    /// True while the underlying scene is alive.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.back.strong_count() > 0
    }
}

/// The side table. Confined to the designated thread; a multi-threaded port
/// needs an exclusive-access discipline around it.
pub struct MetadataTable {
    entries: HashMap<u32, MetaEntry>,
    threshold: usize,
    mutations: usize,
    sweeps: u64,
}

impl MetadataTable {
    /// `threshold` is the number of mutating calls between automatic sweeps
    /// (the `--sweep-threshold` debug knob). Clamped to at least 1.
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self { entries: HashMap::new(), threshold: threshold.max(1), mutations: 0, sweeps: 0 }
    }

    /// Fetch the entry for `scene`, allocating a fresh one when there is no
    /// entry or the existing entry belongs to a previous holder of the slot.
    pub fn get_or_create(&mut self, scene: &SceneRef) -> &mut MetaEntry {
        let id = scene.borrow().id();
        let stale = self.entries.get(&id.index).is_some_and(|e| !e.is_backed_by(scene));
        if stale {
            debug!("metadata: stale entry for slot {} (identity reuse), sweeping", id.index);
            self.sweep();
            // A remnant survives the sweep only if the previous holder is
            // somehow still alive under a reused index; evict it regardless.
            self.entries.remove(&id.index);
        }
        self.note_mutation();
        self.entries.entry(id.index).or_insert_with(|| MetaEntry::fresh(id, scene))
    }

    /// The entry for `scene`, only if one exists and is backed by exactly
    /// this scene. Never allocates; a miss means Untracked.
    pub fn live_entry(&mut self, scene: &SceneRef) -> Option<&mut MetaEntry> {
        let id = scene.borrow().id();
        let valid = self.entries.get(&id.index).is_some_and(|e| e.is_backed_by(scene));
        if valid {
            self.entries.get_mut(&id.index)
        } else {
            None
        }
    }

    /// Explicit removal on a normalized dismissal.
    pub fn remove(&mut self, index: u32) {
        self.entries.remove(&index);
        self.note_mutation();
    }

    /// Drop every entry whose scene is gone. O(table size). Resets the
    /// mutation counter.
    pub fn sweep(&mut self) {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.is_live());
        let reclaimed = before - self.entries.len();
        if reclaimed > 0 {
            debug!("metadata: sweep reclaimed {reclaimed} dead entries");
        }
        self.sweeps += 1;
        self.mutations = 0;
    }

    fn note_mutation(&mut self) {
        self.mutations += 1;
        if self.mutations >= self.threshold {
            self.sweep();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    /// Mutating calls since the last sweep.
    #[must_use]
    pub fn mutations_since_sweep(&self) -> usize {
        self.mutations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SceneHost;

    #[test]
    fn entry_does_not_extend_scene_lifetime() {
        let mut host = SceneHost::new();
        let mut table = MetadataTable::new(100);
        let scene = host.spawn("A");
        table.get_or_create(&scene).presented = true;

        assert_eq!(Rc::strong_count(&scene), 1);
        drop(scene);
        assert!(!table.entries.values().next().unwrap().is_live());
    }

    #[test]
    fn reused_slot_gets_a_fresh_entry() {
        let mut host = SceneHost::new();
        let mut table = MetadataTable::new(100);

        let first = host.spawn("First");
        let first_id = first.borrow().id();
        table.get_or_create(&first).presented = true;
        drop(first);

        let second = host.spawn("Second");
        let second_id = second.borrow().id();
        assert_eq!(second_id.index, first_id.index);

        let entry = table.get_or_create(&second);
        assert!(!entry.presented, "recycled identity must not inherit presented state");
        assert_eq!(entry.id, second_id);
    }

    #[test]
    fn stale_hit_sweeps_before_reallocating() {
        let mut host = SceneHost::new();
        let mut table = MetadataTable::new(100);

        let doomed = host.spawn("Doomed");
        table.get_or_create(&doomed);
        let bystander = host.spawn("Bystander");
        table.get_or_create(&bystander);
        drop(doomed);
        drop(bystander);

        // Reuses one of the dead slots; the sweep reclaims the other too.
        let fresh = host.spawn("Fresh");
        assert_eq!(table.sweeps(), 0);
        table.get_or_create(&fresh);
        assert_eq!(table.sweeps(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn nth_mutating_call_triggers_sweep_and_resets_counter() {
        let mut host = SceneHost::new();
        let mut table = MetadataTable::new(4);

        // Spawn both up front so `keep` does not recycle the dead scene's
        // slot (a stale hit would sweep early and mask the counter path).
        let dead = host.spawn("Dead");
        let keep = host.spawn("Keep");
        table.get_or_create(&dead); // mutation 1
        drop(dead);

        table.get_or_create(&keep); // mutation 2
        table.get_or_create(&keep); // mutation 3
        assert_eq!(table.sweeps(), 0);
        assert_eq!(table.len(), 2, "dead entry still present before the sweep");

        table.get_or_create(&keep); // mutation 4: sweep fires
        assert_eq!(table.sweeps(), 1);
        assert_eq!(table.mutations_since_sweep(), 0);
        assert_eq!(table.len(), 1, "sweep reclaimed the dead entry");
    }

    #[test]
    fn remove_counts_as_a_mutating_call() {
        let mut host = SceneHost::new();
        let mut table = MetadataTable::new(2);
        let scene = host.spawn("A");

        let index = table.get_or_create(&scene).id.index; // mutation 1
        table.remove(index); // mutation 2: sweep fires
        assert_eq!(table.sweeps(), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn live_entry_never_allocates() {
        let mut host = SceneHost::new();
        let mut table = MetadataTable::new(100);
        let scene = host.spawn("A");

        assert!(table.live_entry(&scene).is_none());
        assert!(table.is_empty());
        table.get_or_create(&scene);
        assert!(table.live_entry(&scene).is_some());
    }
}

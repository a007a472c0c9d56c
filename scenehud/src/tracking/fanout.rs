//! # Event Fan-out
//!
//! One-to-many delivery of notes to independent subscribers. Delivery order
//! for a single publish is subscription insertion order; there is no
//! concurrency and no reordering. Subscribers never affect each other: a
//! subscriber that wants to halt the process on an invariant violation
//! panics, it does not unsubscribe its neighbors.

use scenehud_common::{Note, NoteKind};

use crate::host::SceneRef;

/// A note as published on the bus: the displayable record plus the sending
/// scene, when there is one (platform notes never carry a scene).
pub struct BusNote {
    pub note: Note,
    pub scene: Option<SceneRef>,
}

/// Opaque handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberToken(u64);

/// Which note kinds a subscriber wants.
pub enum KindFilter {
    All,
    Only(Vec<NoteKind>),
}

impl KindFilter {
    fn accepts(&self, kind: NoteKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Only(kinds) => kinds.contains(&kind),
        }
    }
}

struct Subscriber {
    token: u64,
    filter: KindFilter,
    handler: Box<dyn FnMut(&BusNote)>,
}

/// The bus. Confined to the designated thread, like everything that touches
/// tracking state.
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_token: u64,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self { subscribers: Vec::new(), next_token: 0 }
    }

    pub fn subscribe(
        &mut self,
        filter: KindFilter,
        handler: Box<dyn FnMut(&BusNote)>,
    ) -> SubscriberToken {
        let token = self.next_token;
        self.next_token += 1;
        self.subscribers.push(Subscriber { token, filter, handler });
        SubscriberToken(token)
    }

    /// Returns false if the token was already gone.
    pub fn unsubscribe(&mut self, token: SubscriberToken) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.token != token.0);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, note: &BusNote) {
        for sub in &mut self.subscribers {
            if sub.filter.accepts(note.note.kind) {
                (sub.handler)(note);
            }
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

//! End-to-end pipeline tests: host operations dispatched through installed
//! taps, normalized milestones collected off the bus.

use std::cell::RefCell;
use std::rc::Rc;

use scenehud::host::{methods, MethodArgs, SceneDelegate, SceneHost, SceneRef};
use scenehud::scenario::{self, Driver};
use scenehud::tracking::{install_lifecycle_taps, KindFilter, PresentedRegistry, Tracker};
use scenehud_common::NoteKind;

type Milestones = Rc<RefCell<Vec<(NoteKind, String)>>>;

/// Host with taps installed and a milestone collector on the bus.
fn tracked_host() -> (SceneHost, Rc<RefCell<Tracker>>, Milestones) {
    let host = SceneHost::new();
    let tracker = Rc::new(RefCell::new(Tracker::new(16)));
    let seen: Milestones = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    tracker.borrow_mut().subscribe(
        KindFilter::Only(vec![NoteKind::DidPresent, NoteKind::DidDismiss]),
        Box::new(move |n| log.borrow_mut().push((n.note.kind, n.note.sender.clone()))),
    );
    install_lifecycle_taps(&host.table(), &tracker).expect("install taps");
    (host, tracker, seen)
}

fn attach_registry(tracker: &Rc<RefCell<Tracker>>) -> Rc<RefCell<PresentedRegistry>> {
    let registry = Rc::new(RefCell::new(PresentedRegistry::new()));
    let observer = Rc::clone(&registry);
    tracker.borrow_mut().subscribe(
        KindFilter::Only(vec![NoteKind::DidPresent, NoteKind::DidDismiss]),
        Box::new(move |n| observer.borrow_mut().observe(n)),
    );
    registry
}

#[test]
fn presentation_fires_once_and_dismissal_follows() {
    let (mut host, _tracker, seen) = tracked_host();

    let nav = host.spawn("Nav");
    host.present(&nav);
    let a = host.spawn("A");
    host.push(&nav, &a);
    let b = host.spawn("B");
    host.push(&nav, &b); // covers A: raw disappear, no dismissal
    drop(host.pop(&nav)); // B removed and dismissed; A re-appears, no re-present

    let milestones: Vec<(NoteKind, String)> = seen.borrow().clone();
    assert_eq!(
        milestones,
        vec![
            (NoteKind::DidPresent, "Nav".to_string()),
            (NoteKind::DidPresent, "A".to_string()),
            (NoteKind::DidPresent, "B".to_string()),
            (NoteKind::DidDismiss, "B".to_string()),
        ]
    );
}

#[test]
fn detached_container_dismisses_children_in_reverse_insertion_order() {
    let (mut host, _tracker, seen) = tracked_host();

    let nav = host.spawn("Nav");
    host.present(&nav);
    let a = host.spawn("A");
    host.push(&nav, &a);
    let b = host.spawn("B");
    host.push(&nav, &b);
    seen.borrow_mut().clear();

    // Neither A nor B ever individually disappeared; the teardown must still
    // account for both, newest first, before the container itself.
    drop(host.detach(&nav));

    let milestones: Vec<(NoteKind, String)> = seen.borrow().clone();
    assert_eq!(
        milestones,
        vec![
            (NoteKind::DidDismiss, "B".to_string()),
            (NoteKind::DidDismiss, "A".to_string()),
            (NoteKind::DidDismiss, "Nav".to_string()),
        ]
    );
}

#[test]
fn modal_teardown_dismisses_each_scene_exactly_once() {
    let (mut host, _tracker, seen) = tracked_host();

    let modal = host.spawn("Modal");
    host.present(&modal);
    let a = host.spawn("A");
    host.push(&modal, &a);
    let b = host.spawn("B");
    host.push(&modal, &b);
    seen.borrow_mut().clear();

    // The visible child's own disappearance and the container's teardown both
    // trigger in the same dismissal; the second trigger must find the
    // child already gone and do nothing.
    drop(host.dismiss_top());

    let milestones: Vec<(NoteKind, String)> = seen.borrow().clone();
    assert_eq!(
        milestones,
        vec![
            (NoteKind::DidDismiss, "B".to_string()),
            (NoteKind::DidDismiss, "A".to_string()),
            (NoteKind::DidDismiss, "Modal".to_string()),
        ]
    );
}

#[test]
fn recycled_identity_presents_fresh_after_silent_deallocation() {
    let (mut host, tracker, seen) = tracked_host();
    let registry = attach_registry(&tracker);

    // Appears but is deallocated without any observable dismissal; the
    // sweep safety net is the only thing cleaning up after it.
    let ephemeral = host.spawn("Ephemeral");
    let first_id = ephemeral.borrow().id();
    host.table().dispatch(methods::VIEW_DID_APPEAR, &ephemeral, &MethodArgs::Animated(false));
    drop(ephemeral);

    let reborn = host.spawn("Reborn");
    let second_id = reborn.borrow().id();
    assert_eq!(second_id.index, first_id.index, "test requires slot reuse");
    host.table().dispatch(methods::VIEW_DID_APPEAR, &reborn, &MethodArgs::Animated(false));

    let presents =
        seen.borrow().iter().filter(|(k, _)| *k == NoteKind::DidPresent).count();
    assert_eq!(presents, 2, "the recycled identity presents exactly once more");
    assert_eq!(registry.borrow().live_count(), 2);
    assert_eq!(tracker.borrow().stats().table_len, 1, "stale entry was reclaimed");
}

#[test]
fn recycled_identity_presents_fresh_after_dismissal() {
    let (mut host, tracker, seen) = tracked_host();
    let registry = attach_registry(&tracker);

    let nav = host.spawn("Nav");
    host.present(&nav);
    let first = host.spawn("First Holder");
    let slot = first.borrow().id().index;
    host.push(&nav, &first);
    drop(host.pop(&nav));
    drop(first);

    let second = host.spawn("Second Holder");
    assert_eq!(second.borrow().id().index, slot);
    host.push(&nav, &second);

    // A fresh presentation, not an "already presented" fatal error.
    let last = seen.borrow().last().cloned().unwrap();
    assert_eq!(last, (NoteKind::DidPresent, "Second Holder".to_string()));
    // Live: Nav and Second Holder; First Holder came and went.
    assert_eq!(registry.borrow().live_count(), 2);
}

#[test]
fn delegate_callbacks_fire_before_the_milestone_note() {
    struct OrderProbe(Rc<RefCell<Vec<String>>>);
    impl SceneDelegate for OrderProbe {
        fn scene_did_present(&self, scene: &SceneRef) {
            self.0.borrow_mut().push(format!("hook:present:{}", scene.borrow().label()));
        }
        fn scene_did_dismiss(&self, scene: &SceneRef) {
            self.0.borrow_mut().push(format!("hook:dismiss:{}", scene.borrow().label()));
        }
    }

    let (mut host, tracker, _seen) = tracked_host();
    let order = Rc::new(RefCell::new(Vec::new()));
    let bus_order = Rc::clone(&order);
    tracker.borrow_mut().subscribe(
        KindFilter::Only(vec![NoteKind::DidPresent, NoteKind::DidDismiss]),
        Box::new(move |n| bus_order.borrow_mut().push(format!("note:{}", n.note.kind))),
    );

    let scene = host.spawn("Hooked");
    scene.borrow_mut().set_delegate(Rc::new(OrderProbe(Rc::clone(&order))));
    host.present(&scene);
    drop(host.dismiss_top());

    assert_eq!(
        *order.borrow(),
        vec![
            "hook:present:Hooked".to_string(),
            "note:DidPresent".to_string(),
            "hook:dismiss:Hooked".to_string(),
            "note:DidDismiss".to_string(),
        ]
    );
}

#[test]
fn raw_taps_publish_alongside_milestones() {
    let (mut host, tracker, _seen) = tracked_host();
    let kinds = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&kinds);
    tracker
        .borrow_mut()
        .subscribe(KindFilter::All, Box::new(move |n| log.borrow_mut().push(n.note.kind)));

    let scene = host.spawn("Raw");
    host.present(&scene);

    assert_eq!(
        *kinds.borrow(),
        vec![NoteKind::ViewDidLoad, NoteKind::ViewDidAppear, NoteKind::DidPresent]
    );
}

#[test]
fn tour_scenario_keeps_the_registry_consistent() {
    let (mut host, tracker, _seen) = tracked_host();
    let registry = attach_registry(&tracker);

    let mut driver = Driver::new();
    for step in scenario::tour() {
        driver.apply(&mut host, step);
    }

    let stats = tracker.borrow().stats();
    assert_eq!(registry.borrow().live_count() as u64, stats.live());
    assert_eq!(stats.presented, stats.dismissed + stats.live());
    assert!(stats.guard_noops > 0, "the tour exercises noise paths");
}

//! # Lifecycle Tap Installation
//!
//! Replaces the fixed set of lifecycle methods on the scene base type's
//! method table with implementations that forward to the original and then
//! hand the raw signal to the tracker.
//!
//! Called exactly once, at startup, before any scene exists. Every consumer
//! of lifecycle information rides on this one replacement per method; no
//! second subscriber ever double-chains a method, so the original runs once
//! per call no matter how many observers are attached downstream.
//!
//! A missing target method or a repeated install is a configuration error
//! and aborts the run; there is nothing to recover to when the interception
//! setup itself is broken.

use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use scenehud_common::LifecycleEvent;

use crate::domain::InstallError;
use crate::host::{methods, MethodTable};

use super::normalizer::Tracker;

/// Install the tracker's replacements for all four target methods.
///
/// The tracker is shared with each replacement closure; replacements run on
/// the designated thread only, so the `RefCell` borrow is never contended.
/// Scene delegate callbacks fire inside these replacements and must not
/// re-enter the host.
///
/// # Errors
///
/// Any [`InstallError`] from the table; both variants are fatal at startup.
pub fn install_lifecycle_taps(
    table: &MethodTable,
    tracker: &Rc<RefCell<Tracker>>,
) -> Result<(), InstallError> {
    let t = Rc::clone(tracker);
    table.install(methods::VIEW_DID_LOAD, move |original| {
        Rc::new(move |scene, args| {
            original(scene, args);
            t.borrow_mut().observe_loaded(scene);
        })
    })?;

    let t = Rc::clone(tracker);
    table.install(methods::VIEW_DID_APPEAR, move |original| {
        Rc::new(move |scene, args| {
            original(scene, args);
            t.borrow_mut().observe(scene, LifecycleEvent::Appeared);
        })
    })?;

    let t = Rc::clone(tracker);
    table.install(methods::VIEW_DID_DISAPPEAR, move |original| {
        Rc::new(move |scene, args| {
            original(scene, args);
            t.borrow_mut().observe(scene, LifecycleEvent::Disappeared);
        })
    })?;

    let t = Rc::clone(tracker);
    table.install(methods::DID_MOVE_TO_PARENT, move |original| {
        Rc::new(move |scene, args| {
            original(scene, args);
            let new_parent = args.parent().map(|p| p.borrow().id());
            t.borrow_mut().observe(scene, LifecycleEvent::Reparented(new_parent));
        })
    })?;

    info!("installed lifecycle taps on {} methods", methods::ALL.len());
    Ok(())
}

//! # Named-Slot Method Table
//!
//! The scene base type dispatches every lifecycle method through this table.
//! At startup, the tracker replaces selected slots with implementations that
//! forward to the original and then observe the call: the same single
//! interception point per method for every subscriber, so the original runs
//! exactly once no matter how many consumers ride on the stream.
//!
//! ## Contract
//!
//! - [`MethodTable::install`] fails if the named method was never registered
//!   (a configuration error, fatal at startup) or if a replacement is already
//!   in place (exactly one replacement per method per process lifetime).
//! - The original implementation is handed to the wrapper, which must call it
//!   with the same receiver and arguments to preserve base behavior.
//! - Installation happens once, before any scene exists.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::domain::InstallError;

use super::scene::SceneRef;

/// Method names registered by the scene base type.
pub mod methods {
    pub const VIEW_DID_LOAD: &str = "view_did_load";
    pub const VIEW_DID_APPEAR: &str = "view_did_appear";
    pub const VIEW_DID_DISAPPEAR: &str = "view_did_disappear";
    pub const DID_MOVE_TO_PARENT: &str = "did_move_to_parent";

    /// Every method the base type registers, in dispatch-frequency order.
    pub const ALL: [&str; 4] =
        [VIEW_DID_LOAD, VIEW_DID_APPEAR, VIEW_DID_DISAPPEAR, DID_MOVE_TO_PARENT];
}

/// Arguments passed through to a lifecycle method.
#[derive(Clone)]
pub enum MethodArgs {
    None,
    Animated(bool),
    /// New parent for `did_move_to_parent` (`None` = detached from all).
    Parent(Option<SceneRef>),
}

impl MethodArgs {
    /// The new parent carried by a reparent call. `None` both for a detach
    /// and for non-reparent argument shapes.
    #[must_use]
    pub fn parent(&self) -> Option<&SceneRef> {
        match self {
            MethodArgs::Parent(p) => p.as_ref(),
            _ => None,
        }
    }
}

/// A lifecycle method implementation. Receiver first, then arguments, like
/// any instance method.
pub type MethodImpl = Rc<dyn Fn(&SceneRef, &MethodArgs)>;

struct Slot {
    imp: MethodImpl,
    replaced: bool,
}

/// Dispatch table for the scene base type's lifecycle methods.
pub struct MethodTable {
    slots: RefCell<HashMap<&'static str, Slot>>,
}

impl MethodTable {
    /// An empty table. The host registers its base implementations before
    /// any dispatch happens.
    #[must_use]
    pub fn new() -> Self {
        Self { slots: RefCell::new(HashMap::new()) }
    }

    /// Register a base implementation for `name`. Registration is a host
    /// concern; replacements go through [`install`](Self::install).
    pub fn register(&self, name: &'static str, imp: MethodImpl) {
        self.slots.borrow_mut().insert(name, Slot { imp, replaced: false });
    }

    /// Replace the implementation of `name`, handing the original to `wrap`
    /// so the replacement can forward to it.
    ///
    /// # Errors
    ///
    /// `MethodMissing` if `name` was never registered; `AlreadyInstalled` if a
    /// replacement is already in place. Both are startup configuration errors
    /// and abort the run.
    pub fn install<F>(&self, name: &'static str, wrap: F) -> Result<(), InstallError>
    where
        F: FnOnce(MethodImpl) -> MethodImpl,
    {
        let mut slots = self.slots.borrow_mut();
        let slot = slots.get_mut(name).ok_or(InstallError::MethodMissing(name))?;
        if slot.replaced {
            return Err(InstallError::AlreadyInstalled(name));
        }
        let original = Rc::clone(&slot.imp);
        slot.imp = wrap(original);
        slot.replaced = true;
        Ok(())
    }

    /// Invoke the current implementation of `name` on `scene`.
    ///
    /// # Panics
    ///
    /// Dispatching a method that was never registered is a host programming
    /// error, not a runtime condition.
    pub fn dispatch(&self, name: &'static str, scene: &SceneRef, args: &MethodArgs) {
        let imp = {
            let slots = self.slots.borrow();
            let Some(slot) = slots.get(name) else {
                panic!("dispatch of unregistered method '{name}'");
            };
            Rc::clone(&slot.imp)
        };
        // Borrow released before the call: replacements are free to dispatch
        // nothing, but must never deadlock the table.
        imp(scene, args);
    }
}

impl Default for MethodTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SceneHost;

    fn probe_table() -> (MethodTable, Rc<RefCell<Vec<&'static str>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let table = MethodTable::new();
        let log = Rc::clone(&calls);
        table.register(
            methods::VIEW_DID_APPEAR,
            Rc::new(move |_scene, _args| log.borrow_mut().push("base")),
        );
        (table, calls)
    }

    #[test]
    fn install_missing_method_is_a_configuration_error() {
        let (table, _) = probe_table();
        let err = table.install("view_did_vanish", |orig| orig).unwrap_err();
        assert!(matches!(err, InstallError::MethodMissing("view_did_vanish")));
    }

    #[test]
    fn second_install_for_same_method_is_rejected() {
        let (table, _) = probe_table();
        table.install(methods::VIEW_DID_APPEAR, |orig| orig).unwrap();
        let err = table.install(methods::VIEW_DID_APPEAR, |orig| orig).unwrap_err();
        assert!(matches!(err, InstallError::AlreadyInstalled(_)));
    }

    #[test]
    fn replacement_forwards_to_original_with_same_receiver() {
        let (table, calls) = probe_table();
        let log = Rc::clone(&calls);
        table
            .install(methods::VIEW_DID_APPEAR, move |original| {
                Rc::new(move |scene, args| {
                    original(scene, args);
                    log.borrow_mut().push("replacement");
                })
            })
            .unwrap();

        let mut host = SceneHost::new();
        let scene = host.spawn("Probe");
        table.dispatch(methods::VIEW_DID_APPEAR, &scene, &MethodArgs::Animated(false));

        // Original ran first, exactly once, then the replacement's tail.
        assert_eq!(*calls.borrow(), vec!["base", "replacement"]);
    }

    #[test]
    #[should_panic(expected = "unregistered method")]
    fn dispatching_an_unregistered_method_panics() {
        let (table, _) = probe_table();
        let mut host = SceneHost::new();
        let scene = host.spawn("Probe");
        table.dispatch("no_such_method", &scene, &MethodArgs::None);
    }
}

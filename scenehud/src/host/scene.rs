//! Scene base type and the host that drives its lifecycle.
//!
//! Ownership runs root-to-leaf: the host's presentation stack holds strong
//! references to top-level scenes, containers hold strong references to their
//! children, and every back-pointer (child→parent, arena slot→scene) is weak.
//! Dropping a scene from the stack or its container is what deallocates it;
//! nothing in the tracking side may extend a scene's lifetime.
//!
//! Arena slots hand out [`SceneId`]s whose index component is reused after
//! the previous holder is gone, with the generation bumped on every reuse:
//! the identity-reuse hazard the metadata table must survive.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::debug;
use scenehud_common::SceneId;

use super::table::{methods, MethodArgs, MethodTable};

/// Shared handle to a live scene. Confined to the designated thread.
pub type SceneRef = Rc<RefCell<Scene>>;

/// Optional per-scene lifecycle callbacks, invoked by the tracker immediately
/// before the corresponding milestone note is published. Both default to
/// no-ops.
pub trait SceneDelegate {
    fn scene_did_present(&self, _scene: &SceneRef) {}
    fn scene_did_dismiss(&self, _scene: &SceneRef) {}
}

/// One node of the scene tree.
pub struct Scene {
    id: SceneId,
    title: String,
    parent: Weak<RefCell<Scene>>,
    children: Vec<SceneRef>,
    being_removed: bool,
    loaded: bool,
    visible: bool,
    delegate: Option<Rc<dyn SceneDelegate>>,
}

impl Scene {
    #[must_use]
    pub fn id(&self) -> SceneId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Human label for log lines: the title if there is one, otherwise the id.
    #[must_use]
    pub fn label(&self) -> String {
        if self.title.is_empty() {
            self.id.to_string()
        } else {
            self.title.clone()
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<SceneRef> {
        self.parent.upgrade()
    }

    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.parent.strong_count() > 0
    }

    /// Snapshot of the children in insertion order. Cloned handles, so the
    /// caller can walk the tree without holding this node's borrow.
    #[must_use]
    pub fn children_snapshot(&self) -> Vec<SceneRef> {
        self.children.clone()
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_being_removed(&self) -> bool {
        self.being_removed
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_delegate(&mut self, delegate: Rc<dyn SceneDelegate>) {
        self.delegate = Some(delegate);
    }

    #[must_use]
    pub fn delegate(&self) -> Option<Rc<dyn SceneDelegate>> {
        self.delegate.clone()
    }
}

// ============================================================================
// Host
// ============================================================================

struct ArenaSlot {
    generation: u32,
    live: Weak<RefCell<Scene>>,
    free: bool,
}

/// Owns the scene tree and issues every lifecycle call, serially, on the
/// designated thread, always through the method table.
pub struct SceneHost {
    table: Rc<MethodTable>,
    slots: Vec<ArenaSlot>,
    free: Vec<u32>,
    /// Presentation stack: index 0 is the root, the last entry is frontmost.
    stack: Vec<SceneRef>,
}

impl SceneHost {
    #[must_use]
    pub fn new() -> Self {
        let table = Rc::new(MethodTable::new());
        register_base_methods(&table);
        Self { table, slots: Vec::new(), free: Vec::new(), stack: Vec::new() }
    }

    /// The method table lifecycle calls dispatch through. Replacements are
    /// installed here, once, before any scene exists.
    #[must_use]
    pub fn table(&self) -> Rc<MethodTable> {
        Rc::clone(&self.table)
    }

    #[must_use]
    pub fn frontmost(&self) -> Option<SceneRef> {
        self.stack.last().cloned()
    }

    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Create a scene in a fresh-or-recycled arena slot and run its
    /// `view_did_load`. The host does not retain it; presentation or a
    /// container does.
    pub fn spawn(&mut self, title: &str) -> SceneRef {
        let id = self.allocate_id();
        let scene: SceneRef = Rc::new(RefCell::new(Scene {
            id,
            title: title.to_string(),
            parent: Weak::new(),
            children: Vec::new(),
            being_removed: false,
            loaded: false,
            visible: false,
            delegate: None,
        }));
        self.slots[id.index as usize].live = Rc::downgrade(&scene);
        self.table.dispatch(methods::VIEW_DID_LOAD, &scene, &MethodArgs::None);
        scene
    }

    /// Present `scene` frontmost on the stack. The covered scene stays
    /// visible underneath (sheet-style) and gets no lifecycle call.
    pub fn present(&mut self, scene: &SceneRef) {
        self.stack.push(Rc::clone(scene));
        self.table.dispatch(methods::VIEW_DID_APPEAR, scene, &MethodArgs::Animated(true));
    }

    /// Dismiss the frontmost scene: its visible child disappears first, then
    /// the scene itself, then the revealed scene underneath re-appears.
    /// Returns the dismissed scene; dropping the returned handle deallocates
    /// it (and its subtree).
    pub fn dismiss_top(&mut self) -> Option<SceneRef> {
        let top = self.stack.pop()?;
        top.borrow_mut().being_removed = true;

        let visible_child = top.borrow().children.last().cloned();
        if let Some(child) = visible_child {
            self.table.dispatch(methods::VIEW_DID_DISAPPEAR, &child, &MethodArgs::Animated(true));
        }
        self.table.dispatch(methods::VIEW_DID_DISAPPEAR, &top, &MethodArgs::Animated(true));

        if let Some(revealed) = self.stack.last().cloned() {
            self.table.dispatch(methods::VIEW_DID_APPEAR, &revealed, &MethodArgs::Animated(false));
        }
        Some(top)
    }

    /// Push `child` onto `container`: reparent, appear, and a (meaningless)
    /// disappear for the sibling it covers.
    pub fn push(&mut self, container: &SceneRef, child: &SceneRef) {
        let covered = container.borrow().children.last().cloned();
        {
            let mut c = container.borrow_mut();
            c.children.push(Rc::clone(child));
        }
        child.borrow_mut().parent = Rc::downgrade(container);

        self.table.dispatch(
            methods::DID_MOVE_TO_PARENT,
            child,
            &MethodArgs::Parent(Some(Rc::clone(container))),
        );
        self.table.dispatch(methods::VIEW_DID_APPEAR, child, &MethodArgs::Animated(true));
        if let Some(covered) = covered {
            self.table.dispatch(methods::VIEW_DID_DISAPPEAR, &covered, &MethodArgs::Animated(true));
        }
    }

    /// Pop the top child of `container`. Returns it so the caller controls
    /// when it is dropped.
    pub fn pop(&mut self, container: &SceneRef) -> Option<SceneRef> {
        let child = container.borrow_mut().children.pop()?;
        child.borrow_mut().being_removed = true;

        self.table.dispatch(methods::VIEW_DID_DISAPPEAR, &child, &MethodArgs::Animated(true));
        {
            let mut c = child.borrow_mut();
            c.parent = Weak::new();
            c.being_removed = false;
        }
        self.table.dispatch(methods::DID_MOVE_TO_PARENT, &child, &MethodArgs::Parent(None));

        if let Some(revealed) = container.borrow().children.last().cloned() {
            self.table.dispatch(methods::VIEW_DID_APPEAR, &revealed, &MethodArgs::Animated(true));
        }
        Some(child)
    }

    /// Detach `scene` from the stack or its parent without any per-child
    /// disappear calls (the torn-down-container path). Returns the detached
    /// scene (with its subtree still attached below it).
    pub fn detach(&mut self, scene: &SceneRef) -> SceneRef {
        if let Some(pos) = self.stack.iter().position(|s| Rc::ptr_eq(s, scene)) {
            self.stack.remove(pos);
        }
        if let Some(parent) = scene.borrow().parent() {
            let mut p = parent.borrow_mut();
            p.children.retain(|c| !Rc::ptr_eq(c, scene));
        }
        scene.borrow_mut().parent = Weak::new();

        self.table.dispatch(methods::DID_MOVE_TO_PARENT, scene, &MethodArgs::Parent(None));
        Rc::clone(scene)
    }

    /// Mark arena slots whose scene is gone as reusable. Runs automatically
    /// on spawn; callable directly when a test wants deterministic reuse.
    pub fn recycle(&mut self) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if !slot.free && slot.live.strong_count() == 0 {
                slot.free = true;
                #[allow(clippy::cast_possible_truncation)]
                self.free.push(idx as u32);
            }
        }
    }

    fn allocate_id(&mut self) -> SceneId {
        self.recycle();
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.free = false;
            slot.generation += 1;
            debug!("arena: reusing slot {index} at generation {}", slot.generation);
            return SceneId::new(index, slot.generation);
        }
        #[allow(clippy::cast_possible_truncation)]
        let index = self.slots.len() as u32;
        self.slots.push(ArenaSlot { generation: 0, live: Weak::new(), free: false });
        SceneId::new(index, 0)
    }
}

impl Default for SceneHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Base implementations: maintain the scene's own flags and log. Tree
/// structure is maintained by the host operations themselves; these methods
/// are the observation points.
fn register_base_methods(table: &MethodTable) {
    table.register(
        methods::VIEW_DID_LOAD,
        Rc::new(|scene, _args| {
            scene.borrow_mut().loaded = true;
            debug!("view_did_load: {}", scene.borrow().label());
        }),
    );
    table.register(
        methods::VIEW_DID_APPEAR,
        Rc::new(|scene, _args| {
            scene.borrow_mut().visible = true;
            debug!("view_did_appear: {}", scene.borrow().label());
        }),
    );
    table.register(
        methods::VIEW_DID_DISAPPEAR,
        Rc::new(|scene, _args| {
            scene.borrow_mut().visible = false;
            debug!("view_did_disappear: {}", scene.borrow().label());
        }),
    );
    table.register(
        methods::DID_MOVE_TO_PARENT,
        Rc::new(|scene, args| {
            let to = args.parent().map_or_else(|| "<nil>".to_string(), |p| p.borrow().label());
            debug!("did_move_to_parent: {} -> {to}", scene.borrow().label());
        }),
    );
}

//! Demo scenarios
//!
//! Drives the scene host through realistic lifecycle traffic: pushes, pops,
//! modal presentation, container teardown, and arena churn. The same steps
//! back both the scripted tours and the interactive overlay keys.

use std::collections::VecDeque;
use std::rc::Rc;

use log::{info, warn};

use crate::host::{SceneDelegate, SceneHost, SceneRef};

/// One host operation. Interactive commands map onto these one-to-one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Ensure the root container exists and is presented with a first child.
    Root,
    /// Push a fresh scene onto the root container.
    Push,
    /// Pop the top child of the root container (the first child stays).
    Pop,
    /// Present a modal container with one pushed child.
    PresentModal,
    /// Dismiss the modal container.
    DismissModal,
    /// Detach the root container with its children still attached.
    DetachRoot,
    /// Retire a pushed scene and respawn into the recycled arena slot.
    Churn,
}

/// The guided tour: one pass over every lifecycle path the tracker handles,
/// ending with container teardown and slot reuse.
#[must_use]
pub fn tour() -> VecDeque<Step> {
    VecDeque::from([
        Step::Root,
        Step::Push,
        Step::Push,
        Step::Pop,
        Step::PresentModal,
        Step::DismissModal,
        Step::Churn,
        Step::Push,
        Step::DetachRoot,
        Step::Root,
        Step::Push,
    ])
}

/// Arena-churn stress: repeated retire-and-respawn over recycled slots.
#[must_use]
pub fn churn() -> VecDeque<Step> {
    let mut steps = VecDeque::from([Step::Root]);
    for _ in 0..8 {
        steps.push_back(Step::Churn);
    }
    steps
}

/// Demo delegate: logs the milestone callbacks so the hook path is visible
/// in a `RUST_LOG=info` run.
struct LoggingDelegate;

impl SceneDelegate for LoggingDelegate {
    fn scene_did_present(&self, scene: &SceneRef) {
        info!("delegate: presented '{}'", scene.borrow().label());
    }

    fn scene_did_dismiss(&self, scene: &SceneRef) {
        info!("delegate: dismissed '{}'", scene.borrow().label());
    }
}

/// Applies steps to the host, tracking the demo's root and modal containers.
pub struct Driver {
    scene_count: u64,
    root: Option<SceneRef>,
    modal: Option<SceneRef>,
}

impl Driver {
    #[must_use]
    pub fn new() -> Self {
        Self { scene_count: 0, root: None, modal: None }
    }

    /// Apply one step. Steps that need a root create one on demand; steps
    /// that make no sense in the current shape (pop with one child, dismiss
    /// with no modal) log and do nothing.
    pub fn apply(&mut self, host: &mut SceneHost, step: Step) {
        match step {
            Step::Root => {
                if self.root.is_none() {
                    let root = host.spawn("Main Nav");
                    host.present(&root);
                    let first = self.spawn_numbered(host);
                    host.push(&root, &first);
                    self.root = Some(root);
                }
            }
            Step::Push => {
                let root = self.ensure_root(host);
                let child = self.spawn_numbered(host);
                host.push(&root, &child);
            }
            Step::Pop => {
                let root = self.ensure_root(host);
                if root.borrow().child_count() > 1 {
                    drop(host.pop(&root));
                } else {
                    warn!("pop skipped: root container is at its first child");
                }
            }
            Step::PresentModal => {
                if self.modal.is_none() {
                    let modal = host.spawn("Modal Nav");
                    host.present(&modal);
                    let child = self.spawn_numbered(host);
                    host.push(&modal, &child);
                    self.modal = Some(modal);
                } else {
                    warn!("present skipped: a modal is already up");
                }
            }
            Step::DismissModal => match self.modal.take() {
                Some(modal)
                    if host.frontmost().is_some_and(|top| Rc::ptr_eq(&top, &modal)) =>
                {
                    drop(host.dismiss_top());
                }
                Some(modal) => {
                    warn!("dismiss skipped: the modal is not frontmost");
                    self.modal = Some(modal);
                }
                None => warn!("dismiss skipped: no modal is up"),
            },
            Step::DetachRoot => {
                if let Some(root) = self.root.take() {
                    drop(host.detach(&root));
                }
            }
            Step::Churn => {
                let root = self.ensure_root(host);
                let doomed = self.spawn_numbered(host);
                host.push(&root, &doomed);
                drop(host.pop(&root));
                drop(doomed);
                // The next spawn lands in the retired scene's arena slot.
                let fresh = self.spawn_numbered(host);
                host.push(&root, &fresh);
            }
        }
    }

    fn ensure_root(&mut self, host: &mut SceneHost) -> SceneRef {
        if self.root.is_none() {
            self.apply(host, Step::Root);
        }
        self.root.clone().unwrap_or_else(|| unreachable!("Root step always sets the root"))
    }

    fn spawn_numbered(&mut self, host: &mut SceneHost) -> SceneRef {
        self.scene_count += 1;
        let scene = host.spawn(&format!("Scene {:>3}", self.scene_count));
        scene.borrow_mut().set_delegate(Rc::new(LoggingDelegate));
        scene
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_step_is_idempotent() {
        let mut host = SceneHost::new();
        let mut driver = Driver::new();
        driver.apply(&mut host, Step::Root);
        driver.apply(&mut host, Step::Root);
        assert_eq!(host.stack_depth(), 1);
    }

    #[test]
    fn tour_runs_clean_on_a_bare_host() {
        let mut host = SceneHost::new();
        let mut driver = Driver::new();
        for step in tour() {
            driver.apply(&mut host, step);
        }
        // Tour ends with a rebuilt root plus one pushed scene.
        assert_eq!(host.stack_depth(), 1);
        let root = host.frontmost().unwrap();
        assert_eq!(root.borrow().child_count(), 2);
    }

    #[test]
    fn churn_reuses_arena_slots() {
        let mut host = SceneHost::new();
        let mut driver = Driver::new();
        driver.apply(&mut host, Step::Root);
        driver.apply(&mut host, Step::Churn);

        let root = host.frontmost().unwrap();
        let last = root.borrow().children_snapshot().last().cloned().unwrap();
        assert!(last.borrow().id().generation > 0, "churn must land in a recycled slot");
    }
}

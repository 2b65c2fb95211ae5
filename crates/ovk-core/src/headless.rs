#![forbid(unsafe_code)]

//! In-memory document host for tests and embedders.
//!
//! `HeadlessDocument` implements [`FocusHost`] and [`ScrollLockHost`] over a
//! flat node arena: nodes attach under an optional parent, keep insertion
//! order as document order, and can be detached again (detaching a subtree
//! root detaches the whole subtree). The scroll-lock side records lock and
//! unlock call counts so tests can assert the coordinator's exactly-once
//! forwarding.
//!
//! # Invariants
//!
//! - Node ids are never reused; a detached node stays known (and
//!   `is_attached` = false) forever.
//! - Document order is attach order, stable across detaches.
//! - Detaching the focused node clears the focus register.
//!
//! # Failure Modes
//!
//! - Operations on ids from a different document are treated as unknown:
//!   queries return `false`/`None`/empty, mutations are no-ops.

use std::cell::{Cell, RefCell};

use ahash::AHashMap;

use crate::focus::{FocusHost, FocusTarget};
use crate::scroll_lock::ScrollLockHost;

struct Node {
    target: FocusTarget,
    parent: Option<FocusTarget>,
    focusable: bool,
    attached: bool,
}

#[derive(Default)]
struct NodeArena {
    entries: Vec<Node>,
    index: AHashMap<u64, usize>,
    next_id: u64,
}

impl NodeArena {
    fn insert(&mut self, parent: Option<FocusTarget>, focusable: bool) -> FocusTarget {
        self.next_id += 1;
        let target = FocusTarget::new(self.next_id);
        self.index.insert(target.id(), self.entries.len());
        self.entries.push(Node {
            target,
            parent,
            focusable,
            attached: true,
        });
        target
    }

    fn get(&self, target: FocusTarget) -> Option<&Node> {
        self.index.get(&target.id()).map(|&i| &self.entries[i])
    }

    fn is_attached(&self, target: FocusTarget) -> bool {
        self.get(target).is_some_and(|n| n.attached)
    }

    /// Whether `target` sits under `ancestor` (strictly below it), following
    /// the parent chain.
    fn is_descendant(&self, target: FocusTarget, ancestor: FocusTarget) -> bool {
        let mut cursor = self.get(target).and_then(|n| n.parent);
        while let Some(parent) = cursor {
            if parent == ancestor {
                return true;
            }
            cursor = self.get(parent).and_then(|n| n.parent);
        }
        false
    }

    fn detach_subtree(&mut self, root: FocusTarget) {
        if self.get(root).is_none() {
            return;
        }
        let descendants: Vec<FocusTarget> = self
            .entries
            .iter()
            .filter(|n| n.attached && self.is_descendant(n.target, root))
            .map(|n| n.target)
            .collect();
        for target in std::iter::once(root).chain(descendants) {
            if let Some(&i) = self.index.get(&target.id()) {
                self.entries[i].attached = false;
            }
        }
    }
}

/// An in-memory document implementing both host capabilities.
///
/// Share it as `Rc<HeadlessDocument>`; the `Rc` coerces to
/// `Rc<dyn FocusHost>` and `Rc<dyn ScrollLockHost>` where needed.
#[derive(Default)]
pub struct HeadlessDocument {
    arena: RefCell<NodeArena>,
    focused: Cell<Option<FocusTarget>>,
    scroll_locked: Cell<bool>,
    lock_calls: Cell<u32>,
    unlock_calls: Cell<u32>,
}

impl HeadlessDocument {
    /// Create an empty document with scrolling enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a focusable node, optionally under `parent`.
    pub fn attach_focusable(&self, parent: Option<FocusTarget>) -> FocusTarget {
        self.arena.borrow_mut().insert(parent, true)
    }

    /// Attach a non-focusable container node, optionally under `parent`.
    ///
    /// Containers still accept programmatic focus via `set_focus`; an
    /// overlay container receives focus when it has no focusable
    /// descendants.
    pub fn attach_container(&self, parent: Option<FocusTarget>) -> FocusTarget {
        self.arena.borrow_mut().insert(parent, false)
    }

    /// Detach `target` and its entire subtree.
    ///
    /// Clears the focus register when the focused node is detached.
    pub fn detach(&self, target: FocusTarget) {
        self.arena.borrow_mut().detach_subtree(target);
        if let Some(focused) = self.focused.get()
            && !self.arena.borrow().is_attached(focused)
        {
            self.focused.set(None);
        }
    }

    /// Current state of the scroll-lock flag.
    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked.get()
    }

    /// How many times `lock()` was called (including idempotent repeats).
    pub fn lock_calls(&self) -> u32 {
        self.lock_calls.get()
    }

    /// How many times `unlock()` was called (including idempotent repeats).
    pub fn unlock_calls(&self) -> u32 {
        self.unlock_calls.get()
    }
}

impl FocusHost for HeadlessDocument {
    fn current_focus(&self) -> Option<FocusTarget> {
        self.focused.get()
    }

    fn set_focus(&self, target: FocusTarget) -> bool {
        if self.arena.borrow().is_attached(target) {
            self.focused.set(Some(target));
            true
        } else {
            false
        }
    }

    fn focusable_descendants(&self, container: FocusTarget) -> Vec<FocusTarget> {
        let arena = self.arena.borrow();
        arena
            .entries
            .iter()
            .filter(|n| n.attached && n.focusable && arena.is_descendant(n.target, container))
            .map(|n| n.target)
            .collect()
    }

    fn is_attached(&self, target: FocusTarget) -> bool {
        self.arena.borrow().is_attached(target)
    }
}

impl ScrollLockHost for HeadlessDocument {
    fn lock(&self) {
        self.lock_calls.set(self.lock_calls.get() + 1);
        self.scroll_locked.set(true);
    }

    fn unlock(&self) {
        self.unlock_calls.set(self.unlock_calls.get() + 1);
        self.scroll_locked.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detach_is_transitive() {
        let doc = HeadlessDocument::new();
        let root = doc.attach_container(None);
        let inner = doc.attach_container(Some(root));
        let leaf = doc.attach_focusable(Some(inner));
        let sibling = doc.attach_focusable(None);

        doc.detach(root);

        assert!(!doc.is_attached(root));
        assert!(!doc.is_attached(inner));
        assert!(!doc.is_attached(leaf));
        assert!(doc.is_attached(sibling));
    }

    #[test]
    fn detached_nodes_leave_descendant_queries() {
        let doc = HeadlessDocument::new();
        let root = doc.attach_container(None);
        let a = doc.attach_focusable(Some(root));
        let b = doc.attach_focusable(Some(root));

        doc.detach(a);
        assert_eq!(doc.focusable_descendants(root), vec![b]);
    }

    #[test]
    fn containers_are_not_focusable_but_accept_focus() {
        let doc = HeadlessDocument::new();
        let root = doc.attach_container(None);
        let inner = doc.attach_container(Some(root));

        assert!(doc.focusable_descendants(root).is_empty());
        assert!(doc.set_focus(inner));
        assert_eq!(doc.current_focus(), Some(inner));
    }

    #[test]
    fn detaching_focused_node_clears_focus() {
        let doc = HeadlessDocument::new();
        let root = doc.attach_container(None);
        let field = doc.attach_focusable(Some(root));
        doc.set_focus(field);

        doc.detach(root);
        assert_eq!(doc.current_focus(), None);
    }

    #[test]
    fn unknown_target_is_rejected() {
        let doc = HeadlessDocument::new();
        let foreign = FocusTarget::new(9999);
        assert!(!doc.is_attached(foreign));
        assert!(!doc.set_focus(foreign));
        assert!(doc.focusable_descendants(foreign).is_empty());
    }

    #[test]
    fn lock_primitives_are_idempotent_but_counted() {
        let doc = HeadlessDocument::new();
        doc.lock();
        doc.lock();
        assert!(doc.scroll_locked());
        assert_eq!(doc.lock_calls(), 2);

        doc.unlock();
        assert!(!doc.scroll_locked());
        assert_eq!(doc.unlock_calls(), 1);
    }
}

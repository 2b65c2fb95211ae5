#![forbid(unsafe_code)]

//! Snapshot-based focus trap.
//!
//! The trap is the set of focusable descendants of the overlay container,
//! captured once when the overlay reaches Open. Tab order is the snapshot
//! order (document order from the host). The snapshot is deliberately not
//! live: elements added to the overlay afterwards do not join the trap until
//! the next open cycle.
//!
//! # Invariants
//!
//! - `next`/`prev` always return a member of the snapshot (or `None` on an
//!   empty snapshot).
//! - Cycling wraps: `next` of the last element is the first, `prev` of the
//!   first is the last.
//! - A current focus outside the snapshot re-enters at the first element
//!   (`next`) or the last (`prev`).
//!
//! # Failure Modes
//!
//! - Empty snapshot: every navigation query returns `None`; the caller
//!   leaves focus on the container.

use ovk_core::focus::{FocusHost, FocusTarget};

/// An ordered snapshot of the focusable elements inside one overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusTrap {
    targets: Vec<FocusTarget>,
}

impl FocusTrap {
    /// Snapshot the focusable descendants of `container` right now.
    pub fn capture(host: &dyn FocusHost, container: FocusTarget) -> Self {
        Self {
            targets: host.focusable_descendants(container),
        }
    }

    /// The auto-focus target: first element of the snapshot.
    pub fn first(&self) -> Option<FocusTarget> {
        self.targets.first().copied()
    }

    /// Last element of the snapshot.
    pub fn last(&self) -> Option<FocusTarget> {
        self.targets.last().copied()
    }

    /// The element Tab moves to from `current`, wrapping at the end.
    pub fn next(&self, current: FocusTarget) -> Option<FocusTarget> {
        match self.targets.iter().position(|&t| t == current) {
            Some(i) => self.targets.get((i + 1) % self.targets.len()).copied(),
            None => self.first(),
        }
    }

    /// The element Shift+Tab moves to from `current`, wrapping at the start.
    pub fn prev(&self, current: FocusTarget) -> Option<FocusTarget> {
        match self.targets.iter().position(|&t| t == current) {
            Some(0) => self.last(),
            Some(i) => self.targets.get(i - 1).copied(),
            None => self.last(),
        }
    }

    /// Whether `target` is part of the snapshot.
    pub fn contains(&self, target: FocusTarget) -> bool {
        self.targets.contains(&target)
    }

    /// Whether the snapshot is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of trapped elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// The snapshot in Tab order.
    pub fn targets(&self) -> &[FocusTarget] {
        &self.targets
    }
}

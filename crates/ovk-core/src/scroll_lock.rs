#![forbid(unsafe_code)]

//! Background scroll-lock coordination.
//!
//! The document's scroll-lock flag is process-wide state with one writer at
//! a time. Overlapping overlays (one dialog opening another) must not fight
//! over it: the first active overlay asserts the lock, the last one to close
//! releases it. [`ScrollLockCoordinator`] implements that reference counting
//! over a host's raw [`ScrollLockHost::lock`]/[`ScrollLockHost::unlock`]
//! primitives, and hands out RAII [`ScrollLockGuard`]s so the release runs
//! on every exit path: normal close, forced teardown, or plain `Drop`.
//!
//! # Invariants
//!
//! 1. `host.lock()` is called exactly on the 0→1 holder transition,
//!    `host.unlock()` exactly on 1→0.
//! 2. A guard releases exactly once (enforced by move semantics; guards are
//!    not `Clone`).
//! 3. All overlays that can overlap must share one coordinator; two
//!    coordinators over one host each count independently and the host lock
//!    only behaves because `lock`/`unlock` are required to be idempotent.
//!
//! # Failure Modes
//!
//! - Guard leaked (`std::mem::forget`): the holder count never reaches zero
//!   and the lock stays asserted. Nothing here can detect that; don't leak
//!   guards.

use std::cell::Cell;
use std::rc::Rc;

#[cfg(feature = "tracing")]
use tracing::trace;

/// Raw scroll-lock primitives on the host document.
///
/// Both operations must be idempotent: locking an already-locked document or
/// unlocking an unlocked one is a no-op.
pub trait ScrollLockHost {
    /// Suppress background scrolling.
    fn lock(&self);

    /// Re-enable background scrolling.
    fn unlock(&self);
}

struct CoordinatorInner {
    host: Rc<dyn ScrollLockHost>,
    holders: Cell<usize>,
}

/// Reference-counted scroll-lock handle shared by all overlays on a document.
///
/// Cloning shares the count; see invariant 3 above.
#[derive(Clone)]
pub struct ScrollLockCoordinator {
    inner: Rc<CoordinatorInner>,
}

impl ScrollLockCoordinator {
    /// Create a coordinator over `host`.
    pub fn new(host: Rc<dyn ScrollLockHost>) -> Self {
        Self {
            inner: Rc::new(CoordinatorInner {
                host,
                holders: Cell::new(0),
            }),
        }
    }

    /// Acquire a lock reference.
    ///
    /// Asserts the host lock when this is the first outstanding reference.
    /// The reference is released when the returned guard drops.
    #[must_use = "dropping the guard immediately releases the lock reference"]
    pub fn acquire(&self) -> ScrollLockGuard {
        let holders = self.inner.holders.get();
        if holders == 0 {
            self.inner.host.lock();
            #[cfg(feature = "tracing")]
            trace!("scroll lock asserted");
        }
        self.inner.holders.set(holders + 1);
        ScrollLockGuard {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Number of outstanding lock references.
    #[inline]
    pub fn holders(&self) -> usize {
        self.inner.holders.get()
    }

    /// Whether at least one reference is outstanding.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.holders() > 0
    }
}

impl std::fmt::Debug for ScrollLockCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollLockCoordinator")
            .field("holders", &self.holders())
            .finish()
    }
}

/// RAII token for one scroll-lock reference.
///
/// Dropping it decrements the shared count and releases the host lock when
/// the count reaches zero.
pub struct ScrollLockGuard {
    inner: Rc<CoordinatorInner>,
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        let holders = self.inner.holders.get();
        debug_assert!(holders > 0, "guard outlived its coordinator count");
        let holders = holders.saturating_sub(1);
        self.inner.holders.set(holders);
        if holders == 0 {
            self.inner.host.unlock();
            #[cfg(feature = "tracing")]
            trace!("scroll lock released");
        }
    }
}

impl std::fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollLockGuard")
            .field("holders", &self.inner.holders.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDocument;

    #[test]
    fn first_acquire_locks_host() {
        let doc = Rc::new(HeadlessDocument::new());
        let coordinator = ScrollLockCoordinator::new(doc.clone());

        assert!(!doc.scroll_locked());
        let guard = coordinator.acquire();
        assert!(doc.scroll_locked());
        assert_eq!(doc.lock_calls(), 1);
        assert_eq!(coordinator.holders(), 1);

        drop(guard);
        assert!(!doc.scroll_locked());
        assert_eq!(doc.unlock_calls(), 1);
        assert_eq!(coordinator.holders(), 0);
    }

    #[test]
    fn overlapping_acquires_lock_once() {
        let doc = Rc::new(HeadlessDocument::new());
        let coordinator = ScrollLockCoordinator::new(doc.clone());

        let a = coordinator.acquire();
        let b = coordinator.acquire();
        assert_eq!(doc.lock_calls(), 1);
        assert_eq!(coordinator.holders(), 2);

        drop(a);
        assert!(doc.scroll_locked(), "one holder remains");
        assert_eq!(doc.unlock_calls(), 0);

        drop(b);
        assert!(!doc.scroll_locked());
        assert_eq!(doc.unlock_calls(), 1);
    }

    #[test]
    fn clones_share_the_count() {
        let doc = Rc::new(HeadlessDocument::new());
        let coordinator = ScrollLockCoordinator::new(doc.clone());
        let other = coordinator.clone();

        let guard = coordinator.acquire();
        assert_eq!(other.holders(), 1);
        assert!(other.is_locked());

        drop(guard);
        assert!(!other.is_locked());
    }

    #[test]
    fn release_order_does_not_matter() {
        let doc = Rc::new(HeadlessDocument::new());
        let coordinator = ScrollLockCoordinator::new(doc.clone());

        let a = coordinator.acquire();
        let b = coordinator.acquire();
        let c = coordinator.acquire();

        drop(b);
        drop(a);
        assert!(doc.scroll_locked());
        drop(c);
        assert!(!doc.scroll_locked());
        assert_eq!(doc.lock_calls(), 1);
        assert_eq!(doc.unlock_calls(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Host flag tracks "any holder outstanding" across arbitrary
            /// acquire/release interleavings, and lock/unlock calls pair up.
            #[test]
            fn flag_matches_holders(ops in proptest::collection::vec(any::<bool>(), 1..64)) {
                let doc = Rc::new(HeadlessDocument::new());
                let coordinator = ScrollLockCoordinator::new(doc.clone());
                let mut guards = Vec::new();

                for acquire in ops {
                    if acquire {
                        guards.push(coordinator.acquire());
                    } else if !guards.is_empty() {
                        // Release the oldest outstanding guard.
                        guards.remove(0);
                    }
                    prop_assert_eq!(coordinator.holders(), guards.len());
                    prop_assert_eq!(doc.scroll_locked(), !guards.is_empty());
                }

                guards.clear();
                prop_assert!(!doc.scroll_locked());
                prop_assert_eq!(doc.lock_calls(), doc.unlock_calls());
            }
        }
    }

    #[test]
    fn reacquire_after_drain_locks_again() {
        let doc = Rc::new(HeadlessDocument::new());
        let coordinator = ScrollLockCoordinator::new(doc.clone());

        drop(coordinator.acquire());
        drop(coordinator.acquire());

        assert_eq!(doc.lock_calls(), 2);
        assert_eq!(doc.unlock_calls(), 2);
        assert!(!doc.scroll_locked());
    }
}

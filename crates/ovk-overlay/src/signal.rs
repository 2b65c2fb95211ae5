#![forbid(unsafe_code)]

//! Phase-change notification plumbing.
//!
//! The rendering surface subscribes to the controller to learn when to mount
//! or unmount overlay markup. Subscriptions follow the usual single-threaded
//! reactive contract:
//!
//! # Invariants
//!
//! 1. Callbacks run in registration order.
//! 2. Dropping a [`PhaseSubscription`] removes the callback before the next
//!    notification cycle.
//! 3. Emission snapshots the subscriber list first, so a callback may drop
//!    its own (or another) subscription mid-notification without poisoning
//!    the cycle; the removal takes effect from the next cycle.
//!
//! # Failure Modes
//!
//! - A callback that panics propagates to the host that triggered the
//!   transition; the controller holds no state that would be corrupted by
//!   unwinding past it.
//! - Callbacks must not call back into the controller that notified them
//!   (the controller is `&mut` during notification); hosts that need to
//!   react with a transition do so after `handle_event`/`open`/`close`
//!   returns.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::lifecycle::PhaseChange;

type Callback = Rc<RefCell<dyn FnMut(PhaseChange)>>;

#[derive(Default)]
struct SignalInner {
    next_id: u64,
    subscribers: Vec<(u64, Callback)>,
}

/// Subscriber registry for one controller.
#[derive(Default)]
pub(crate) struct PhaseSignal {
    inner: Rc<RefCell<SignalInner>>,
}

impl PhaseSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register `callback`; it stays registered while the returned guard
    /// lives.
    pub(crate) fn subscribe(
        &self,
        callback: impl FnMut(PhaseChange) + 'static,
    ) -> PhaseSubscription {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .subscribers
            .push((id, Rc::new(RefCell::new(callback))));
        PhaseSubscription {
            signal: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Notify all current subscribers of `change`, in registration order.
    pub(crate) fn emit(&self, change: PhaseChange) {
        let snapshot: Vec<Callback> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in snapshot {
            (callback.borrow_mut())(change);
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

/// RAII guard for one phase-change subscription.
///
/// Dropping it unsubscribes; dropping it after the controller is gone is a
/// no-op.
#[must_use = "dropping the subscription immediately unsubscribes"]
pub struct PhaseSubscription {
    signal: Weak<RefCell<SignalInner>>,
    id: u64,
}

impl Drop for PhaseSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.signal.upgrade() {
            inner.borrow_mut().subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for PhaseSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseSubscription")
            .field("id", &self.id)
            .field("live", &(self.signal.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::OverlayPhase;

    fn change() -> PhaseChange {
        PhaseChange {
            from: OverlayPhase::Closed,
            to: OverlayPhase::Opening,
        }
    }

    #[test]
    fn notifies_in_registration_order() {
        let signal = PhaseSignal::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let first = order.clone();
        let _a = signal.subscribe(move |_| first.borrow_mut().push("a"));
        let second = order.clone();
        let _b = signal.subscribe(move |_| second.borrow_mut().push("b"));

        signal.emit(change());
        assert_eq!(*order.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn dropping_guard_unsubscribes() {
        let signal = PhaseSignal::new();
        let hits = Rc::new(RefCell::new(0));

        let counter = hits.clone();
        let sub = signal.subscribe(move |_| *counter.borrow_mut() += 1);
        signal.emit(change());
        assert_eq!(*hits.borrow(), 1);

        drop(sub);
        assert_eq!(signal.subscriber_count(), 0);
        signal.emit(change());
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn unsubscribe_during_emit_is_safe() {
        let signal = PhaseSignal::new();
        let slot: Rc<RefCell<Option<PhaseSubscription>>> = Rc::new(RefCell::new(None));
        let hits = Rc::new(RefCell::new(0));

        let own = slot.clone();
        let counter = hits.clone();
        let sub = signal.subscribe(move |_| {
            *counter.borrow_mut() += 1;
            // Drop our own subscription from inside the callback.
            own.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        signal.emit(change());
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(signal.subscriber_count(), 0);

        // Second cycle: nothing left to call.
        signal.emit(change());
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn guard_outliving_signal_is_a_noop() {
        let signal = PhaseSignal::new();
        let sub = signal.subscribe(|_| {});
        drop(signal);
        drop(sub); // must not panic
    }

    #[test]
    fn change_carries_endpoints() {
        let signal = PhaseSignal::new();
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        let _sub = signal.subscribe(move |c| *sink.borrow_mut() = Some(c));

        signal.emit(change());
        let seen = (*seen.borrow()).expect("callback ran");
        assert_eq!(seen.from, OverlayPhase::Closed);
        assert_eq!(seen.to, OverlayPhase::Opening);
    }
}

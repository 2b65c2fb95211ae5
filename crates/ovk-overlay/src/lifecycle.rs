#![forbid(unsafe_code)]

//! Overlay lifecycle controller.
//!
//! [`LifecycleController`] owns the open/closed transition of one modal-like
//! overlay and the accessibility side effects that ride on it: prior-focus
//! capture and restoration, first-focusable autofocus, Tab trapping, and the
//! background scroll lock. It drives the document only through the
//! `ovk-core` capability traits and never touches markup; the rendering
//! surface mounts and unmounts based on phase notifications.
//!
//! Phases: `Closed → Opening → Open → Closing → Closed`. The transit phases
//! resolve synchronously inside `open()`/`close()`; any open/close
//! animation is the host's concern, layered on top of the notifications.
//!
//! # Invariants
//!
//! 1. Prior focus is captured exactly once per cycle (entering Opening) and
//!    consumed exactly once (entering Closed via `close()`).
//! 2. The scroll-lock guard is held exactly while phase ≠ Closed; it is
//!    released on every path back to Closed, including forced teardown and
//!    plain `Drop`.
//! 3. The focus trap is the snapshot taken at entry to Open; it never
//!    changes until the next cycle.
//! 4. Redundant `open()`/`close()` calls are silent no-ops; nothing queues.
//! 5. Subscribers observe every phase edge, in order, after the
//!    controller's own side effects for that edge have run.
//!
//! # Failure Modes
//!
//! - Prior focus target detached by close time: restoration is skipped
//!   silently.
//! - No focusable descendants at open time: autofocus falls back to the
//!   container; Tab becomes a no-op.
//! - Both dismiss channels disabled: only `close()`/`teardown()` can end the
//!   cycle. Caller contract, not validated here.
//! - Dropping the controller releases the scroll lock but notifies nobody;
//!   call [`teardown`](LifecycleController::teardown) first when listeners
//!   are still mounted.
//!
//! # Example
//!
//! ```ignore
//! let mut controller = LifecycleController::new(container, document, coordinator);
//! let _sub = controller.subscribe(|change| surface.phase_changed(change));
//!
//! controller.open(OverlayConfig::default());
//! // ... feed host events while controller.wants_events() ...
//! controller.handle_event(&Event::key_press(KeyCode::Escape));
//! assert_eq!(controller.phase(), OverlayPhase::Closed);
//! ```

use std::rc::Rc;

use tracing::{debug, trace};

use ovk_core::event::{Event, KeyCode, Modifiers, PointerButton, PointerRegion};
use ovk_core::focus::{FocusHost, FocusTarget};
use ovk_core::scroll_lock::{ScrollLockCoordinator, ScrollLockGuard};

use crate::config::OverlayConfig;
use crate::signal::{PhaseSignal, PhaseSubscription};
use crate::trap::FocusTrap;

/// Where an overlay is in its open/closed cycle.
///
/// `Opening` and `Closing` exist so subscribers can distinguish the edges of
/// a cycle; both resolve synchronously, so a controller at rest is only ever
/// `Closed` or `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum OverlayPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

impl OverlayPhase {
    /// Whether this is the resting closed state.
    #[inline]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Whether the overlay holds document-level resources (any non-Closed
    /// phase).
    #[inline]
    pub const fn is_active(self) -> bool {
        !self.is_closed()
    }
}

/// One phase edge, delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PhaseChange {
    pub from: OverlayPhase,
    pub to: OverlayPhase,
}

/// Why a user-initiated dismissal closed the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissAction {
    /// Escape was pressed with `close_on_escape` enabled.
    EscapePressed,
    /// The backdrop was left-clicked with `close_on_backdrop` enabled.
    BackdropClicked,
}

/// Per-cycle state, created entering Opening and dropped leaving Closing.
///
/// Bundling the scroll-lock guard here is what makes invariant 2 structural:
/// any path that clears `active` releases the lock.
struct ActiveOverlay {
    config: OverlayConfig,
    prior_focus: Option<FocusTarget>,
    trap: FocusTrap,
    _scroll: ScrollLockGuard,
}

/// The overlay lifecycle state machine.
///
/// One controller instance manages one overlay. Overlapping overlays each
/// get their own controller; they share a [`ScrollLockCoordinator`] so the
/// document lock is released only when the last one closes, while each
/// restores its own prior focus.
pub struct LifecycleController {
    /// The overlay container element in the host document.
    container: FocusTarget,
    focus: Rc<dyn FocusHost>,
    scroll: ScrollLockCoordinator,
    phase: OverlayPhase,
    /// `Some` iff `phase.is_active()`.
    active: Option<ActiveOverlay>,
    signal: PhaseSignal,
}

impl LifecycleController {
    /// Create a controller for the overlay rooted at `container`.
    pub fn new(
        container: FocusTarget,
        focus: Rc<dyn FocusHost>,
        scroll: ScrollLockCoordinator,
    ) -> Self {
        Self {
            container,
            focus,
            scroll,
            phase: OverlayPhase::Closed,
            active: None,
            signal: PhaseSignal::new(),
        }
    }

    // --- Queries ---

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    /// Whether the host should have its key/click listeners attached.
    ///
    /// True for every non-Closed phase; flips back to false on reaching
    /// Closed, so listeners never leak across cycles.
    #[inline]
    pub fn wants_events(&self) -> bool {
        self.phase.is_active()
    }

    /// The config snapshot of the current cycle, if one is active.
    pub fn active_config(&self) -> Option<OverlayConfig> {
        self.active.as_ref().map(|a| a.config)
    }

    /// The element focus will be restored to on close, if one was captured
    /// and a cycle is active.
    pub fn prior_focus(&self) -> Option<FocusTarget> {
        self.active.as_ref().and_then(|a| a.prior_focus)
    }

    /// The focus-trap snapshot of the current cycle.
    pub fn trap(&self) -> Option<&FocusTrap> {
        self.active.as_ref().map(|a| &a.trap)
    }

    /// The overlay container this controller was created for.
    #[inline]
    pub fn container(&self) -> FocusTarget {
        self.container
    }

    // --- Subscriptions ---

    /// Subscribe to phase changes.
    ///
    /// The callback runs for every edge while the returned guard lives. It
    /// must not call back into this controller (the controller is mid-
    /// transition when callbacks run); hosts react after the triggering
    /// operation returns.
    pub fn subscribe(&self, callback: impl FnMut(PhaseChange) + 'static) -> PhaseSubscription {
        self.signal.subscribe(callback)
    }

    // --- Transitions ---

    /// Open the overlay with `config`.
    ///
    /// No-op unless phase is Closed. Captures the currently focused element
    /// for later restoration, asserts the scroll lock, then resolves
    /// Opening → Open synchronously, auto-focusing per config.
    pub fn open(&mut self, config: OverlayConfig) {
        if self.phase != OverlayPhase::Closed {
            trace!(phase = ?self.phase, "open ignored: cycle already active");
            return;
        }
        let prior_focus = self.focus.current_focus();
        let guard = self.scroll.acquire();
        self.active = Some(ActiveOverlay {
            config,
            prior_focus,
            trap: FocusTrap::default(),
            _scroll: guard,
        });
        debug!(prior = ?prior_focus.map(FocusTarget::id), "overlay opening");
        self.set_phase(OverlayPhase::Opening);
        self.finish_opening();
    }

    /// Close the overlay.
    ///
    /// No-op when phase is Closed or Closing. Resolves Closing → Closed
    /// synchronously: releases the scroll-lock reference, then restores
    /// focus to the captured prior element when it is still attached.
    pub fn close(&mut self) {
        if matches!(self.phase, OverlayPhase::Closed | OverlayPhase::Closing) {
            trace!(phase = ?self.phase, "close ignored");
            return;
        }
        debug!("overlay closing");
        self.set_phase(OverlayPhase::Closing);
        self.finish_closing();
    }

    /// Handle a host input event.
    ///
    /// Dismiss signals and Tab trapping act only in Open; in every other
    /// phase the event is absorbed without effect. Returns the dismissal
    /// that closed the overlay, if this event caused one.
    pub fn handle_event(&mut self, event: &Event) -> Option<DismissAction> {
        if self.phase != OverlayPhase::Open {
            return None;
        }
        let config = self.active.as_ref()?.config;
        match *event {
            Event::Key(key) if key.is_press() => match key.code {
                KeyCode::Escape if config.close_on_escape => {
                    debug!("dismiss: escape");
                    self.close();
                    Some(DismissAction::EscapePressed)
                }
                KeyCode::Tab => {
                    self.cycle_focus(key.modifiers.contains(Modifiers::SHIFT));
                    None
                }
                _ => None,
            },
            Event::Pointer(pointer)
                if pointer.button == PointerButton::Left
                    && pointer.region == PointerRegion::Backdrop
                    && config.close_on_backdrop =>
            {
                debug!("dismiss: backdrop click");
                self.close();
                Some(DismissAction::BackdropClicked)
            }
            _ => None,
        }
    }

    /// Forced teardown: the owning surface is unmounting.
    ///
    /// From any phase, drops straight to Closed. The scroll-lock reference
    /// is released unconditionally; focus restoration is not attempted (the
    /// document may be going away with the owner; a host that wants
    /// restoration calls [`close`](Self::close) instead).
    pub fn teardown(&mut self) {
        if self.phase == OverlayPhase::Closed {
            return;
        }
        debug!(phase = ?self.phase, "forced teardown");
        self.active = None;
        self.set_phase(OverlayPhase::Closed);
    }

    // --- Internal steps ---

    fn finish_opening(&mut self) {
        let trap = FocusTrap::capture(self.focus.as_ref(), self.container);
        if let Some(active) = self.active.as_mut() {
            if active.config.autofocus_first {
                let target = trap.first().unwrap_or(self.container);
                if !self.focus.set_focus(target) {
                    trace!(target = target.id(), "autofocus skipped: target not attached");
                }
            }
            active.trap = trap;
        }
        self.set_phase(OverlayPhase::Open);
    }

    fn finish_closing(&mut self) {
        if let Some(active) = self.active.take() {
            let ActiveOverlay {
                prior_focus,
                _scroll: lock,
                ..
            } = active;
            drop(lock);
            match prior_focus {
                Some(target) if self.focus.is_attached(target) => {
                    self.focus.set_focus(target);
                }
                Some(target) => {
                    debug!(target = target.id(), "restore skipped: prior focus detached");
                }
                None => {}
            }
        }
        self.set_phase(OverlayPhase::Closed);
    }

    fn cycle_focus(&self, reverse: bool) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if active.trap.is_empty() {
            // Nothing to trap between; focus stays on the container.
            return;
        }
        let next = match self.focus.current_focus() {
            Some(current) => {
                if reverse {
                    active.trap.prev(current)
                } else {
                    active.trap.next(current)
                }
            }
            None => active.trap.first(),
        };
        if let Some(target) = next {
            self.focus.set_focus(target);
        }
    }

    fn set_phase(&mut self, to: OverlayPhase) {
        let from = std::mem::replace(&mut self.phase, to);
        if from == to {
            return;
        }
        debug_assert_eq!(self.active.is_some(), to.is_active());
        trace!(?from, ?to, "phase change");
        self.signal.emit(PhaseChange { from, to });
    }
}

impl std::fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("container", &self.container)
            .field("phase", &self.phase)
            .field("config", &self.active_config())
            .finish()
    }
}

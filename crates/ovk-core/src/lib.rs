#![forbid(unsafe_code)]

//! Host capabilities and input events for OverlayKit.
//!
//! This crate defines the seam between an overlay lifecycle controller and
//! the document that hosts it:
//!
//! - [`event`]: discrete key and pointer events delivered by the host.
//! - [`focus`]: the [`FocusHost`](focus::FocusHost) capability (current
//!   focus, focus moves, focusable-descendant queries).
//! - [`scroll_lock`]: the [`ScrollLockHost`](scroll_lock::ScrollLockHost)
//!   capability plus the reference-counted
//!   [`ScrollLockCoordinator`](scroll_lock::ScrollLockCoordinator) shared by
//!   overlapping overlays.
//! - `headless` (feature `test-helpers`): an in-memory document
//!   implementing both capabilities.
//!
//! Everything here is single-threaded: hosts are shared via `Rc`, capability
//! methods take `&self`, and implementations use interior mutability. No type
//! in this crate is `Send` or `Sync` by contract.

pub mod event;
pub mod focus;
pub mod scroll_lock;

#[cfg(any(test, feature = "test-helpers"))]
pub mod headless;

pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerButton, PointerEvent, PointerRegion,
};
pub use focus::{FocusHost, FocusTarget};
pub use scroll_lock::{ScrollLockCoordinator, ScrollLockGuard, ScrollLockHost};

#![forbid(unsafe_code)]

//! Overlay lifecycle management for OverlayKit.
//!
//! The centerpiece is [`LifecycleController`]: a four-phase state machine
//! (`Closed → Opening → Open → Closing`) that owns, for one modal-like
//! overlay, prior-focus capture and restoration, the Tab focus trap, the
//! reference-counted background scroll lock, and escape/backdrop dismissal.
//! It is headless: the host document is reached only through the
//! capability traits in [`ovk_core`], and the rendering surface mounts and
//! unmounts markup by subscribing to phase changes.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use ovk_core::event::{Event, KeyCode};
//! use ovk_core::focus::FocusHost;
//! use ovk_core::headless::HeadlessDocument;
//! use ovk_core::scroll_lock::ScrollLockCoordinator;
//! use ovk_overlay::{LifecycleController, OverlayConfig, OverlayPhase};
//!
//! let doc = Rc::new(HeadlessDocument::new());
//! let trigger = doc.attach_focusable(None);
//! let container = doc.attach_container(None);
//! let field = doc.attach_focusable(Some(container));
//! doc.set_focus(trigger);
//!
//! let coordinator = ScrollLockCoordinator::new(doc.clone());
//! let mut overlay = LifecycleController::new(container, doc.clone(), coordinator);
//!
//! overlay.open(OverlayConfig::default());
//! assert_eq!(overlay.phase(), OverlayPhase::Open);
//! assert!(doc.scroll_locked());
//! assert_eq!(doc.current_focus(), Some(field));
//!
//! overlay.handle_event(&Event::key_press(KeyCode::Escape));
//! assert_eq!(overlay.phase(), OverlayPhase::Closed);
//! assert!(!doc.scroll_locked());
//! assert_eq!(doc.current_focus(), Some(trigger));
//! ```

pub mod config;
pub mod lifecycle;
pub mod signal;
pub mod trap;

pub use config::OverlayConfig;
pub use lifecycle::{DismissAction, LifecycleController, OverlayPhase, PhaseChange};
pub use signal::PhaseSubscription;
pub use trap::FocusTrap;

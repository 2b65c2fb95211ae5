#![forbid(unsafe_code)]

//! Overlay configuration.
//!
//! The configuration is an explicit, enumerated structure; there is no
//! pass-through attribute bag. A controller snapshots the config at open
//! time; mutating a config value after `open()` has no effect on the active
//! overlay.

/// Dismissability and focus behavior for one open cycle.
///
/// Defaults match the common dismissable dialog: escape closes, clicking the
/// backdrop closes, and the first focusable descendant is focused on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct OverlayConfig {
    /// Close when a left click lands on the backdrop.
    pub close_on_backdrop: bool,
    /// Close when Escape is pressed.
    pub close_on_escape: bool,
    /// Focus the first focusable descendant on reaching Open (falling back
    /// to the container itself when there is none).
    pub autofocus_first: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            close_on_backdrop: true,
            close_on_escape: true,
            autofocus_first: true,
        }
    }
}

impl OverlayConfig {
    /// The default dismissable configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// A blocking overlay: no user-initiated dismissal.
    ///
    /// The caller must keep a programmatic `close()` path reachable: with
    /// both dismiss channels disabled nothing else can close the overlay.
    /// The controller does not validate this.
    pub fn blocking() -> Self {
        Self {
            close_on_backdrop: false,
            close_on_escape: false,
            autofocus_first: true,
        }
    }

    /// Set close-on-backdrop behavior.
    pub fn close_on_backdrop(mut self, close: bool) -> Self {
        self.close_on_backdrop = close;
        self
    }

    /// Set close-on-escape behavior.
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = close;
        self
    }

    /// Set whether the first focusable descendant is focused on open.
    pub fn autofocus_first(mut self, autofocus: bool) -> Self {
        self.autofocus_first = autofocus;
        self
    }

    /// Whether any user-initiated dismiss channel is enabled.
    #[inline]
    pub const fn is_dismissable(&self) -> bool {
        self.close_on_backdrop || self.close_on_escape
    }
}

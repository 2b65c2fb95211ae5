#![forbid(unsafe_code)]

//! Input events delivered by the host while an overlay is active.
//!
//! The host owns event sources (key listeners, click listeners) and feeds
//! discrete events to the controller. Two details matter for overlays:
//!
//! - Only key *presses* drive navigation and dismissal; releases are carried
//!   for completeness but ignored by the controller.
//! - Pointer events are annotated with the [`PointerRegion`] they originated
//!   in. The host performs its own hit testing (it owns the markup and
//!   geometry) and reports only backdrop-vs-content here; coordinates stay on
//!   the host side.

use bitflags::bitflags;

/// Key codes relevant to overlay handling.
///
/// `Char` carries printable input so hosts can route a single event stream
/// through the controller without translating; the controller itself only
/// acts on `Escape` and `Tab`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Tab,
    Enter,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Char(char),
}

bitflags! {
    /// Keyboard modifier state at event time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
    }
}

/// Press/release discriminator for key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Press,
    Release,
}

/// A discrete keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a key event with explicit modifiers and kind.
    pub const fn new(code: KeyCode, modifiers: Modifiers, kind: KeyEventKind) -> Self {
        Self {
            code,
            modifiers,
            kind,
        }
    }

    /// A plain press of `code` with no modifiers.
    pub const fn press(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty(), KeyEventKind::Press)
    }

    /// Whether this is a press event.
    #[inline]
    pub const fn is_press(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press)
    }
}

/// Pointer button for click events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Where a pointer event originated, as hit-tested by the host.
///
/// `Backdrop` is the dimmed area around the overlay content; `Content` is the
/// overlay surface itself. A click that starts on content and bubbles up must
/// still be reported as `Content`; misreporting it as `Backdrop` makes
/// close-on-backdrop fire on clicks inside the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerRegion {
    Backdrop,
    Content,
}

/// A discrete pointer (click) event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerEvent {
    pub button: PointerButton,
    pub region: PointerRegion,
}

impl PointerEvent {
    /// Create a pointer event.
    pub const fn new(button: PointerButton, region: PointerRegion) -> Self {
        Self { button, region }
    }

    /// A left click in `region`.
    pub const fn left_click(region: PointerRegion) -> Self {
        Self::new(PointerButton::Left, region)
    }
}

/// An input event delivered to an overlay controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Key(KeyEvent),
    Pointer(PointerEvent),
}

impl Event {
    /// A plain key press of `code`.
    pub const fn key_press(code: KeyCode) -> Self {
        Self::Key(KeyEvent::press(code))
    }

    /// A left click hit-tested to the backdrop.
    pub const fn backdrop_click() -> Self {
        Self::Pointer(PointerEvent::left_click(PointerRegion::Backdrop))
    }

    /// A left click hit-tested to the overlay content.
    pub const fn content_click() -> Self {
        Self::Pointer(PointerEvent::left_click(PointerRegion::Content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_constructor_has_no_modifiers() {
        let event = KeyEvent::press(KeyCode::Escape);
        assert_eq!(event.modifiers, Modifiers::empty());
        assert!(event.is_press());
    }

    #[test]
    fn release_is_not_press() {
        let event = KeyEvent::new(KeyCode::Tab, Modifiers::empty(), KeyEventKind::Release);
        assert!(!event.is_press());
    }

    #[test]
    fn modifier_flags_combine() {
        let mods = Modifiers::SHIFT | Modifiers::CONTROL;
        assert!(mods.contains(Modifiers::SHIFT));
        assert!(mods.contains(Modifiers::CONTROL));
        assert!(!mods.contains(Modifiers::ALT));
    }

    #[test]
    fn click_helpers_carry_region() {
        assert_eq!(
            Event::backdrop_click(),
            Event::Pointer(PointerEvent::new(
                PointerButton::Left,
                PointerRegion::Backdrop
            ))
        );
        assert_eq!(
            Event::content_click(),
            Event::Pointer(PointerEvent::new(
                PointerButton::Left,
                PointerRegion::Content
            ))
        );
    }
}

use std::fmt;
use std::time::Duration;

use crate::coords::{Vec2, Viewport};

/// Keyboard key identifier.
///
/// Only the keys the runtime scripts and demos bind are represented; anything
/// else maps to `Key::Unknown` with a stable platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Tab,
    Backspace,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    /// Platform-dependent key not represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Lifecycle of a single touch point.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

/// One touch sample in window coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub position: Vec2,
    /// Host timestamp of the sample.
    pub timestamp: Duration,
}

impl TouchEvent {
    #[inline]
    pub const fn new(phase: TouchPhase, position: Vec2, timestamp: Duration) -> Self {
        Self { phase, position, timestamp }
    }
}

/// Platform-agnostic input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Touch(TouchEvent),

    Key { key: Key, state: KeyState },

    /// Window size change (rotation, split view, resize).
    Resized(Viewport),

    /// Window focus change.
    Focused(bool),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

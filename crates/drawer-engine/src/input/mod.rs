//! Input subsystem.
//!
//! Public API is platform-agnostic. Hosts translate their native events into
//! `InputEvent`s; `InputState` keeps the held state and feeds touch streams
//! through a `PanTracker`, which recognizes pans and taps.

mod frame;
mod state;
mod tracker;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use tracker::{PanPhase, PanSample, PanTracker, TrackedGesture};
pub use types::{InputEvent, Key, KeyState, TouchEvent, TouchPhase};

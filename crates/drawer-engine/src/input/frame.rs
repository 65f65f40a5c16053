use std::collections::HashSet;

use super::tracker::TrackedGesture;
use super::types::{InputEvent, Key};

/// Per-frame input deltas.
///
/// `InputState` holds the current state; `InputFrame` holds what happened
/// since the previous frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,

    /// Keys pressed this frame.
    pub keys_pressed: HashSet<Key>,

    /// Pan samples and taps recognized this frame, in order.
    pub gestures: Vec<TrackedGesture>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.gestures.clear();
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }
}

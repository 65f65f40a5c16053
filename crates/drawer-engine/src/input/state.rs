use std::collections::HashSet;

use crate::coords::{Vec2, Viewport};

use super::frame::InputFrame;
use super::tracker::PanTracker;
use super::types::{InputEvent, Key, KeyState, TouchPhase};

/// Current input state for a single window.
///
/// Holds "is down" information and the live touch; per-frame transitions and
/// recognized gestures are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current window size.
    pub viewport: Viewport,

    /// Whether the window is focused.
    pub focused: bool,

    /// Position of the active touch, if a finger is down.
    pub touch: Option<Vec2>,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,

    tracker: PanTracker,
}

impl InputState {
    pub fn new(viewport: Viewport, slop: f32) -> Self {
        Self {
            viewport,
            focused: true,
            touch: None,
            keys_down: HashSet::new(),
            tracker: PanTracker::new(slop),
        }
    }

    /// Applies an input event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Focus loss mid-press would otherwise leave keys stuck.
                    self.keys_down.clear();
                }
            }

            InputEvent::Resized(vp) => {
                self.viewport = *vp;
            }

            InputEvent::Key { key, state } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(*key) {
                        frame.keys_pressed.insert(*key);
                    }
                }
                KeyState::Released => {
                    self.keys_down.remove(key);
                }
            },

            InputEvent::Touch(t) => {
                self.touch = match t.phase {
                    TouchPhase::Began | TouchPhase::Moved => Some(t.position),
                    TouchPhase::Ended | TouchPhase::Cancelled => None,
                };
                if let Some(g) = self.tracker.handle(t) {
                    frame.gestures.push(g);
                }
            }
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

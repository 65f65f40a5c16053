use std::time::Duration;

use crate::coords::{Vec2, Viewport};
use crate::input::{InputEvent, Key, KeyState, TouchEvent, TouchPhase};

/// Input events keyed by the time they should be delivered.
///
/// Builder methods take the delivery time in milliseconds since start and
/// can be chained in any order; events are sorted on consumption.
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    events: Vec<(Duration, InputEvent)>,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(mut self, at_ms: u64, ev: InputEvent) -> Self {
        self.events.push((Duration::from_millis(at_ms), ev));
        self
    }

    /// Press and release of `key`.
    pub fn key(self, at_ms: u64, key: Key) -> Self {
        self.event(at_ms, InputEvent::Key { key, state: KeyState::Pressed })
            .event(at_ms + 1, InputEvent::Key { key, state: KeyState::Released })
    }

    pub fn resize(self, at_ms: u64, viewport: Viewport) -> Self {
        self.event(at_ms, InputEvent::Resized(viewport))
    }

    pub fn tap(self, at_ms: u64, at: Vec2) -> Self {
        self.touch(at_ms, TouchPhase::Began, at)
            .touch(at_ms + 40, TouchPhase::Ended, at)
    }

    /// Straight-line drag from `from` to `to` over `duration_ms`, sampled every 16 ms.
    pub fn drag(mut self, at_ms: u64, from: Vec2, to: Vec2, duration_ms: u64) -> Self {
        self = self.touch(at_ms, TouchPhase::Began, from);
        let steps = (duration_ms / 16).max(1);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self = self.touch(at_ms + i * 16, TouchPhase::Moved, from.lerp(to, t));
        }
        self.touch(at_ms + steps * 16 + 1, TouchPhase::Ended, to)
    }

    fn touch(self, at_ms: u64, phase: TouchPhase, at: Vec2) -> Self {
        let ts = Duration::from_millis(at_ms);
        self.event(at_ms, InputEvent::Touch(TouchEvent::new(phase, at, ts)))
    }

    /// Time of the last scripted event.
    pub fn end(&self) -> Duration {
        self.events.iter().map(|(t, _)| *t).max().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn into_sorted(mut self) -> Vec<(Duration, InputEvent)> {
        self.events.sort_by_key(|(t, _)| *t);
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_emits_began_moves_and_end() {
        let script = InputScript::new().drag(100, Vec2::new(0.0, 0.0), Vec2::new(0.0, 64.0), 64);
        let events = script.into_sorted();
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0].1, InputEvent::Touch(TouchEvent { phase: TouchPhase::Began, .. })));
        assert!(matches!(events[5].1, InputEvent::Touch(TouchEvent { phase: TouchPhase::Ended, .. })));
    }

    #[test]
    fn events_sorted_by_time() {
        let script = InputScript::new().key(500, Key::Escape).key(10, Key::Enter);
        assert_eq!(script.end(), Duration::from_millis(501));
        let events = script.into_sorted();
        assert_eq!(events[0].1, InputEvent::Key { key: Key::Enter, state: KeyState::Pressed });
    }
}

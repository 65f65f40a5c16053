use std::time::Duration;

use crate::coords::Vec2;

use super::types::{TouchEvent, TouchPhase};

/// Phase of a recognized pan.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PanPhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// One pan update, in window coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PanSample {
    pub phase: PanPhase,
    /// Where the touch went down.
    pub start: Vec2,
    pub location: Vec2,
    /// `location - start`.
    pub translation: Vec2,
    /// Points per second.
    pub velocity: Vec2,
    pub timestamp: Duration,
}

/// Output of the tracker.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TrackedGesture {
    Pan(PanSample),
    /// Touch released without ever leaving the slop radius.
    Tap(Vec2),
}

/// Velocity is considered stale when the finger rested this long before lifting.
const VELOCITY_STALE: Duration = Duration::from_millis(100);

/// Weight of the newest instantaneous velocity in the running estimate.
const VELOCITY_BLEND: f32 = 0.7;

/// Turns a single touch stream into pan samples and taps.
///
/// A pan begins once the touch moves farther than `slop` from where it went
/// down; the Began sample already carries that movement.
#[derive(Debug, Clone)]
pub struct PanTracker {
    slop: f32,
    start: Option<Vec2>,
    last: Vec2,
    last_time: Duration,
    velocity: Vec2,
    panning: bool,
}

impl PanTracker {
    pub fn new(slop: f32) -> Self {
        Self {
            slop,
            start: None,
            last: Vec2::zero(),
            last_time: Duration::ZERO,
            velocity: Vec2::zero(),
            panning: false,
        }
    }

    #[inline]
    pub fn is_panning(&self) -> bool {
        self.panning
    }

    pub fn handle(&mut self, ev: &TouchEvent) -> Option<TrackedGesture> {
        match ev.phase {
            TouchPhase::Began => {
                self.start = Some(ev.position);
                self.last = ev.position;
                self.last_time = ev.timestamp;
                self.velocity = Vec2::zero();
                self.panning = false;
                None
            }
            TouchPhase::Moved => {
                let start = self.start?;
                self.track_velocity(ev);
                if !self.panning {
                    if (ev.position - start).length() <= self.slop {
                        return None;
                    }
                    self.panning = true;
                    return Some(self.sample(PanPhase::Began, start, ev));
                }
                Some(self.sample(PanPhase::Changed, start, ev))
            }
            TouchPhase::Ended => {
                let start = self.start.take()?;
                if !self.panning {
                    return Some(TrackedGesture::Tap(ev.position));
                }
                if ev.timestamp.saturating_sub(self.last_time) > VELOCITY_STALE {
                    self.velocity = Vec2::zero();
                } else {
                    self.track_velocity(ev);
                }
                self.panning = false;
                Some(self.sample(PanPhase::Ended, start, ev))
            }
            TouchPhase::Cancelled => {
                let start = self.start.take()?;
                let was_panning = std::mem::replace(&mut self.panning, false);
                was_panning.then(|| self.sample(PanPhase::Cancelled, start, ev))
            }
        }
    }

    fn track_velocity(&mut self, ev: &TouchEvent) {
        let dt = ev.timestamp.saturating_sub(self.last_time).as_secs_f32();
        if dt > 0.0 {
            let instant = (ev.position - self.last) / dt;
            self.velocity = if self.velocity == Vec2::zero() {
                instant
            } else {
                instant * VELOCITY_BLEND + self.velocity * (1.0 - VELOCITY_BLEND)
            };
        }
        self.last = ev.position;
        self.last_time = ev.timestamp;
    }

    fn sample(&self, phase: PanPhase, start: Vec2, ev: &TouchEvent) -> TrackedGesture {
        TrackedGesture::Pan(PanSample {
            phase,
            start,
            location: ev.position,
            translation: ev.position - start,
            velocity: self.velocity,
            timestamp: ev.timestamp,
        })
    }
}

impl Default for PanTracker {
    fn default() -> Self {
        Self::new(8.0)
    }
}

use std::cell::Cell;

use drawer_engine::coords::Rect;

use crate::screen::NestedScrollable;

/// Resistance applied to drags past either end while bouncing.
const RUBBER_BAND: f32 = 0.33;

/// Scroll state of a nested scrollable, shared between the host screen and
/// the gesture arbitrator.
///
/// Interior mutability lets the arbitrator pin the offset or toggle bouncing
/// through the shared `Rc<dyn NestedScrollable>` handle while the screen
/// keeps scrolling it natively.
#[derive(Debug)]
pub struct ScrollState {
    frame: Cell<Rect>,
    content_height: Cell<f32>,
    /// Resting inset; the at-rest offset is `-top_inset`.
    top_inset: f32,
    offset: Cell<f32>,
    bounces: Cell<bool>,
    enabled: Cell<bool>,
}

impl ScrollState {
    pub fn new(frame: Rect, content_height: f32) -> Self {
        Self {
            frame: Cell::new(frame),
            content_height: Cell::new(content_height),
            top_inset: 0.0,
            offset: Cell::new(0.0),
            bounces: Cell::new(true),
            enabled: Cell::new(true),
        }
    }

    /// Sets the resting inset and moves the offset to rest.
    pub fn top_inset(mut self, inset: f32) -> Self {
        self.top_inset = inset.max(0.0);
        self.offset.set(-self.top_inset);
        self
    }

    #[inline]
    pub fn min_offset(&self) -> f32 {
        -self.top_inset
    }

    pub fn max_offset(&self) -> f32 {
        let visible = self.frame.get().height() - self.top_inset;
        (self.content_height.get() - visible).max(0.0) + self.min_offset()
    }

    pub fn set_frame(&self, frame: Rect) {
        self.frame.set(frame);
    }

    pub fn set_content_height(&self, h: f32) {
        self.content_height.set(h.max(0.0));
    }

    /// Native scroll for a finger moving by `dy` (positive = downwards).
    ///
    /// Returns `false` when scrolling is disabled. Past either end the drag
    /// rubber-bands when bouncing is on and is clamped otherwise.
    pub fn drag_by(&self, dy: f32) -> bool {
        if !self.enabled.get() {
            return false;
        }
        let (min, max) = (self.min_offset(), self.max_offset());
        let mut next = self.offset.get() - dy;
        if next < min || next > max {
            if self.bounces.get() {
                let cur = self.offset.get();
                next = cur - dy * RUBBER_BAND;
            } else {
                next = next.clamp(min, max);
            }
        }
        self.offset.set(next);
        true
    }

    /// Snaps an overscrolled offset back into range.
    pub fn settle(&self) {
        let clamped = self.offset.get().clamp(self.min_offset(), self.max_offset());
        self.offset.set(clamped);
    }
}

impl NestedScrollable for ScrollState {
    fn frame(&self) -> Rect {
        self.frame.get()
    }

    fn content_offset(&self) -> f32 {
        self.offset.get()
    }

    fn set_content_offset(&self, offset: f32) {
        self.offset.set(offset);
    }

    fn bounces(&self) -> bool {
        self.bounces.get()
    }

    fn set_bounces(&self, bounces: bool) {
        self.bounces.set(bounces);
    }

    fn is_scroll_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_scroll_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }
}

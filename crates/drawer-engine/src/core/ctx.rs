use crate::coords::Viewport;
use crate::input::{InputFrame, InputState};
use crate::time::FrameTime;

/// Per-frame context passed to `core::App::on_frame`.
pub struct FrameCtx<'a> {
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
}

impl FrameCtx<'_> {
    /// Current window size.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.input.viewport
    }
}

//! Coordinate and geometry types shared by the view tree and the presentation layer.
//!
//! Canonical space:
//! - Logical points (DPI-independent)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Frames are expressed in the coordinate space of the parent view.

mod color;
mod rect;
mod vec2;
mod viewport;

pub use color::ColorRgba;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;

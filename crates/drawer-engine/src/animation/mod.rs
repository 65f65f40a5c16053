//! View property animation.
//!
//! - `Curve` maps linear progress to eased progress
//! - `ViewProps` is a masked set of animatable properties
//! - `PropertyAnimation` interpolates one view between two `ViewProps`
//! - `Animator` runs free-standing timed animations against a `ViewTree`
//!
//! Transitions that are scrubbed by a gesture drive `PropertyAnimation`s
//! directly with their own fraction instead of going through `Animator`.

mod animator;
mod curve;
mod props;

pub use animator::Animator;
pub use curve::Curve;
pub use props::{PropertyAnimation, ViewProps};

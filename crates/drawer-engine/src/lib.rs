//! Drawer engine crate.
//!
//! Platform-agnostic primitives the presentation layer is built on: geometry,
//! transforms, a retained view tree with snapshot proxies, property
//! animation, touch input, timing, logging and a headless runtime loop.

pub mod animation;
pub mod coords;
pub mod core;
pub mod input;
pub mod logging;
pub mod runtime;
pub mod time;
pub mod transform;
pub mod view;

//! Core engine-facing contracts.
//!
//! Defines the interface between a runtime loop and higher layers (studio,
//! presentation, tools), and the per-frame context handed to the app.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;

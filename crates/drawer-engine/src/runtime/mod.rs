//! Headless runtime loop.
//!
//! Replays a timed input script against an [`App`](crate::core::App) at a
//! fixed frame interval. Used by the studio binary and by scenario tests;
//! a windowed host would drive the same `App` contract from its event loop.

mod headless;
mod script;

pub use headless::{RunSummary, Runtime, RuntimeConfig};
pub use script::InputScript;

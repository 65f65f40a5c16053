//! Time subsystem.
//!
//! Timing is driven by explicit timestamps so the whole presentation stack
//! is deterministic under test and in the headless runtime.
//! - `FrameClock` turns timestamps into clamped `FrameTime` snapshots
//! - `DelayQueue` holds deferred payloads guarded by `CancelToken`s

mod delay;
mod frame_clock;

pub use delay::{CancelToken, DelayQueue};
pub use frame_clock::{FrameClock, FrameTime};

use std::time::Duration;

use anyhow::{bail, Result};

use crate::coords::Viewport;
use crate::core::{App, AppControl, FrameCtx};
use crate::input::{InputFrame, InputState};
use crate::time::FrameClock;

use super::script::InputScript;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub viewport: Viewport,
    /// Fixed simulated frame interval.
    pub frame_interval: Duration,
    /// Hard stop for the simulated clock.
    pub max_duration: Duration,
    /// Touch slop handed to the pan tracker.
    pub touch_slop: f32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "drawer".to_string(),
            viewport: Viewport::new(390.0, 844.0),
            frame_interval: Duration::from_micros(16_667),
            max_duration: Duration::from_secs(60),
            touch_slop: 8.0,
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed: Duration,
    pub events: usize,
    /// `true` when the app asked to exit before the clock ran out.
    pub exited_by_app: bool,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    pub fn run<A: App>(config: RuntimeConfig, script: InputScript, app: &mut A) -> Result<RunSummary> {
        if config.frame_interval.is_zero() {
            bail!("frame interval must be non-zero");
        }
        if !config.viewport.is_valid() {
            bail!("invalid viewport {:?}", config.viewport);
        }

        log::info!(
            "{}: running {} scripted events at {:?}/frame",
            config.title,
            script.len(),
            config.frame_interval
        );

        let events = script.into_sorted();
        let mut pending = events.into_iter().peekable();
        let mut input = InputState::new(config.viewport, config.touch_slop);
        let mut frame = InputFrame::default();
        let mut clock = FrameClock::with_clamps(Duration::ZERO, config.frame_interval * 4);

        let mut now = Duration::ZERO;
        let mut summary = RunSummary {
            frames: 0,
            elapsed: Duration::ZERO,
            events: 0,
            exited_by_app: false,
        };

        'run: while now <= config.max_duration {
            while let Some((_, ev)) = pending.next_if(|(at, _)| *at <= now) {
                summary.events += 1;
                if app.on_input(&ev) == AppControl::Exit {
                    summary.exited_by_app = true;
                    break 'run;
                }
                input.apply_event(&mut frame, ev);
            }

            let time = clock.tick(now);
            let mut ctx = FrameCtx {
                input: &input,
                input_frame: &frame,
                time,
            };
            let control = app.on_frame(&mut ctx);
            summary.frames += 1;
            frame.clear();

            if control == AppControl::Exit {
                summary.exited_by_app = true;
                break;
            }
            now += config.frame_interval;
        }

        summary.elapsed = now;
        log::info!("{}: finished after {} frames ({:?})", config.title, summary.frames, now);
        Ok(summary)
    }
}

use std::time::Duration;

use crate::time::CancelToken;
use crate::view::{ViewId, ViewTree};

use super::curve::Curve;
use super::props::PropertyAnimation;

struct Running {
    anim: PropertyAnimation,
    delay: Duration,
    duration: Duration,
    elapsed: Duration,
    curve: Curve,
    token: Option<CancelToken>,
}

/// Runs timed property animations against a [`ViewTree`].
///
/// Animations start from the state captured when they were created; a new
/// animation on the same view does not interrupt an older one unless the
/// caller stops it with [`Animator::stop_view`].
#[derive(Default)]
pub struct Animator {
    running: Vec<Running>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, anim: PropertyAnimation, duration: Duration, curve: Curve) {
        self.start_with(anim, Duration::ZERO, duration, curve, None);
    }

    /// Starts an animation after `delay`, dropped without further effect if
    /// `token` is cancelled before it finishes.
    pub fn start_with(
        &mut self,
        anim: PropertyAnimation,
        delay: Duration,
        duration: Duration,
        curve: Curve,
        token: Option<CancelToken>,
    ) {
        self.running.push(Running {
            anim,
            delay,
            duration,
            elapsed: Duration::ZERO,
            curve,
            token,
        });
    }

    /// Stops every animation targeting `view`, leaving it where it is.
    pub fn stop_view(&mut self, view: ViewId) {
        self.running.retain(|r| r.anim.view != view);
    }

    pub fn is_animating(&self, view: ViewId) -> bool {
        self.running.iter().any(|r| r.anim.view == view)
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    /// Advances all animations by `dt` and writes their state into `views`.
    pub fn tick(&mut self, views: &mut ViewTree, dt: Duration) {
        self.running.retain_mut(|r| {
            if r.token.as_ref().is_some_and(CancelToken::is_cancelled) {
                return false;
            }
            r.elapsed += dt;
            if r.elapsed < r.delay {
                return true;
            }
            let active = r.elapsed - r.delay;
            let t = if r.duration.is_zero() {
                1.0
            } else {
                (active.as_secs_f32() / r.duration.as_secs_f32()).min(1.0)
            };
            let alive = r.anim.apply(views, r.curve.ease(t));
            alive && t < 1.0
        });
    }
}

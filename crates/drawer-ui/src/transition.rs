//! Transition context: the object a running presentation or dismissal is
//! sampled through.
//!
//! A context owns the property animations registered for one transition and
//! a single fraction that drives all of them. It is either scrubbed directly
//! (interactive) or plays towards one end on its own clock.

use std::time::Duration;

use drawer_engine::animation::{Curve, PropertyAnimation};
use drawer_engine::view::ViewTree;

use crate::registry::NodeId;

/// Smallest speed a finishing or cancelling context will play at.
const MIN_SPEED: f32 = 0.01;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TransitionKind {
    Presentation,
    Dismissal,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Drive {
    /// Held where the last update put it.
    Interactive,
    Playing { forward: bool, speed: f32 },
}

#[derive(Debug)]
pub struct TransitionContext {
    node: NodeId,
    kind: TransitionKind,
    animated: bool,
    interactive: bool,
    duration: Duration,
    curve: Curve,
    fraction: f32,
    drive: Drive,
    cancelled: bool,
    animations: Vec<PropertyAnimation>,
    done: bool,
}

impl TransitionContext {
    pub fn new(node: NodeId, kind: TransitionKind, animated: bool, interactive: bool, duration: Duration) -> Self {
        let drive = if interactive {
            Drive::Interactive
        } else {
            Drive::Playing { forward: true, speed: 1.0 }
        };
        Self {
            node,
            kind,
            animated,
            interactive,
            duration: if animated { duration } else { Duration::ZERO },
            curve: Curve::Linear,
            fraction: 0.0,
            drive,
            cancelled: false,
            animations: Vec::new(),
            done: false,
        }
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[inline]
    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    #[inline]
    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// Whether a gesture is still scrubbing this context.
    #[inline]
    pub fn is_interactive(&self) -> bool {
        self.interactive && self.drive == Drive::Interactive
    }

    /// Started under a gesture, even if it has since been released.
    #[inline]
    pub fn began_interactively(&self) -> bool {
        self.interactive
    }

    #[inline]
    pub fn transition_duration(&self) -> Duration {
        self.duration
    }

    #[inline]
    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }

    #[inline]
    pub fn transition_was_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn set_curve(&mut self, curve: Curve) {
        self.curve = curve;
    }

    /// Registers an animation sampled together with the transition.
    pub fn animate_alongside(&mut self, anim: PropertyAnimation) {
        self.animations.push(anim);
    }

    pub fn animate_alongside_all(&mut self, anims: impl IntoIterator<Item = PropertyAnimation>) {
        self.animations.extend(anims);
    }

    /// Scrubs an interactive context to `percent`.
    pub fn update(&mut self, views: &mut ViewTree, percent: f32) {
        if !self.is_interactive() || self.done {
            return;
        }
        self.fraction = percent.clamp(0.0, 1.0);
        self.apply(views);
    }

    /// Plays the remainder forwards at `speed`.
    pub fn finish(&mut self, speed: f32) {
        self.cancelled = false;
        self.drive = Drive::Playing { forward: true, speed: speed.max(MIN_SPEED) };
    }

    /// Plays back towards the start at `speed`; completion will report cancelled.
    pub fn cancel(&mut self, speed: f32) {
        self.cancelled = true;
        self.drive = Drive::Playing { forward: false, speed: speed.max(MIN_SPEED) };
    }

    /// Advances a playing context.
    ///
    /// Returns `Some(completed)` exactly once, on the tick that reaches the
    /// end; `completed` is `false` when the transition was cancelled.
    pub fn tick(&mut self, views: &mut ViewTree, dt: Duration) -> Option<bool> {
        if self.done {
            return None;
        }
        let Drive::Playing { forward, speed } = self.drive else {
            return None;
        };
        let target = if forward { 1.0 } else { 0.0 };
        if self.duration.is_zero() {
            self.fraction = target;
        } else {
            let step = dt.as_secs_f32() / self.duration.as_secs_f32() * speed;
            self.fraction = if forward {
                (self.fraction + step).min(1.0)
            } else {
                (self.fraction - step).max(0.0)
            };
        }
        self.apply(views);
        if self.fraction != target {
            return None;
        }
        self.done = true;
        Some(!self.cancelled)
    }

    fn apply(&self, views: &mut ViewTree) {
        let t = self.curve.ease(self.fraction);
        for anim in &self.animations {
            anim.apply(views, t);
        }
    }
}

#[cfg(test)]
mod tests {
    use drawer_engine::animation::ViewProps;
    use drawer_engine::coords::Rect;

    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn node() -> NodeId {
        NodeId::new(0, 0)
    }

    fn faded(views: &mut ViewTree) -> (drawer_engine::view::ViewId, PropertyAnimation) {
        let v = views.create(Rect::new(0.0, 0.0, 10.0, 10.0));
        views.set_alpha(v, 0.0);
        let anim = PropertyAnimation::capture(views, v, ViewProps::new().alpha(1.0)).unwrap();
        (v, anim)
    }

    #[test]
    fn plays_forward_and_completes_once() {
        let mut views = ViewTree::new();
        let (v, anim) = faded(&mut views);
        let mut ctx = TransitionContext::new(node(), TransitionKind::Presentation, true, false, ms(400));
        ctx.animate_alongside(anim);

        assert_eq!(ctx.tick(&mut views, ms(200)), None);
        assert!((views.alpha(v).unwrap() - 0.5).abs() < 1e-4);
        assert_eq!(ctx.tick(&mut views, ms(250)), Some(true));
        assert_eq!(views.alpha(v), Some(1.0));
        assert_eq!(ctx.tick(&mut views, ms(16)), None);
        assert!(ctx.is_done());
    }

    #[test]
    fn not_animated_completes_on_first_tick() {
        let mut views = ViewTree::new();
        let (v, anim) = faded(&mut views);
        let mut ctx = TransitionContext::new(node(), TransitionKind::Dismissal, false, false, ms(550));
        ctx.animate_alongside(anim);
        assert_eq!(ctx.transition_duration(), Duration::ZERO);
        assert_eq!(ctx.tick(&mut views, Duration::ZERO), Some(true));
        assert_eq!(views.alpha(v), Some(1.0));
    }

    #[test]
    fn interactive_holds_until_released() {
        let mut views = ViewTree::new();
        let (v, anim) = faded(&mut views);
        let mut ctx = TransitionContext::new(node(), TransitionKind::Dismissal, true, true, ms(450));
        ctx.animate_alongside(anim);

        ctx.update(&mut views, 0.3);
        assert!((views.alpha(v).unwrap() - 0.3).abs() < 1e-4);
        assert_eq!(ctx.tick(&mut views, ms(1000)), None);
        assert!(ctx.is_interactive());

        ctx.cancel(0.3);
        assert!(!ctx.is_interactive());
        ctx.update(&mut views, 0.9);
        assert!((views.alpha(v).unwrap() - 0.3).abs() < 1e-4);

        // 0.3 of the way back at speed 0.3 takes exactly one duration.
        assert_eq!(ctx.tick(&mut views, ms(200)), None);
        assert_eq!(ctx.tick(&mut views, ms(260)), Some(false));
        assert_eq!(views.alpha(v), Some(0.0));
        assert!(ctx.transition_was_cancelled());
    }

    #[test]
    fn finish_from_interactive_runs_to_end() {
        let mut views = ViewTree::new();
        let (_, anim) = faded(&mut views);
        let mut ctx = TransitionContext::new(node(), TransitionKind::Dismissal, true, true, ms(450));
        ctx.animate_alongside(anim);
        ctx.update(&mut views, 0.6);
        ctx.finish(0.4);
        assert_eq!(ctx.tick(&mut views, ms(440)), None);
        assert_eq!(ctx.tick(&mut views, ms(20)), Some(true));
        assert!(!ctx.transition_was_cancelled());
    }

    #[test]
    fn zero_speed_is_floored() {
        let mut views = ViewTree::new();
        let mut ctx = TransitionContext::new(node(), TransitionKind::Dismissal, true, true, ms(100));
        ctx.cancel(0.0);
        // Fraction already at the start.
        assert_eq!(ctx.tick(&mut views, ms(16)), Some(false));
    }
}

//! Slide-up / slide-down animation for the presented screen.
//!
//! Used for every transition; when a gesture drives the context the slide is
//! linear so the card tracks the finger, otherwise it runs on a critically
//! damped spring.

use std::time::Duration;

use drawer_engine::animation::{Curve, PropertyAnimation, ViewProps};
use drawer_engine::coords::Rect;
use drawer_engine::view::{ViewId, ViewTree};

use crate::transition::{TransitionContext, TransitionKind};

const PRESENTATION_DURATION: Duration = Duration::from_millis(450);
const DISMISSAL_DURATION: Duration = Duration::from_millis(550);

#[derive(Debug, Copy, Clone, Default)]
pub struct TransitionAnimator;

impl TransitionAnimator {
    pub fn new() -> Self {
        Self
    }

    /// Presentations and gesture-driven dismissals share the shorter duration.
    pub fn transition_duration(&self, kind: TransitionKind, interactive: bool) -> Duration {
        if kind == TransitionKind::Presentation || interactive {
            PRESENTATION_DURATION
        } else {
            DISMISSAL_DURATION
        }
    }

    /// Registers the slide of `presented` with `ctx`.
    ///
    /// For a presentation the view is first added on top of `container` and
    /// moved below the window's bottom edge; `final_frame` is where it
    /// rests once presented.
    pub fn animate_transition(
        &self,
        views: &mut ViewTree,
        ctx: &mut TransitionContext,
        container: ViewId,
        presented: ViewId,
        final_frame: Rect,
        window_height: f32,
    ) -> bool {
        let mut dismissed = final_frame;
        dismissed.origin.y = window_height;

        let (from, to) = match ctx.kind() {
            TransitionKind::Presentation => {
                if !views.add_child(container, presented) {
                    log::warn!("presented view {presented:?} could not be added to {container:?}");
                    return false;
                }
                (dismissed, final_frame)
            }
            TransitionKind::Dismissal => match views.frame(presented) {
                Some(current) => (current, dismissed),
                None => return false,
            },
        };
        views.set_frame(presented, from);

        ctx.set_curve(if ctx.began_interactively() {
            Curve::Linear
        } else {
            Curve::Spring { damping: 1.0 }
        });
        ctx.animate_alongside(PropertyAnimation::between(
            presented,
            ViewProps::new().frame(from),
            ViewProps::new().frame(to),
        ));
        true
    }

    /// Settles a finished context; returns whether the transition completed.
    ///
    /// A completed dismissal takes the presented view out of the hierarchy.
    pub fn complete(&self, views: &mut ViewTree, ctx: &TransitionContext, presented: ViewId) -> bool {
        let completed = !ctx.transition_was_cancelled();
        if ctx.kind() == TransitionKind::Dismissal && completed {
            views.remove_from_parent(presented);
        }
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NodeId;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn setup() -> (ViewTree, ViewId, ViewId) {
        let mut views = ViewTree::new();
        let container = views.create(Rect::new(0.0, 0.0, 390.0, 844.0));
        let presented = views.create(Rect::new(0.0, 0.0, 390.0, 800.0));
        (views, container, presented)
    }

    #[test]
    fn durations() {
        let a = TransitionAnimator::new();
        assert_eq!(a.transition_duration(TransitionKind::Presentation, false), ms(450));
        assert_eq!(a.transition_duration(TransitionKind::Dismissal, true), ms(450));
        assert_eq!(a.transition_duration(TransitionKind::Dismissal, false), ms(550));
    }

    #[test]
    fn presentation_slides_up_from_below() {
        let (mut views, container, presented) = setup();
        let a = TransitionAnimator::new();
        let final_frame = Rect::new(0.0, 64.0, 390.0, 818.0);
        let mut ctx = TransitionContext::new(NodeId::new(0, 0), TransitionKind::Presentation, true, false, ms(450));

        assert!(a.animate_transition(&mut views, &mut ctx, container, presented, final_frame, 844.0));
        assert_eq!(views.parent(presented), Some(container));
        assert_eq!(views.frame(presented).map(|f| f.origin.y), Some(844.0));

        let mut done = None;
        while done.is_none() {
            done = ctx.tick(&mut views, ms(16));
        }
        assert_eq!(done, Some(true));
        assert!(a.complete(&mut views, &ctx, presented));
        assert_eq!(views.frame(presented), Some(final_frame));
    }

    #[test]
    fn cancelled_dismissal_keeps_view() {
        let (mut views, container, presented) = setup();
        views.add_child(container, presented);
        let a = TransitionAnimator::new();
        let mut ctx = TransitionContext::new(NodeId::new(0, 0), TransitionKind::Dismissal, true, true, ms(450));
        let frame = views.frame(presented).unwrap();
        a.animate_transition(&mut views, &mut ctx, container, presented, frame, 844.0);

        ctx.update(&mut views, 0.2);
        ctx.cancel(0.2);
        while ctx.tick(&mut views, ms(16)).is_none() {}
        assert!(!a.complete(&mut views, &ctx, presented));
        assert_eq!(views.parent(presented), Some(container));
        assert_eq!(views.frame(presented), Some(frame));
    }

    #[test]
    fn completed_dismissal_removes_view() {
        let (mut views, container, presented) = setup();
        views.add_child(container, presented);
        let a = TransitionAnimator::new();
        let mut ctx = TransitionContext::new(NodeId::new(0, 0), TransitionKind::Dismissal, true, false, ms(550));
        let frame = views.frame(presented).unwrap();
        a.animate_transition(&mut views, &mut ctx, container, presented, frame, 844.0);
        while ctx.tick(&mut views, ms(16)).is_none() {}
        assert!(a.complete(&mut views, &ctx, presented));
        assert_eq!(views.parent(presented), None);
        assert_eq!(views.frame(presented).map(|f| f.origin.y), Some(844.0));
    }
}

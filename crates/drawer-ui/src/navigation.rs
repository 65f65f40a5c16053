//! Page stack embedded inside a presented screen.
//!
//! Pushes and pops cross-fade the two pages while sliding them by a fixed
//! offset: the outgoing page leaves over the first three fifths of the
//! transition, the incoming page arrives from 2.8/5 to the end. A pan that
//! starts on the left edge scrubs a pop.

use std::time::Duration;

use drawer_engine::animation::{Curve, PropertyAnimation, ViewProps};
use drawer_engine::coords::{Rect, Vec2};
use drawer_engine::input::{PanPhase, PanSample};
use drawer_engine::view::{ViewId, ViewTree};

use crate::interaction::InteractiveTransition;

const DURATION: Duration = Duration::from_millis(300);
const SLIDE: f32 = 40.0;
const OUTGOING: (f32, f32) = (0.0, 3.0 / 5.0);
const INCOMING: (f32, f32) = (2.8 / 5.0, 2.2 / 5.0);
/// Drag distance for a full pop when the host uses a compact bar.
const COMPACT_POP_DISTANCE: f32 = 200.0;
const POP_COMPLETE_FRACTION: f32 = 0.5;
const POP_FLICK_VELOCITY: f32 = 500.0;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NavDirection {
    Forward,
    Reverse,
}

impl NavDirection {
    fn sign(self) -> f32 {
        match self {
            NavDirection::Forward => 1.0,
            NavDirection::Reverse => -1.0,
        }
    }
}

/// A property animation confined to part of the transition.
#[derive(Debug, Clone)]
struct Keyframe {
    anim: PropertyAnimation,
    start: f32,
    span: f32,
}

impl Keyframe {
    fn apply(&self, views: &mut ViewTree, t: f32) {
        let local = ((t - self.start) / self.span).clamp(0.0, 1.0);
        self.anim.apply(views, Curve::EaseInOut.ease(local));
    }
}

#[derive(Debug)]
struct PageTransition {
    direction: NavDirection,
    from: ViewId,
    to: ViewId,
    keyframes: Vec<Keyframe>,
    fraction: f32,
    /// `None` while scrubbed by the edge pan.
    playing: Option<(bool, f32)>,
    cancelled: bool,
}

impl PageTransition {
    fn apply(&self, views: &mut ViewTree) {
        for k in &self.keyframes {
            k.apply(views, self.fraction);
        }
    }
}

/// Result of a page transition that just ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct NavOutcome {
    pub direction: NavDirection,
    pub completed: bool,
    /// Page on top once the transition settled.
    pub top: ViewId,
}

#[derive(Debug)]
pub struct NavigationStack {
    host: ViewId,
    pages: Vec<ViewId>,
    /// Pop progress is measured over a fixed distance instead of the width.
    compact: bool,
    edge_width: f32,
    transition: Option<PageTransition>,
    interaction: InteractiveTransition,
    should_complete: bool,
}

impl NavigationStack {
    /// Mounts `root` filling `host`.
    pub fn new(views: &mut ViewTree, host: ViewId, root: ViewId, compact: bool, edge_width: f32) -> Self {
        views.set_frame(root, Self::bounds(views, host));
        views.add_child(host, root);
        Self {
            host,
            pages: vec![root],
            compact,
            edge_width,
            transition: None,
            interaction: InteractiveTransition::new(f32::EPSILON),
            should_complete: false,
        }
    }

    fn bounds(views: &ViewTree, host: ViewId) -> Rect {
        views.frame(host).map(|f| Rect::from_size(f.size)).unwrap_or_default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn top(&self) -> Option<ViewId> {
        self.pages.last().copied()
    }

    pub fn pages(&self) -> &[ViewId] {
        &self.pages
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn interaction_in_progress(&self) -> bool {
        self.interaction.interaction_in_progress()
    }

    pub fn transition_duration(&self) -> Duration {
        DURATION
    }

    // ── push / pop ────────────────────────────────────────────────────────

    pub fn push(&mut self, views: &mut ViewTree, page: ViewId, animated: bool) -> bool {
        if self.transition.is_some() || self.pages.contains(&page) {
            log::debug!("push of {page:?} rejected");
            return false;
        }
        let Some(from) = self.top() else {
            return false;
        };
        views.set_frame(page, Self::bounds(views, self.host));
        views.add_child(self.host, page);
        self.pages.push(page);
        self.start(views, NavDirection::Forward, from, page, animated, false);
        true
    }

    /// Starts popping the top page; the page leaves the stack once the
    /// transition completes.
    pub fn pop(&mut self, views: &mut ViewTree, animated: bool) -> bool {
        self.begin_pop(views, animated, false)
    }

    fn begin_pop(&mut self, views: &mut ViewTree, animated: bool, interactive: bool) -> bool {
        if self.transition.is_some() || self.pages.len() < 2 {
            log::debug!("pop rejected ({} pages)", self.pages.len());
            return false;
        }
        let from = self.pages[self.pages.len() - 1];
        let to = self.pages[self.pages.len() - 2];
        // The revealed page goes back on top of the one leaving.
        views.remove_from_parent(to);
        views.add_child(self.host, to);
        self.start(views, NavDirection::Reverse, from, to, animated, interactive);
        true
    }

    fn start(&mut self, views: &mut ViewTree, direction: NavDirection, from: ViewId, to: ViewId, animated: bool, interactive: bool) {
        let bounds = Self::bounds(views, self.host);
        let offset = SLIDE * direction.sign();
        let from_frame = views.frame(from).unwrap_or(bounds);
        let to_rest = bounds;
        let to_start = to_rest.translated(Vec2::new(offset, 0.0));
        views.set_frame(to, to_start);
        views.set_alpha(to, 0.0);

        let keyframes = vec![
            Keyframe {
                anim: PropertyAnimation::between(
                    from,
                    ViewProps::new().frame(from_frame).alpha(1.0),
                    ViewProps::new().frame(from_frame.translated(Vec2::new(-offset, 0.0))).alpha(0.0),
                ),
                start: OUTGOING.0,
                span: OUTGOING.1,
            },
            Keyframe {
                anim: PropertyAnimation::between(
                    to,
                    ViewProps::new().frame(to_start).alpha(0.0),
                    ViewProps::new().frame(to_rest).alpha(1.0),
                ),
                start: INCOMING.0,
                span: INCOMING.1,
            },
        ];

        let playing = (!interactive).then_some((true, 1.0));
        self.transition = Some(PageTransition {
            direction,
            from,
            to,
            keyframes,
            fraction: 0.0,
            playing,
            cancelled: false,
        });
        log::debug!("{direction:?} page transition {from:?} -> {to:?} (interactive: {interactive})");
        if !animated {
            if let Some(mut t) = self.transition.take() {
                t.fraction = 1.0;
                t.apply(views);
                self.settle(views, t);
            }
        }
    }

    // ── interactive pop ───────────────────────────────────────────────────

    /// Feeds a pan sample; returns whether the pan is driving a pop.
    pub fn handle_edge_pan(&mut self, views: &mut ViewTree, sample: &PanSample) -> bool {
        match sample.phase {
            PanPhase::Began => {
                if sample.start.x > self.edge_width {
                    return false;
                }
                self.interaction.begin();
                if !self.begin_pop(views, true, true) {
                    self.interaction.cancel();
                    return false;
                }
                self.should_complete = false;
                true
            }
            PanPhase::Changed => {
                let progress = self.pop_progress(views, sample);
                let Some(percent) = self.interaction.update(progress) else {
                    return false;
                };
                self.should_complete = percent > POP_COMPLETE_FRACTION
                    || (sample.translation.x > 0.0 && sample.velocity.x > POP_FLICK_VELOCITY);
                match self.transition.as_mut().filter(|t| t.playing.is_none()) {
                    Some(t) => {
                        t.fraction = percent;
                        t.apply(views);
                        true
                    }
                    None => false,
                }
            }
            PanPhase::Ended | PanPhase::Cancelled => {
                let commit = sample.phase == PanPhase::Ended && self.should_complete;
                let ended = if commit { self.interaction.finish() } else { self.interaction.cancel() };
                if ended.is_none() {
                    return false;
                }
                match self.transition.as_mut().filter(|t| t.playing.is_none()) {
                    // Page pops always settle at full speed.
                    Some(t) => {
                        t.cancelled = !commit;
                        t.playing = Some((commit, 1.0));
                        true
                    }
                    None => false,
                }
            }
        }
    }

    fn pop_progress(&self, views: &ViewTree, sample: &PanSample) -> f32 {
        let distance = if self.compact {
            COMPACT_POP_DISTANCE
        } else {
            Self::bounds(views, self.host).width().max(1.0)
        };
        (sample.translation.x / distance).clamp(0.0, 1.0)
    }

    // ── time ──────────────────────────────────────────────────────────────

    /// Advances a playing transition; reports it once when it settles.
    pub fn tick(&mut self, views: &mut ViewTree, dt: Duration) -> Option<NavOutcome> {
        let t = self.transition.as_mut()?;
        let (forward, speed) = t.playing?;
        let step = dt.as_secs_f32() / DURATION.as_secs_f32() * speed;
        t.fraction = if forward { (t.fraction + step).min(1.0) } else { (t.fraction - step).max(0.0) };
        t.apply(views);
        let target = if forward { 1.0 } else { 0.0 };
        if t.fraction != target {
            return None;
        }
        let t = self.transition.take()?;
        Some(self.settle(views, t))
    }

    fn settle(&mut self, views: &mut ViewTree, t: PageTransition) -> NavOutcome {
        let completed = !t.cancelled;
        if completed {
            views.set_alpha(t.to, 1.0);
            match t.direction {
                // Covered pages rest at the origin, hidden.
                NavDirection::Forward => {
                    views.set_frame(t.from, Self::bounds(views, self.host));
                }
                NavDirection::Reverse => {
                    views.remove_from_parent(t.from);
                    self.pages.retain(|p| *p != t.from);
                }
            }
        } else {
            views.set_alpha(t.from, 1.0);
            if t.direction == NavDirection::Reverse {
                // Put the page that stayed back on top.
                views.remove_from_parent(t.from);
                views.add_child(self.host, t.from);
            }
        }
        log::debug!("{:?} page transition settled (completed: {completed})", t.direction);
        NavOutcome {
            direction: t.direction,
            completed,
            top: self.pages.last().copied().unwrap_or(t.to),
        }
    }
}

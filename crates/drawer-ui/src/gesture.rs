//! Touch-stream arbitration for swipe-to-dismiss.
//!
//! A [`GestureArbitrator`] sits on one presentation node and decides, per
//! pan session, whether the drag owns the dismissal or yields to the nested
//! scrollable. It also computes the dismissal progress and the release
//! decision from each sample.
//!
//! Recognizer relationships are fixed at configuration time:
//! - edge pans require failure of nothing and recognize alongside each other
//! - the free pan requires failure of edge pans
//! - the nested scroll requires failure of edge pans and runs alongside the
//!   free pan, which only takes ownership once the scrollable cannot consume
//!   the drag (touch outside it, or at its top and dragging down)

use drawer_engine::coords::Vec2;
use drawer_engine::input::PanSample;

use crate::config::GestureThresholds;
use crate::interaction::TransitionProgress;
use crate::screen::ScrollDismissable;

// ── GestureKind ───────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EdgeSide {
    Left,
    Right,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GestureKind {
    /// Pan starting in a screen-edge strip.
    EdgePan(EdgeSide),
    /// Pan starting anywhere else on the presented screen.
    FreePan,
    /// The nested scrollable's own pan.
    NestedScroll,
}

impl GestureKind {
    #[inline]
    pub fn is_edge(self) -> bool {
        matches!(self, GestureKind::EdgePan(_))
    }

    /// Classifies a touch-down location in window coordinates.
    pub fn classify(start: Vec2, window_width: f32, edge_width: f32) -> GestureKind {
        if start.x <= edge_width {
            GestureKind::EdgePan(EdgeSide::Left)
        } else if start.x >= window_width - edge_width {
            GestureKind::EdgePan(EdgeSide::Right)
        } else {
            GestureKind::FreePan
        }
    }

    /// `self` may only begin once `other` has failed.
    pub fn requires_failure_of(self, other: GestureKind) -> bool {
        match self {
            GestureKind::EdgePan(_) => false,
            GestureKind::FreePan | GestureKind::NestedScroll => other.is_edge(),
        }
    }

    pub fn recognizes_simultaneously_with(self, other: GestureKind) -> bool {
        match (self, other) {
            (GestureKind::EdgePan(_), GestureKind::EdgePan(_)) => true,
            (GestureKind::FreePan, GestureKind::NestedScroll)
            | (GestureKind::NestedScroll, GestureKind::FreePan) => true,
            _ => false,
        }
    }
}

/// Kinds allowed to begin for a touch given every candidate that could
/// claim it. A candidate is blocked while something it requires to fail is
/// still in the running.
pub fn resolve_candidates(candidates: &[GestureKind]) -> Vec<GestureKind> {
    candidates
        .iter()
        .copied()
        .filter(|k| !candidates.iter().any(|o| o != k && k.requires_failure_of(*o)))
        .collect()
}

// ── GestureSession ────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GesturePhase {
    Idle,
    Began,
    Changed,
    Cancelled,
    Ended,
}

/// State of one touch-down-to-up stream.
#[derive(Debug, Clone)]
pub struct GestureSession {
    pub kind: GestureKind,
    pub phase: GesturePhase,
    pub owns_dismissal: bool,
    /// Touch-down location in window coordinates.
    pub start_point: Vec2,
    pub last_translation: Vec2,
    pub last_velocity: Vec2,
    pub scroll_began_inside_scrollable: bool,
    /// Translation at the moment ownership was taken; progress is measured from here.
    translation_origin: Vec2,
    should_complete: bool,
    stretched: bool,
}

impl GestureSession {
    fn new(kind: GestureKind, start_point: Vec2) -> Self {
        Self {
            kind,
            phase: GesturePhase::Idle,
            owns_dismissal: false,
            start_point,
            last_translation: Vec2::zero(),
            last_velocity: Vec2::zero(),
            scroll_began_inside_scrollable: false,
            translation_origin: Vec2::zero(),
            should_complete: false,
            stretched: false,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.phase, GesturePhase::Began | GesturePhase::Changed)
    }

    /// Translation since ownership was taken.
    #[inline]
    pub fn dismissal_translation(&self) -> Vec2 {
        self.last_translation - self.translation_origin
    }
}

// ── outcomes ──────────────────────────────────────────────────────────────

/// What the presented screen looks like to the arbitrator.
pub struct DismissalTarget<'a> {
    pub dismissable: Option<&'a dyn ScrollDismissable>,
    /// Window-space origin of the presented screen, for converting touch points.
    pub screen_origin: Vec2,
    pub available_height: f32,
    pub full_screen: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BeginOutcome {
    /// Another session already owns this node.
    Rejected,
    Began { owns_dismissal: bool },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub progress: TransitionProgress,
    /// Unclamped `translationY / availableHeight`.
    pub raw: f32,
    pub should_complete: bool,
    /// Set while dragging above the resting position.
    pub stretch: Option<StretchSample>,
}

/// Touch positions feeding the upward rubber-band offset.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StretchSample {
    pub start_y: f32,
    pub y: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ChangeOutcome {
    /// No live session.
    Ignored,
    /// The nested scrollable keeps the touch.
    Yield,
    /// The session just took ownership; dismissal should begin now.
    StartDismissal,
    Progress(ProgressUpdate),
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct EndOutcome {
    /// Whether the session owned the dismissal when it ended.
    pub owned: bool,
    /// Ownership was taken at release time; dismissal must begin before committing.
    pub synthesize_begin: bool,
    pub should_complete: bool,
    /// The card was stretched and needs to spring back.
    pub unstretch: bool,
}

// ── GestureArbitrator ─────────────────────────────────────────────────────

/// Per-node pan arbitration.
#[derive(Debug)]
pub struct GestureArbitrator {
    thresholds: GestureThresholds,
    session: Option<GestureSession>,
}

impl GestureArbitrator {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self { thresholds, session: None }
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn owns_dismissal(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.owns_dismissal)
    }

    /// Eligibility of a drag to own the dismissal.
    ///
    /// Requires a vertical velocity. Edge pans need nothing else; free pans
    /// additionally need the touch outside the scrollable, no scrollable at
    /// all, or the scrollable at its top with a downward drag, and never
    /// start over a refresh indicator.
    pub fn can_begin_dismissal(&self, kind: GestureKind, sample: &PanSample, target: &DismissalTarget<'_>) -> bool {
        let vertical = sample.velocity.is_vertical();
        if kind.is_edge() {
            return vertical;
        }
        let Some(d) = target.dismissable else {
            return vertical;
        };
        let point = sample.location - target.screen_origin;
        let outside = d.touch_is_outside_scrollable(point);
        let no_scrollable = d.nested_scrollable().is_none();
        let over_refresh = d.has_refresh_indicator() && !outside && !no_scrollable;

        vertical && scroll_permits_dismissal(d, sample, target) && !over_refresh
    }

    pub fn begin(&mut self, kind: GestureKind, sample: &PanSample, target: &DismissalTarget<'_>) -> BeginOutcome {
        if self.session.as_ref().is_some_and(GestureSession::is_active) {
            log::debug!("{kind:?} rejected: a session is already active");
            return BeginOutcome::Rejected;
        }

        let mut session = GestureSession::new(kind, sample.start);
        session.phase = GesturePhase::Began;
        session.last_translation = sample.translation;
        session.last_velocity = sample.velocity;

        if kind == GestureKind::FreePan {
            if let Some(d) = target.dismissable {
                if let Some(scroll) = d.nested_scrollable() {
                    let outside = d.touch_is_outside_scrollable(sample.start - target.screen_origin);
                    session.scroll_began_inside_scrollable = !outside;
                    if !d.has_refresh_indicator() && sample.translation.y > 0.0 {
                        scroll.set_bounces(false);
                    }
                    if outside {
                        scroll.set_scroll_enabled(false);
                        pin_offset(d);
                    }
                }
            }
        }

        session.owns_dismissal = self.can_begin_dismissal(kind, sample, target);
        if session.owns_dismissal {
            session.translation_origin = sample.translation;
        }
        let owns = session.owns_dismissal;
        self.session = Some(session);
        BeginOutcome::Began { owns_dismissal: owns }
    }

    pub fn change(&mut self, sample: &PanSample, target: &DismissalTarget<'_>) -> ChangeOutcome {
        let Some(kind) = self.session.as_ref().filter(|s| s.is_active()).map(|s| s.kind) else {
            return ChangeOutcome::Ignored;
        };
        let eligible = self.can_begin_dismissal(kind, sample, target);
        let t = self.thresholds;
        let Some(session) = self.session.as_mut() else {
            return ChangeOutcome::Ignored;
        };
        session.phase = GesturePhase::Changed;
        session.last_translation = sample.translation;
        session.last_velocity = sample.velocity;

        if !session.owns_dismissal {
            if !eligible {
                return ChangeOutcome::Yield;
            }
            session.owns_dismissal = true;
            if kind == GestureKind::FreePan {
                if let Some(d) = target.dismissable {
                    pin_offset(d);
                }
            }
            session.translation_origin = if sample.translation.y > 0.0 {
                sample.translation
            } else {
                Vec2::zero()
            };
            return ChangeOutcome::StartDismissal;
        }

        let translation = session.dismissal_translation();
        let raw = translation.y / target.available_height;
        let mut percent = raw.clamp(0.0, 1.0);

        let mut refresh_pull = false;
        if kind == GestureKind::FreePan {
            if let Some(d) = target.dismissable {
                if let Some(scroll) = d.nested_scrollable() {
                    let downward = translation.y > 0.0;
                    refresh_pull = downward && d.has_refresh_indicator() && session.scroll_began_inside_scrollable;
                    if translation.y != 0.0 {
                        scroll.set_bounces(!(downward && !d.has_refresh_indicator()));
                    }
                }
            }
        }
        if refresh_pull {
            percent = 0.0;
        }

        let velocity = sample.velocity;
        let flick = if refresh_pull { t.refresh_flick_velocity } else { t.flick_velocity };
        let should_complete = (velocity.y >= 0.0 && percent >= t.complete_fraction)
            || (translation.y > 0.0 && velocity.y > flick);
        session.should_complete = should_complete;

        let stretch = if raw < 0.0
            && (kind.is_edge() || !session.scroll_began_inside_scrollable)
            && !target.full_screen
        {
            session.stretched = true;
            Some(StretchSample { start_y: session.start_point.y, y: sample.location.y })
        } else {
            None
        };

        ChangeOutcome::Progress(ProgressUpdate {
            progress: TransitionProgress::new(percent, velocity.y, t.completion_epsilon),
            raw,
            should_complete,
            stretch,
        })
    }

    pub fn end(&mut self, sample: &PanSample, target: &DismissalTarget<'_>) -> EndOutcome {
        let Some(mut session) = self.session.take() else {
            return EndOutcome::default();
        };
        session.phase = GesturePhase::Ended;
        session.last_translation = sample.translation;
        session.last_velocity = sample.velocity;
        let t = self.thresholds;

        // With a refresh indicator in play only a hard flick dismisses, and
        // only while the scrollable would let the drag dismiss at all.
        let refresh_release = session.kind == GestureKind::FreePan
            && target
                .dismissable
                .is_some_and(|d| d.has_refresh_indicator() && scroll_permits_dismissal(d, sample, target));
        let should_complete = if refresh_release {
            sample.translation.y > 0.0 && sample.velocity.y > t.refresh_flick_velocity
        } else {
            session.owns_dismissal && session.should_complete
        };
        let synthesize_begin = refresh_release && should_complete && !session.owns_dismissal;
        if synthesize_begin {
            log::debug!("refresh flick at {:.0}pt/s: dismissing on release", sample.velocity.y);
        }

        self.restore_scroll(&session, sample.velocity.y, target);

        EndOutcome {
            owned: session.owns_dismissal || synthesize_begin,
            synthesize_begin,
            should_complete,
            unstretch: session.stretched,
        }
    }

    pub fn cancel(&mut self, sample: &PanSample, target: &DismissalTarget<'_>) -> EndOutcome {
        let Some(mut session) = self.session.take() else {
            return EndOutcome::default();
        };
        session.phase = GesturePhase::Cancelled;
        self.restore_scroll(&session, sample.velocity.y, target);
        EndOutcome {
            owned: session.owns_dismissal,
            synthesize_begin: false,
            should_complete: false,
            unstretch: session.stretched,
        }
    }

    fn restore_scroll(&self, session: &GestureSession, velocity_y: f32, target: &DismissalTarget<'_>) {
        if session.kind != GestureKind::FreePan {
            return;
        }
        let Some(scroll) = target.dismissable.and_then(|d| d.nested_scrollable()) else {
            return;
        };
        scroll.set_bounces(true);
        if velocity_y <= self.thresholds.scroll_reset_velocity {
            // Re-arming cancels any momentum the scrollable picked up.
            scroll.set_scroll_enabled(false);
        }
        scroll.set_scroll_enabled(true);
    }
}

/// Whether the nested scrollable lets a free drag dismiss: the touch is
/// outside it, there is none, or it sits at its top and the drag goes down.
fn scroll_permits_dismissal(d: &dyn ScrollDismissable, sample: &PanSample, target: &DismissalTarget<'_>) -> bool {
    let point = sample.location - target.screen_origin;
    d.touch_is_outside_scrollable(point)
        || d.nested_scrollable().is_none()
        || (d.is_at_top() && sample.translation.y > 0.0)
}

/// Clamps the nested scrollable so it cannot scroll past its resting offset.
fn pin_offset(d: &dyn ScrollDismissable) {
    if let Some(scroll) = d.nested_scrollable() {
        let pinned = scroll.content_offset().max(-d.scroll_top_offset());
        scroll.set_content_offset(pinned);
    }
}

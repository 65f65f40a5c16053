//! Per-node presentation lifecycle.
//!
//! A [`PresentationCoordinator`] moves one node through
//! `Created → WillPresent → Presented → WillDismiss → Dismissed`, with a
//! cancelled dismissal returning to `Presented`. At every step the presenter
//! and grandpresenter are updated together: their real views, the proxies
//! standing in for them and the edge strips that mirror them all receive
//! the same transform in the same call.
//!
//! Snapshot lifetime:
//! - by default proxies live for the duration of each transition only; they
//!   are released when a presentation ends and captured again when a
//!   dismissal starts
//! - with backing snapshots they are kept from presentation start until the
//!   dismissal completes

use drawer_engine::animation::{PropertyAnimation, ViewProps};
use drawer_engine::coords::ColorRgba;
use drawer_engine::time::CancelToken;
use drawer_engine::transform::Transform3d;
use drawer_engine::view::{ViewId, ViewTree};

use crate::config::GestureThresholds;
use crate::geometry::{ChainRole, GeometryModel, RadiusState};
use crate::registry::{Chain, ChainMember, DepthCounter, NodeId};
use crate::screen::{Presentable, ScreenRef};
use crate::snapshot::{CaptureTarget, SnapshotSet};
use crate::transition::TransitionContext;

const DIMMING_ALPHA: f32 = 0.5;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NodePhase {
    Created,
    WillPresent,
    Presented,
    WillDismiss,
    Dismissed,
}

/// Everything a phase step reads or writes outside the coordinator.
pub struct PhaseCtx<'a> {
    pub views: &'a mut ViewTree,
    pub geometry: &'a GeometryModel,
    pub chain: Chain,
    /// Offscreen parking view for substituted presenters.
    pub holder: ViewId,
    pub container: ViewId,
    pub presented: ScreenRef,
    pub full_screen: bool,
    pub backing: bool,
}

impl PhaseCtx<'_> {
    fn capture_target(&self) -> CaptureTarget {
        CaptureTarget {
            container: Some(self.container),
            presenter: self.chain.presenter.as_ref().map(|p| p.screen.view()),
            holder: self.holder,
            presenter_is_root: self.chain.presenter.as_ref().is_some_and(ChainMember::is_root),
        }
    }
}

#[derive(Debug)]
pub struct PresentationCoordinator {
    node: NodeId,
    phase: NodePhase,
    snapshots: SnapshotSet,
    dimming: Option<ViewId>,
    delayed: Option<CancelToken>,
    delayed_fired: bool,
}

impl PresentationCoordinator {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            phase: NodePhase::Created,
            snapshots: SnapshotSet::new(),
            dimming: None,
            delayed: None,
            delayed_fired: false,
        }
    }

    #[inline]
    pub fn phase(&self) -> NodePhase {
        self.phase
    }

    #[inline]
    pub fn snapshots(&self) -> &SnapshotSet {
        &self.snapshots
    }

    #[inline]
    pub fn dimming(&self) -> Option<ViewId> {
        self.dimming
    }

    /// Token for the pending presentation animation, while one is outstanding.
    pub fn delayed_token(&self) -> Option<&CancelToken> {
        self.delayed.as_ref().filter(|t| !self.delayed_fired && !t.is_cancelled())
    }

    pub fn mark_delayed_fired(&mut self) {
        self.delayed_fired = true;
    }

    fn set_phase(&mut self, phase: NodePhase) {
        log::debug!("node {:?}: {:?} -> {:?}", self.node, self.phase, phase);
        self.phase = phase;
    }

    // ── chain helpers ─────────────────────────────────────────────────────

    /// Presenter views plus this node's own proxy of the presenter.
    fn presenter_views(&self, cx: &PhaseCtx<'_>) -> Vec<ViewId> {
        let mut out = cx.chain.presenter.as_ref().map(|p| p.views.clone()).unwrap_or_default();
        out.extend(self.snapshots.presenter_proxy());
        out
    }

    fn grand_views(cx: &PhaseCtx<'_>) -> Vec<ViewId> {
        cx.chain.grand.as_ref().map(|g| g.views.clone()).unwrap_or_default()
    }

    fn receded(cx: &PhaseCtx<'_>, completed: bool) -> Transform3d {
        match &cx.chain.presenter {
            Some(p) => cx.geometry.scale_transform(p.role, cx.full_screen, completed),
            None => Transform3d::IDENTITY,
        }
    }

    fn grand_receded(cx: &PhaseCtx<'_>, with_offset: bool) -> Transform3d {
        match &cx.chain.grand {
            Some(g) => cx.geometry.grand_transform(g.role, cx.full_screen, with_offset),
            None => Transform3d::IDENTITY,
        }
    }

    /// Applies presenter and grandpresenter transforms in one step.
    fn apply_chain(&self, cx: &mut PhaseCtx<'_>, presenter: Transform3d, grand: Transform3d) {
        for v in self.presenter_views(cx) {
            cx.views.set_transform(v, presenter);
        }
        for v in Self::grand_views(cx) {
            cx.views.set_transform(v, grand);
        }
    }

    /// Registers presenter and grandpresenter animations in one step.
    fn animate_chain(&self, cx: &mut PhaseCtx<'_>, ctx: &mut TransitionContext, presenter: ViewProps, grand: Transform3d) {
        for v in self.presenter_views(cx) {
            if let Some(a) = PropertyAnimation::capture(cx.views, v, presenter) {
                ctx.animate_alongside(a);
            }
        }
        for v in Self::grand_views(cx) {
            if let Some(a) = PropertyAnimation::capture(cx.views, v, ViewProps::new().transform(grand)) {
                ctx.animate_alongside(a);
            }
        }
    }

    /// Sets the presenter's corner radius on its real view and proxy.
    fn set_presenter_radius(&self, cx: &mut PhaseCtx<'_>, radius: f32) {
        let targets: Vec<ViewId> = cx
            .chain
            .presenter
            .as_ref()
            .map(|p| p.screen.view())
            .into_iter()
            .chain(self.snapshots.presenter_proxy())
            .collect();
        for v in targets {
            cx.views.set_corner_radius(v, radius);
            cx.views.set_clips_to_bounds(v, radius > 0.0);
        }
    }

    fn presenter_rounds(cx: &PhaseCtx<'_>) -> bool {
        cx.chain.presenter.as_ref().is_some_and(ChainMember::rounds_when_receded)
    }

    fn notify_both(cx: &PhaseCtx<'_>, f: impl Fn(&dyn Presentable)) {
        cx.presented.notify(&f);
        if let Some(p) = &cx.chain.presenter {
            p.screen.notify(&f);
        }
    }

    fn edge_start(cx: &PhaseCtx<'_>, lower: bool) -> Transform3d {
        if lower {
            Transform3d::translate(0.0, cx.geometry.lower_edge_height())
        } else {
            Transform3d::translate(0.0, cx.geometry.container.height)
        }
    }

    fn edges(&self) -> [(Option<ViewId>, bool); 3] {
        [
            (self.snapshots.left_edge(), false),
            (self.snapshots.right_edge(), false),
            (self.snapshots.lower_edge(), true),
        ]
    }

    // ── presentation ──────────────────────────────────────────────────────

    /// Prepares the chain and registers the presentation animations.
    ///
    /// Returns a cancellation token when the presented screen asked for a
    /// delayed accompanying animation; the caller schedules it.
    pub fn will_present(
        &mut self,
        cx: &mut PhaseCtx<'_>,
        transition: Option<&mut TransitionContext>,
        animate_with_presentation: bool,
    ) -> Option<CancelToken> {
        self.set_phase(NodePhase::WillPresent);

        let presented = cx.presented.view();
        cx.views.set_clips_to_bounds(presented, true);
        if !cx.full_screen {
            cx.views.set_corner_radius(presented, cx.geometry.metrics.corner_radius);
        }
        cx.presented.set_light_status_bar(!cx.full_screen);

        if cx.chain.presenter.is_none() {
            log::debug!("node {:?}: no presenter, presenting without chain effects", self.node);
            return None;
        }

        let dimming = cx.views.create(cx.geometry.dimming_frame(false));
        cx.views.set_background(dimming, Some(ColorRgba::black().with_alpha(DIMMING_ALPHA)));
        cx.views.set_alpha(dimming, 0.0);
        cx.views.insert_child(cx.container, dimming, 0);
        self.dimming = Some(dimming);

        let target = cx.capture_target();
        self.snapshots.capture_for_presentation_start(cx.views, cx.geometry, &target);

        let ctx = match transition {
            Some(ctx) if ctx.is_animated() => ctx,
            _ => {
                cx.views.set_alpha(dimming, 1.0);
                cx.views.set_frame(dimming, cx.geometry.dimming_frame(true));
                for e in self.edges().into_iter().filter_map(|(e, _)| e) {
                    cx.views.set_transform(e, Transform3d::IDENTITY);
                }
                return None;
            }
        };

        Self::notify_both(cx, |p| p.on_will_present());

        let wants_delayed = animate_with_presentation
            && cx
                .presented
                .dismissable()
                .is_some_and(|d| !d.presentation_animation(cx.views).is_empty());
        let token = wants_delayed.then(|| CancelToken::new(u64::from(self.node.generation())));
        self.delayed = token.clone();
        self.delayed_fired = false;

        let band = ViewProps::new().alpha(1.0).frame(cx.geometry.dimming_frame(true));
        if let Some(a) = PropertyAnimation::capture(cx.views, dimming, band) {
            ctx.animate_alongside(a);
        }
        for (edge, _) in self.edges() {
            let Some(e) = edge else { continue };
            if let Some(a) = PropertyAnimation::capture(cx.views, e, ViewProps::new().transform(Transform3d::IDENTITY)) {
                ctx.animate_alongside(a);
            }
        }

        let radius = cx.geometry.metrics.corner_radius;
        let presenter = ViewProps::new().transform(Self::receded(cx, true)).corner_radius(radius);
        for v in self.presenter_views(cx) {
            cx.views.set_clips_to_bounds(v, true);
        }
        let grand = Self::grand_receded(cx, true);
        self.animate_chain(cx, ctx, presenter, grand);
        token
    }

    /// Settles the chain once the presentation transition ends.
    pub fn did_present(&mut self, cx: &mut PhaseCtx<'_>, completed: bool, depth: &mut DepthCounter) {
        if completed {
            let d = depth.increment();
            log::debug!("node {:?} presented, depth {d}", self.node);
            self.set_phase(NodePhase::Presented);
        } else {
            self.set_phase(NodePhase::Dismissed);
        }
        if cx.chain.presenter.is_none() {
            return;
        }

        if !cx.backing || !completed {
            self.snapshots.release(cx.views);
        }
        let (presenter, grand) = (Self::receded(cx, completed), Self::grand_receded(cx, completed));
        self.apply_chain(cx, presenter, grand);

        let radius = if Self::presenter_rounds(cx) {
            cx.geometry.corner_radius(RadiusState::Presenting, completed)
        } else {
            cx.geometry.metrics.corner_radius
        };
        self.set_presenter_radius(cx, radius);

        Self::notify_both(cx, |p| p.on_did_present(completed));
    }

    // ── dismissal ─────────────────────────────────────────────────────────

    /// Prepares the dismissal.
    ///
    /// Without an animated transition everything is stripped on the spot.
    /// Returns `true` when a still pending delayed animation was cancelled.
    pub fn will_dismiss(&mut self, cx: &mut PhaseCtx<'_>, transition: Option<&mut TransitionContext>) -> bool {
        self.set_phase(NodePhase::WillDismiss);

        let skipped = self.delayed_token().is_some();
        if let Some(t) = self.delayed.take() {
            t.cancel();
        }
        Self::notify_both(cx, |p| p.on_will_dismiss());

        let presenter_light = cx.chain.presenter.as_ref().map(|p| p.screen.light_status_bar());

        let ctx = match transition {
            Some(ctx) if ctx.is_animated() => ctx,
            _ => {
                cx.views.remove_from_parent(cx.presented.view());
                if Self::presenter_rounds(cx) {
                    self.set_presenter_radius(cx, 0.0);
                }
                if let Some(light) = presenter_light {
                    cx.presented.set_light_status_bar(light);
                }
                let grand = Self::grand_receded(cx, false);
                self.apply_chain(cx, Transform3d::IDENTITY, grand);
                if let Some(d) = self.dimming {
                    cx.views.set_hidden(d, true);
                }
                self.snapshots.hide_edges(cx.views);
                return skipped;
            }
        };

        if cx.chain.presenter.is_none() {
            return skipped;
        }

        if !self.snapshots.is_captured() {
            let target = cx.capture_target();
            if self.snapshots.capture_for_presentation_start(cx.views, cx.geometry, &target) {
                // Fresh edges start at rest for a dismissal.
                for e in self.edges().into_iter().filter_map(|(e, _)| e) {
                    cx.views.set_transform(e, Transform3d::IDENTITY);
                }
            }
        }

        if !ctx.is_interactive() {
            if let Some(light) = presenter_light {
                cx.presented.set_light_status_bar(light);
            }
        }

        if let Some(d) = self.dimming {
            let full = ViewProps::new().alpha(0.0).frame(cx.geometry.dimming_frame(false));
            if let Some(a) = PropertyAnimation::capture(cx.views, d, full) {
                ctx.animate_alongside(a);
            }
        }
        for (edge, lower) in self.edges() {
            let Some(e) = edge else { continue };
            let to = ViewProps::new().transform(Self::edge_start(cx, lower));
            if let Some(a) = PropertyAnimation::capture(cx.views, e, to) {
                ctx.animate_alongside(a);
            }
        }

        let mut presenter = ViewProps::new().transform(Transform3d::IDENTITY);
        if Self::presenter_rounds(cx) {
            presenter = presenter.corner_radius(0.0);
        }
        let grand = Self::grand_receded(cx, false);
        self.animate_chain(cx, ctx, presenter, grand);
        skipped
    }

    /// Settles the chain once the dismissal transition ends.
    pub fn did_dismiss(
        &mut self,
        cx: &mut PhaseCtx<'_>,
        completed: bool,
        animated: bool,
        interactive: bool,
        depth: &mut DepthCounter,
    ) {
        if completed {
            let d = depth.decrement();
            log::debug!("node {:?} dismissed, depth {d}", self.node);
            self.set_phase(NodePhase::Dismissed);
        } else {
            self.set_phase(NodePhase::Presented);
        }

        if !animated || cx.chain.presenter.is_none() {
            self.snapshots.release(cx.views);
            Self::notify_both(cx, |p| p.on_did_dismiss(completed));
            return;
        }

        if completed || !cx.backing {
            self.snapshots.release(cx.views);
        }

        let presenter = if completed { Transform3d::IDENTITY } else { Self::receded(cx, true) };
        let grand = Self::grand_receded(cx, !completed);
        self.apply_chain(cx, presenter, grand);

        if Self::presenter_rounds(cx) {
            let radius = cx.geometry.corner_radius(RadiusState::Dismissing, completed);
            self.set_presenter_radius(cx, radius);
        }

        if !completed && !interactive {
            cx.presented.set_light_status_bar(!cx.full_screen);
        }
        Self::notify_both(cx, |p| p.on_did_dismiss(completed));
    }

    // ── status bar ────────────────────────────────────────────────────────

    /// Status-bar appearance of the presented screen while it is dragged.
    pub fn interactive_status_bar(&self, cx: &PhaseCtx<'_>, percent: f32, available_height: f32, t: &GestureThresholds) {
        let Some(presenter) = &cx.chain.presenter else {
            return;
        };
        let lead = t.status_bar_lead / available_height.max(1.0);
        let light = if percent < lead {
            !cx.full_screen
        } else if percent <= t.status_bar_switch {
            true
        } else {
            presenter.role == ChainRole::Card
        };
        cx.presented.set_light_status_bar(light);
    }

    /// Status-bar appearance once a drag is released.
    pub fn finish_status_bar(&self, cx: &PhaseCtx<'_>, committed: bool) {
        let Some(presenter) = &cx.chain.presenter else {
            return;
        };
        let light = if committed { presenter.screen.light_status_bar() } else { !cx.full_screen };
        cx.presented.set_light_status_bar(light);
    }

    // ── layout ────────────────────────────────────────────────────────────

    /// Re-applies resting geometry after the container changed size.
    ///
    /// Each chain member is reset to identity before its frame is replaced,
    /// and only then receives its recomputed transform.
    pub fn container_did_resize(&mut self, cx: &mut PhaseCtx<'_>) {
        let bounds = cx.geometry.container.bounds();
        cx.views.set_frame(cx.container, bounds);
        cx.views.set_frame(cx.presented.view(), cx.geometry.presented_frame(cx.full_screen));
        if let Some(d) = self.dimming {
            cx.views.set_frame(d, cx.geometry.dimming_frame(self.phase == NodePhase::Presented));
        }
        if self.phase != NodePhase::Presented {
            return;
        }

        let members = [
            cx.chain.presenter.clone().map(|m| (m, self.presenter_views(cx), Self::receded(cx, true))),
            cx.chain.grand.clone().map(|m| (m, Self::grand_views(cx), Self::grand_receded(cx, true))),
        ];
        for (member, mirrors, transform) in members.into_iter().flatten() {
            let view = member.screen.view();
            cx.views.set_transform(view, Transform3d::IDENTITY);
            let frame = match member.role {
                ChainRole::Root => bounds,
                role => cx.geometry.presented_frame(role == ChainRole::FullScreenCard),
            };
            cx.views.set_frame(view, frame);
            for v in mirrors {
                cx.views.set_transform(v, transform);
            }
        }
        if self.snapshots.is_captured() {
            let target = cx.capture_target();
            self.snapshots.refresh(cx.views, cx.geometry, &target, false);
        }
    }

    /// Animation bringing the presented view back to its resting frame and
    /// corner radius.
    pub fn preferred_content_size_changed(&self, cx: &PhaseCtx<'_>) -> Option<PropertyAnimation> {
        let radius = if cx.full_screen { 0.0 } else { cx.geometry.metrics.corner_radius };
        let to = ViewProps::new()
            .frame(cx.geometry.presented_frame(cx.full_screen))
            .corner_radius(radius);
        PropertyAnimation::capture(cx.views, cx.presented.view(), to)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use drawer_engine::coords::{Rect, Viewport};

    use super::*;
    use crate::config::DrawerConfig;
    use crate::registry::PresentationRegistry;
    use crate::screen::{Screen, ScrollDismissable, StatusBarFlag};

    struct Sheet;
    impl ScrollDismissable for Sheet {}

    struct Fixture {
        views: ViewTree,
        registry: PresentationRegistry,
        geometry: GeometryModel,
        holder: ViewId,
        node: NodeId,
    }

    fn fixture() -> Fixture {
        let mut views = ViewTree::new();
        let size = Viewport::new(390.0, 844.0);
        let window = views.create(size.bounds());
        let holder = views.create(size.bounds());
        let root = Screen::new("root", views.create(size.bounds()))
            .with_status_bar(Rc::new(StatusBarFlag::new(false)))
            .into_ref();
        views.add_child(window, root.view());
        let card = Screen::new("card", views.create(Rect::default()))
            .with_dismissable(Rc::new(Sheet))
            .with_status_bar(Rc::new(StatusBarFlag::new(false)))
            .into_ref();
        let container = views.create(size.bounds());
        views.add_child(window, container);
        views.add_child(container, card.view());

        let config = DrawerConfig::default();
        let mut registry = PresentationRegistry::new(root, config);
        let node = registry.insert(card, container).unwrap();
        Fixture {
            views,
            registry,
            geometry: GeometryModel::new(size, config.metrics, false),
            holder,
            node,
        }
    }

    fn with_cx<R>(f: &mut Fixture, run: impl FnOnce(&mut PresentationCoordinator, &mut PhaseCtx<'_>, &mut DepthCounter) -> R) -> R {
        let chain = f.registry.chain(f.node);
        let (node, depth) = f.registry.node_and_depth(f.node).unwrap();
        let mut cx = PhaseCtx {
            views: &mut f.views,
            geometry: &f.geometry,
            chain,
            holder: f.holder,
            container: node.container(),
            presented: node.presented().clone(),
            full_screen: node.is_full_screen(),
            backing: node.uses_backing_snapshots(),
        };
        run(&mut node.coordinator, &mut cx, depth)
    }

    // ── lifecycle ────────────────────────────────────────────────────────

    #[test]
    fn non_animated_present_lands_in_end_state() {
        let mut f = fixture();
        let token = with_cx(&mut f, |c, cx, depth| {
            let token = c.will_present(cx, None, true);
            c.did_present(cx, true, depth);
            token
        });
        assert!(token.is_none());
        assert_eq!(f.registry.depth(), 1);

        let node = f.registry.get(f.node).unwrap();
        assert_eq!(node.coordinator.phase(), NodePhase::Presented);
        assert!(node.coordinator.snapshots().is_empty());
        let dimming = node.coordinator.dimming().unwrap();
        assert_eq!(f.views.alpha(dimming), Some(1.0));
        assert_eq!(f.views.frame(dimming), Some(f.geometry.dimming_frame(true)));

        let root = f.registry.root().view();
        let receded = f.geometry.scale_transform(ChainRole::Root, false, true);
        assert!(f.views.transform(root).unwrap().approx_eq(&receded, 1e-4));
        assert_eq!(f.views.corner_radius(root), Some(f.geometry.metrics.corner_radius));
    }

    #[test]
    fn cancelled_dismissal_keeps_depth_and_recedes_again() {
        let mut f = fixture();
        with_cx(&mut f, |c, cx, depth| {
            c.will_present(cx, None, false);
            c.did_present(cx, true, depth);
        });
        let mut ctx = TransitionContext::new(f.node, crate::transition::TransitionKind::Dismissal, true, true, Default::default());
        with_cx(&mut f, |c, cx, depth| {
            c.will_dismiss(cx, Some(&mut ctx));
            assert!(c.snapshots().is_captured());
            c.did_dismiss(cx, false, true, true, depth);
        });

        assert_eq!(f.registry.depth(), 1);
        let node = f.registry.get(f.node).unwrap();
        assert_eq!(node.coordinator.phase(), NodePhase::Presented);
        assert!(node.coordinator.snapshots().is_empty());
        let root = f.registry.root().view();
        let receded = f.geometry.scale_transform(ChainRole::Root, false, true);
        assert!(f.views.transform(root).unwrap().approx_eq(&receded, 1e-4));
    }

    // ── status bar ───────────────────────────────────────────────────────

    #[test]
    fn status_bar_follows_drag_progress() {
        let mut f = fixture();
        let t = DrawerConfig::default().gestures;
        let available = 780.0;
        let presented = f.registry.get(f.node).unwrap().presented().clone();

        with_cx(&mut f, |c, cx, _| c.interactive_status_bar(cx, 0.01, available, &t));
        assert!(presented.light_status_bar());
        with_cx(&mut f, |c, cx, _| c.interactive_status_bar(cx, 0.5, available, &t));
        assert!(presented.light_status_bar());
        // Past the switch point the root presenter's appearance shows through.
        with_cx(&mut f, |c, cx, _| c.interactive_status_bar(cx, 0.9, available, &t));
        assert!(!presented.light_status_bar());

        with_cx(&mut f, |c, cx, _| c.finish_status_bar(cx, false));
        assert!(presented.light_status_bar());
        with_cx(&mut f, |c, cx, _| c.finish_status_bar(cx, true));
        assert!(!presented.light_status_bar());
    }
}

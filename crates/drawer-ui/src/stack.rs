//! The drawer stack facade.
//!
//! [`DrawerStack`] owns the view tree, the presentation registry, the one
//! transition allowed to run at a time, the free-running animator and the
//! delay queue. Hosts feed it presentation requests, pan samples, taps,
//! resizes and time; it answers with view-tree state and [`DrawerEvent`]s.

use std::time::Duration;

use drawer_engine::animation::{Animator, Curve, PropertyAnimation, ViewProps};
use drawer_engine::coords::{Vec2, Viewport};
use drawer_engine::input::{PanPhase, PanSample};
use drawer_engine::time::DelayQueue;
use drawer_engine::transform::Transform3d;
use drawer_engine::view::{ViewId, ViewTree};

use crate::animator::TransitionAnimator;
use crate::config::DrawerConfig;
use crate::coordinator::{NodePhase, PhaseCtx, PresentationCoordinator};
use crate::event::DrawerEvent;
use crate::geometry::GeometryModel;
use crate::gesture::{BeginOutcome, ChangeOutcome, DismissalTarget, EndOutcome, GestureKind, ProgressUpdate};
use crate::registry::{DepthCounter, NodeId, PresentationNode, PresentationRegistry};
use crate::screen::ScreenRef;
use crate::transition::{TransitionContext, TransitionKind};

/// What a pan sample did.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PanDisposition {
    /// Not for this node, or no live session.
    Ignored,
    /// The nested scrollable keeps the touch.
    Yielded,
    /// The sample is driving a dismissal.
    Dismissing,
}

pub struct DrawerStack {
    views: ViewTree,
    registry: PresentationRegistry,
    geometry: GeometryModel,
    window: ViewId,
    holder: ViewId,
    animator: Animator,
    transition_animator: TransitionAnimator,
    active: Option<TransitionContext>,
    delays: DelayQueue<NodeId>,
    pending_resize: Option<Viewport>,
    now: Duration,
    events: Vec<DrawerEvent>,
}

impl DrawerStack {
    /// Builds a stack over `views`, mounting `root` as the window's base screen.
    pub fn new(mut views: ViewTree, root: ScreenRef, window_size: Viewport, config: DrawerConfig) -> Self {
        let bounds = window_size.bounds();
        let window = views.create_labeled(bounds, "window");
        let holder = views.create_labeled(bounds, "holder");
        views.set_hidden(holder, true);
        views.set_frame(root.view(), bounds);
        views.add_child(window, root.view());

        let geometry = GeometryModel::new(window_size, config.metrics, config.flags.use_3d_transforms);
        log::info!(
            "drawer stack {}x{} (3d: {}, full screen default: {})",
            window_size.width,
            window_size.height,
            config.flags.use_3d_transforms,
            config.flags.use_fullscreen
        );

        Self {
            views,
            registry: PresentationRegistry::new(root, config),
            geometry,
            window,
            holder,
            animator: Animator::new(),
            transition_animator: TransitionAnimator::new(),
            active: None,
            delays: DelayQueue::new(),
            pending_resize: None,
            now: Duration::ZERO,
            events: Vec::new(),
        }
    }

    // ── queries ───────────────────────────────────────────────────────────

    pub fn depth(&self) -> usize {
        self.registry.depth()
    }

    pub fn top_node(&self) -> Option<NodeId> {
        self.registry.top()
    }

    pub fn node(&self, id: NodeId) -> Option<&PresentationNode> {
        self.registry.get(id)
    }

    pub fn phase(&self, id: NodeId) -> Option<NodePhase> {
        self.registry.get(id).map(|n| n.coordinator.phase())
    }

    pub fn registry(&self) -> &PresentationRegistry {
        &self.registry
    }

    pub fn views(&self) -> &ViewTree {
        &self.views
    }

    /// For hosts building screens and updating content.
    pub fn views_mut(&mut self) -> &mut ViewTree {
        &mut self.views
    }

    pub fn geometry(&self) -> &GeometryModel {
        &self.geometry
    }

    pub fn window(&self) -> ViewId {
        self.window
    }

    pub fn holder(&self) -> ViewId {
        self.holder
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_transitioning(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_transition(&self) -> Option<&TransitionContext> {
        self.active.as_ref()
    }

    /// Whether the status bar should use light content for the topmost screen.
    pub fn status_bar_light(&self) -> bool {
        self.registry.top_screen().light_status_bar()
    }

    pub fn take_events(&mut self) -> Vec<DrawerEvent> {
        std::mem::take(&mut self.events)
    }

    fn reject(&mut self, reason: &'static str) {
        log::debug!("request rejected: {reason}");
        self.events.push(DrawerEvent::RequestRejected { reason });
    }

    /// Runs a phase step on `id`'s coordinator with a freshly resolved chain.
    fn with_phase<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut PresentationCoordinator, &mut PhaseCtx<'_>, &mut DepthCounter) -> R,
    ) -> Option<R> {
        let chain = self.registry.chain(id);
        let Self { views, registry, geometry, holder, .. } = self;
        let (node, depth) = registry.node_and_depth(id)?;
        let mut cx = PhaseCtx {
            views,
            geometry,
            chain,
            holder: *holder,
            container: node.container(),
            presented: node.presented().clone(),
            full_screen: node.is_full_screen(),
            backing: node.uses_backing_snapshots(),
        };
        Some(f(&mut node.coordinator, &mut cx, depth))
    }

    // ── presentation ──────────────────────────────────────────────────────

    /// Presents `screen` on top of the stack.
    ///
    /// Returns `None` while another transition runs or when the screen is
    /// already on screen.
    pub fn present(&mut self, screen: ScreenRef, animated: bool) -> Option<NodeId> {
        if self.active.is_some() {
            self.reject("present during a running transition");
            return None;
        }
        let container = self.views.create(self.geometry.container.bounds());
        let Some(id) = self.registry.insert(screen.clone(), container) else {
            self.views.destroy(container);
            self.reject("screen already presented");
            return None;
        };
        self.views.add_child(self.window, container);

        let duration = self.transition_animator.transition_duration(TransitionKind::Presentation, false);
        let mut ctx = TransitionContext::new(id, TransitionKind::Presentation, animated, false, duration);
        let animate_with = self.registry.config().flags.animate_with_presentation;
        let token = self
            .with_phase(id, |c, cx, _| c.will_present(cx, Some(&mut ctx), animate_with))
            .flatten();

        let full_screen = screen.is_full_screen();
        self.transition_animator.animate_transition(
            &mut self.views,
            &mut ctx,
            container,
            screen.view(),
            self.geometry.presented_frame(full_screen),
            self.geometry.container.height,
        );
        if let Some(token) = token {
            let delay = self.registry.config().metrics.presentation_delay();
            self.delays.schedule(self.now, delay, Some(token), id);
        }

        log::info!("presenting {} as {id:?} (animated: {animated})", screen.name());
        self.events.push(DrawerEvent::PresentationBegan { node: id, screen: screen.id(), animated });
        self.active = Some(ctx);
        if !animated {
            self.advance_active(Duration::ZERO);
        }
        Some(id)
    }

    // ── dismissal ─────────────────────────────────────────────────────────

    /// Dismisses `id`, which must be the top node.
    pub fn dismiss(&mut self, id: NodeId, animated: bool) -> bool {
        if self.active.is_some() {
            self.reject("dismiss during a running transition");
            return false;
        }
        if self.registry.top() != Some(id) {
            self.reject("only the top presentation can be dismissed");
            return false;
        }
        if !self.begin_dismissal(id, animated, false) {
            return false;
        }
        if !animated {
            self.advance_active(Duration::ZERO);
        }
        true
    }

    pub fn dismiss_top(&mut self, animated: bool) -> bool {
        match self.registry.top() {
            Some(id) => self.dismiss(id, animated),
            None => {
                self.reject("nothing to dismiss");
                false
            }
        }
    }

    /// Tap on the dimming band of `id`.
    pub fn tap_dimming(&mut self, id: NodeId) -> bool {
        if self.phase(id) != Some(NodePhase::Presented) {
            return false;
        }
        self.dismiss(id, true)
    }

    /// Routes a tap in window coordinates; dismisses the top node when the
    /// tap lands on its dimming band outside the presented card.
    pub fn tap(&mut self, point: Vec2) -> bool {
        let Some(id) = self.registry.top() else {
            return false;
        };
        let Some(node) = self.registry.get(id) else {
            return false;
        };
        let on_card = self.views.frame(node.presented().view()).is_some_and(|f| f.contains(point));
        let on_dimming = node
            .coordinator
            .dimming()
            .and_then(|d| self.views.frame(d))
            .is_some_and(|f| f.contains(point));
        if on_dimming && !on_card {
            return self.tap_dimming(id);
        }
        false
    }

    fn begin_dismissal(&mut self, id: NodeId, animated: bool, interactive: bool) -> bool {
        let Some(node) = self.registry.get(id) else {
            return false;
        };
        let presented = node.presented().clone();
        let container = node.container();
        let full_screen = node.is_full_screen();

        let duration = self.transition_animator.transition_duration(TransitionKind::Dismissal, interactive);
        let mut ctx = TransitionContext::new(id, TransitionKind::Dismissal, animated, interactive, duration);
        let skipped = self
            .with_phase(id, |c, cx, _| c.will_dismiss(cx, Some(&mut ctx)))
            .unwrap_or(false);
        if skipped {
            self.events.push(DrawerEvent::DelayedAnimationSkipped { node: id });
        }
        if animated {
            self.transition_animator.animate_transition(
                &mut self.views,
                &mut ctx,
                container,
                presented.view(),
                self.geometry.presented_frame(full_screen),
                self.geometry.container.height,
            );
        }

        log::info!("dismissing {} ({id:?}, interactive: {interactive})", presented.name());
        self.events.push(DrawerEvent::DismissalBegan { node: id, interactive });
        self.active = Some(ctx);
        true
    }

    // ── gestures ──────────────────────────────────────────────────────────

    /// Feeds one pan sample recognized on `id`'s presented screen.
    pub fn handle_pan(&mut self, id: NodeId, kind: GestureKind, sample: &PanSample) -> PanDisposition {
        if self.registry.top() != Some(id) {
            return PanDisposition::Ignored;
        }
        let Some(node) = self.registry.get(id) else {
            return PanDisposition::Ignored;
        };
        let presented = node.presented().clone();
        let full_screen = node.is_full_screen();
        let frame = self.views.frame(presented.view()).unwrap_or_default();
        let target = DismissalTarget {
            dismissable: presented.dismissable(),
            screen_origin: frame.origin,
            available_height: self.geometry.available_height(frame.height()),
            full_screen,
        };

        match sample.phase {
            PanPhase::Began => {
                if self.active.is_some() {
                    log::debug!("{kind:?} on {id:?} rejected: transition running");
                    self.events.push(DrawerEvent::GestureRejected { node: id, kind });
                    return PanDisposition::Ignored;
                }
                let Some(node) = self.registry.get_mut(id) else {
                    return PanDisposition::Ignored;
                };
                match node.arbitrator.begin(kind, sample, &target) {
                    BeginOutcome::Rejected => {
                        self.events.push(DrawerEvent::GestureRejected { node: id, kind });
                        PanDisposition::Ignored
                    }
                    BeginOutcome::Began { owns_dismissal: true } => self.start_interactive(id),
                    BeginOutcome::Began { owns_dismissal: false } => PanDisposition::Yielded,
                }
            }
            PanPhase::Changed => {
                let Some(node) = self.registry.get_mut(id) else {
                    return PanDisposition::Ignored;
                };
                match node.arbitrator.change(sample, &target) {
                    ChangeOutcome::Ignored => PanDisposition::Ignored,
                    ChangeOutcome::Yield => PanDisposition::Yielded,
                    ChangeOutcome::StartDismissal => self.start_interactive(id),
                    ChangeOutcome::Progress(update) => {
                        self.apply_progress(id, &presented, update, target.available_height);
                        PanDisposition::Dismissing
                    }
                }
            }
            PanPhase::Ended | PanPhase::Cancelled => {
                let Some(node) = self.registry.get_mut(id) else {
                    return PanDisposition::Ignored;
                };
                let out = if sample.phase == PanPhase::Ended {
                    node.arbitrator.end(sample, &target)
                } else {
                    node.arbitrator.cancel(sample, &target)
                };
                self.release_drag(id, &presented, out)
            }
        }
    }

    fn start_interactive(&mut self, id: NodeId) -> PanDisposition {
        if self.active.is_some() {
            log::debug!("interactive dismissal of {id:?} not started: transition running");
            return PanDisposition::Ignored;
        }
        let Some(node) = self.registry.get_mut(id) else {
            return PanDisposition::Ignored;
        };
        node.interaction.begin();
        if self.begin_dismissal(id, true, true) {
            PanDisposition::Dismissing
        } else {
            PanDisposition::Ignored
        }
    }

    fn apply_progress(&mut self, id: NodeId, presented: &ScreenRef, update: ProgressUpdate, available_height: f32) {
        let Some(node) = self.registry.get_mut(id) else {
            return;
        };
        if let Some(p) = node.interaction.update(update.progress.percent) {
            if let Some(ctx) = self.active.as_mut().filter(|c| c.node() == id) {
                ctx.update(&mut self.views, p);
                presented.notify(|h| h.on_dismissal_tick(p));
            }
        }

        if update.raw >= 0.0 {
            let thresholds = self.registry.config().gestures;
            let percent = update.progress.percent;
            self.with_phase(id, |c, cx, _| c.interactive_status_bar(cx, percent, available_height, &thresholds));
        }

        if let Some(s) = update.stretch {
            let offset = self.geometry.stretch_offset(s.start_y, s.y);
            self.views.set_transform(presented.view(), Transform3d::translate(0.0, offset));
        }
    }

    fn release_drag(&mut self, id: NodeId, presented: &ScreenRef, out: EndOutcome) -> PanDisposition {
        if out.synthesize_begin {
            self.start_interactive(id);
        }

        if let Some(node) = self.registry.get_mut(id) {
            if node.interaction.interaction_in_progress() {
                let speed = if out.should_complete {
                    node.interaction.finish()
                } else {
                    node.interaction.cancel()
                };
                if let (Some(speed), Some(ctx)) = (speed, self.active.as_mut().filter(|c| c.node() == id)) {
                    if out.should_complete {
                        ctx.finish(speed);
                    } else {
                        ctx.cancel(speed);
                    }
                }
                let committed = out.should_complete;
                self.with_phase(id, |c, cx, _| c.finish_status_bar(cx, committed));
            }
        }

        if out.unstretch {
            let view = presented.view();
            let to = ViewProps::new().transform(Transform3d::IDENTITY);
            if let Some(anim) = PropertyAnimation::capture(&self.views, view, to) {
                self.animator.stop_view(view);
                let duration = self.registry.config().metrics.unstretch();
                self.animator.start(anim, duration, Curve::Spring { damping: 1.0 });
            }
        }

        if out.owned {
            PanDisposition::Dismissing
        } else {
            PanDisposition::Yielded
        }
    }

    // ── time ──────────────────────────────────────────────────────────────

    /// Advances animations, the running transition and delayed work by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.now += dt;
        self.animator.tick(&mut self.views, dt);
        self.advance_active(dt);
        for id in self.delays.drain_due(self.now) {
            self.fire_delayed(id);
        }
    }

    fn advance_active(&mut self, dt: Duration) {
        let Some(ctx) = self.active.as_mut() else {
            return;
        };
        let result = ctx.tick(&mut self.views, dt);
        let (id, kind, fraction) = (ctx.node(), ctx.kind(), ctx.fraction());

        // Scrubbed contexts report progress from the pan handler.
        if let Some(node) = self.registry.get(id).filter(|_| !ctx.is_interactive()) {
            let presented = node.presented();
            match kind {
                TransitionKind::Presentation => presented.notify(|h| h.on_presentation_tick(fraction)),
                TransitionKind::Dismissal => presented.notify(|h| h.on_dismissal_tick(fraction)),
            }
        }

        let Some(completed) = result else {
            return;
        };
        if let Some(ctx) = self.active.take() {
            self.finish_transition(ctx, completed);
        }
    }

    fn finish_transition(&mut self, ctx: TransitionContext, completed: bool) {
        let id = ctx.node();
        let Some(node) = self.registry.get(id) else {
            return;
        };
        let presented = node.presented().clone();
        let completed = self.transition_animator.complete(&mut self.views, &ctx, presented.view()) && completed;

        match ctx.kind() {
            TransitionKind::Presentation => {
                self.with_phase(id, |c, cx, depth| c.did_present(cx, completed, depth));
                self.events.push(DrawerEvent::PresentationEnded { node: id, completed });
                if completed {
                    self.events.push(DrawerEvent::DepthChanged(self.registry.depth()));
                } else {
                    self.teardown(id);
                }
            }
            TransitionKind::Dismissal => {
                let (animated, interactive) = (ctx.is_animated(), ctx.began_interactively());
                self.with_phase(id, |c, cx, depth| c.did_dismiss(cx, completed, animated, interactive, depth));
                self.events.push(DrawerEvent::DismissalEnded { node: id, completed });
                if completed {
                    self.events.push(DrawerEvent::DepthChanged(self.registry.depth()));
                    self.teardown(id);
                }
            }
        }
        log::debug!("{:?} of {id:?} finished (completed: {completed})", ctx.kind());

        if let Some(size) = self.pending_resize.take() {
            self.apply_resize(size);
        }
    }

    fn teardown(&mut self, id: NodeId) {
        let Some(node) = self.registry.remove(id) else {
            return;
        };
        let presented = node.presented().view();
        self.views.remove_from_parent(presented);
        self.views.destroy(node.container());
        log::debug!("{} torn down", node.presented().name());
    }

    fn fire_delayed(&mut self, id: NodeId) {
        let Some(node) = self.registry.get_mut(id) else {
            self.events.push(DrawerEvent::DelayedAnimationSkipped { node: id });
            return;
        };
        let live = matches!(node.coordinator.phase(), NodePhase::WillPresent | NodePhase::Presented);
        let token = node.coordinator.delayed_token().cloned();
        let Some(token) = token.filter(|_| live) else {
            self.events.push(DrawerEvent::DelayedAnimationSkipped { node: id });
            return;
        };
        node.coordinator.mark_delayed_fired();

        let anims = node
            .presented()
            .dismissable()
            .map(|d| d.presentation_animation(&self.views))
            .unwrap_or_default();
        let duration = self.registry.config().metrics.presentation_animation();
        for anim in anims {
            self.animator
                .start_with(anim, Duration::ZERO, duration, Curve::Spring { damping: 0.8 }, Some(token.clone()));
        }
        log::debug!("delayed presentation animation fired for {id:?}");
        self.events.push(DrawerEvent::DelayedAnimationFired { node: id });
    }

    // ── layout ────────────────────────────────────────────────────────────

    /// Changes the window size, deferring the relayout while a transition runs.
    pub fn resize(&mut self, size: Viewport) -> bool {
        if !size.is_valid() {
            log::warn!("ignoring invalid window size {}x{}", size.width, size.height);
            return false;
        }
        if self.active.is_some() {
            log::debug!("resize to {}x{} deferred until the transition ends", size.width, size.height);
            self.pending_resize = Some(size);
            self.events.push(DrawerEvent::ResizeDeferred(size));
            return false;
        }
        self.apply_resize(size);
        true
    }

    fn apply_resize(&mut self, size: Viewport) {
        self.geometry.container = size;
        let bounds = size.bounds();
        self.views.set_frame(self.window, bounds);
        self.views.set_frame(self.holder, bounds);
        if self.registry.is_empty() {
            let root = self.registry.root().view();
            self.views.set_frame(root, bounds);
        }
        // Bottom-up, so each node's presenter ends with the receded state and
        // its grandpresenter with the extra offset.
        for id in self.registry.order().to_vec() {
            self.with_phase(id, |c, cx, _| c.container_did_resize(cx));
        }
        log::info!("window resized to {}x{}", size.width, size.height);
    }

    /// Re-applies the presented frame and corner radius of `id`.
    ///
    /// Ignored while a transition runs.
    pub fn preferred_content_size_changed(&mut self, id: NodeId) -> bool {
        if self.active.is_some() {
            return false;
        }
        let Some(anim) = self.with_phase(id, |c, cx, _| c.preferred_content_size_changed(cx)).flatten() else {
            return false;
        };
        let view = anim.view;
        self.animator.stop_view(view);
        let duration = self.registry.config().metrics.corner_animation();
        self.animator.start(anim, duration, Curve::EaseInOut);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use drawer_engine::coords::Rect;

    use super::*;
    use crate::geometry::ChainRole;
    use crate::screen::{NestedScrollable, Screen, ScrollDismissable, StatusBarFlag};
    use crate::scroll::ScrollState;

    const EPS: f32 = 1e-3;

    struct Sheet;
    impl ScrollDismissable for Sheet {}

    /// Keeps its ancestors' proxies for as long as it is presented.
    struct Backed;
    impl ScrollDismissable for Backed {
        fn uses_backing_snapshots(&self) -> bool {
            true
        }
    }

    /// A list at rest with a pull-to-refresh indicator.
    struct RefreshList {
        scroll: Rc<ScrollState>,
    }

    impl ScrollDismissable for RefreshList {
        fn nested_scrollable(&self) -> Option<Rc<dyn NestedScrollable>> {
            Some(self.scroll.clone())
        }

        fn scroll_top_offset(&self) -> f32 {
            84.0
        }

        fn has_refresh_indicator(&self) -> bool {
            true
        }
    }

    /// Fades its own view to half alpha shortly after appearing.
    struct Fading {
        view: ViewId,
    }

    impl ScrollDismissable for Fading {
        fn presentation_animation(&self, views: &ViewTree) -> Vec<PropertyAnimation> {
            PropertyAnimation::capture(views, self.view, ViewProps::new().alpha(0.5))
                .into_iter()
                .collect()
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn window() -> Viewport {
        Viewport::new(390.0, 844.0)
    }

    fn stack_with(config: DrawerConfig) -> DrawerStack {
        let mut views = ViewTree::new();
        let root = Screen::new("root", views.create(Rect::default()))
            .with_status_bar(Rc::new(StatusBarFlag::new(false)))
            .into_ref();
        DrawerStack::new(views, root, window(), config)
    }

    fn stack() -> DrawerStack {
        stack_with(DrawerConfig::default())
    }

    fn sheet(stack: &mut DrawerStack, name: &str) -> ScreenRef {
        Screen::new(name, stack.views_mut().create(Rect::default()))
            .with_dismissable(Rc::new(Sheet))
            .with_status_bar(Rc::new(StatusBarFlag::new(false)))
            .into_ref()
    }

    fn fading(stack: &mut DrawerStack, name: &str) -> ScreenRef {
        let view = stack.views_mut().create(Rect::default());
        Screen::new(name, view).with_dismissable(Rc::new(Fading { view })).into_ref()
    }

    fn settle(stack: &mut DrawerStack) {
        for _ in 0..120 {
            stack.tick(ms(16));
        }
    }

    fn transform_of(stack: &DrawerStack, view: ViewId) -> Transform3d {
        stack.views().transform(view).unwrap_or(Transform3d::IDENTITY)
    }

    fn assert_transform(stack: &DrawerStack, view: ViewId, expected: Transform3d) {
        let actual = transform_of(stack, view);
        assert!(actual.approx_eq(&expected, EPS), "{actual:?} != {expected:?}");
    }

    fn pan(phase: PanPhase, ty: f32, vy: f32) -> PanSample {
        let start = Vec2::new(195.0, 300.0);
        let translation = Vec2::new(0.0, ty);
        PanSample {
            phase,
            start,
            location: start + translation,
            translation,
            velocity: Vec2::new(0.0, vy),
            timestamp: Duration::ZERO,
        }
    }

    /// Drags the top card by `ty` and releases it with `vy`.
    fn drag_and_release(stack: &mut DrawerStack, id: NodeId, ty: f32, vy: f32) {
        assert_eq!(stack.handle_pan(id, GestureKind::FreePan, &pan(PanPhase::Began, 0.0, 100.0)), PanDisposition::Dismissing);
        stack.handle_pan(id, GestureKind::FreePan, &pan(PanPhase::Changed, ty, vy));
        stack.handle_pan(id, GestureKind::FreePan, &pan(PanPhase::Ended, ty, vy));
    }

    fn available(stack: &DrawerStack) -> f32 {
        let g = stack.geometry();
        g.available_height(g.presented_frame(false).height())
    }

    // ── presentation ─────────────────────────────────────────────────────

    #[test]
    fn presented_card_rests_at_its_frame_and_root_recedes() {
        let mut s = stack();
        let a = sheet(&mut s, "a");
        let id = s.present(a.clone(), true).unwrap();
        assert!(s.is_transitioning());
        assert_eq!(s.depth(), 0);
        settle(&mut s);

        assert!(!s.is_transitioning());
        assert_eq!(s.depth(), 1);
        assert_eq!(s.phase(id), Some(NodePhase::Presented));
        assert_eq!(s.views().frame(a.view()), Some(s.geometry().presented_frame(false)));
        let root = s.registry().root().view();
        let receded = s.geometry().scale_transform(ChainRole::Root, false, true);
        assert_transform(&s, root, receded);
        assert!(s.status_bar_light());

        let events = s.take_events();
        assert!(events.contains(&DrawerEvent::PresentationEnded { node: id, completed: true }));
        assert!(events.contains(&DrawerEvent::DepthChanged(1)));
    }

    #[test]
    fn chain_transforms_follow_depth() {
        let mut s = stack();
        let root = s.registry().root().view();
        let (a, b, c) = (sheet(&mut s, "a"), sheet(&mut s, "b"), sheet(&mut s, "c"));
        let g = *s.geometry();

        s.present(a.clone(), true);
        settle(&mut s);
        assert_transform(&s, root, g.scale_transform(ChainRole::Root, false, true));

        s.present(b.clone(), true);
        settle(&mut s);
        assert_eq!(s.depth(), 2);
        assert_transform(&s, a.view(), g.scale_transform(ChainRole::Card, false, true));
        assert_transform(&s, root, g.grand_transform(ChainRole::Root, false, true));

        s.present(c, true);
        settle(&mut s);
        assert_eq!(s.depth(), 3);
        assert_transform(&s, b.view(), g.scale_transform(ChainRole::Card, false, true));
        assert_transform(&s, a.view(), g.grand_transform(ChainRole::Card, false, true));
    }

    #[test]
    fn presenter_and_proxy_move_together_mid_transition() {
        let mut s = stack();
        let a = sheet(&mut s, "a");
        let id = s.present(a, true).unwrap();
        s.tick(ms(100));
        s.tick(ms(100));

        let root = s.registry().root().view();
        let proxy = s.node(id).and_then(|n| n.coordinator.snapshots().presenter_proxy()).unwrap();
        let mid = transform_of(&s, root);
        assert!(!mid.is_identity());
        assert_transform(&s, proxy, mid);
    }

    #[test]
    fn second_request_during_transition_is_rejected() {
        let mut s = stack();
        let (a, b) = (sheet(&mut s, "a"), sheet(&mut s, "b"));
        s.present(a, true).unwrap();
        assert!(s.present(b, true).is_none());
        assert!(!s.dismiss_top(true));
        let rejected = s
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, DrawerEvent::RequestRejected { .. }))
            .count();
        assert_eq!(rejected, 2);
    }

    #[test]
    fn same_screen_cannot_be_presented_twice() {
        let mut s = stack();
        let a = sheet(&mut s, "a");
        s.present(a.clone(), false).unwrap();
        assert!(s.present(a, false).is_none());
        assert_eq!(s.depth(), 1);
    }

    #[test]
    fn backing_chain_keeps_root_parked_until_last_dismissal() {
        let mut s = stack();
        let g = *s.geometry();
        let root = s.registry().root().clone();
        let window = s.window();
        assert_eq!(s.views().index_in_parent(root.view()), Some(0));

        let a = Screen::new("a", s.views_mut().create(Rect::default()))
            .with_dismissable(Rc::new(Backed))
            .into_ref();
        let b = Screen::new("b", s.views_mut().create(Rect::default()))
            .with_dismissable(Rc::new(Backed))
            .into_ref();

        // One level: the root stays parked behind its proxy.
        s.present(a.clone(), true).unwrap();
        settle(&mut s);
        assert_eq!(s.views().parent(root.view()), Some(s.holder()));
        let root_proxy = s.registry().proxy_for(root.id()).unwrap();
        assert_eq!(s.views().parent(root_proxy), Some(window));
        assert_eq!(s.views().index_in_parent(root_proxy), Some(0));
        assert_transform(&s, root_proxy, g.scale_transform(ChainRole::Root, false, true));
        let a_parent = s.views().parent(a.view()).unwrap();
        let a_index = s.views().index_in_parent(a.view()).unwrap();

        // Two levels: the root's proxy follows the grandpresenter transform.
        s.present(b, true).unwrap();
        s.tick(ms(100));
        s.tick(ms(100));
        let mid = transform_of(&s, root.view());
        assert_transform(&s, root_proxy, mid);
        settle(&mut s);
        assert_eq!(s.depth(), 2);
        assert_eq!(s.views().parent(a.view()), Some(s.holder()));
        assert_eq!(s.registry().proxy_for(root.id()), Some(root_proxy));
        assert_transform(&s, root_proxy, g.grand_transform(ChainRole::Root, false, true));

        // Back to one level: the card returns, the root stays parked.
        assert!(s.dismiss_top(true));
        settle(&mut s);
        assert_eq!(s.depth(), 1);
        assert_eq!(s.views().parent(a.view()), Some(a_parent));
        assert_eq!(s.views().index_in_parent(a.view()), Some(a_index));
        assert_eq!(s.views().parent(root.view()), Some(s.holder()));
        assert_transform(&s, root_proxy, g.scale_transform(ChainRole::Root, false, true));

        // Empty stack: the real root is back at its original index.
        assert!(s.dismiss_top(true));
        settle(&mut s);
        assert_eq!(s.depth(), 0);
        assert_eq!(s.views().parent(root.view()), Some(window));
        assert_eq!(s.views().index_in_parent(root.view()), Some(0));
        assert!(!s.views().is_alive(root_proxy));
        assert_eq!(s.registry().proxy_for(root.id()), None);
        assert_transform(&s, root.view(), Transform3d::IDENTITY);
    }

    // ── dismissal ────────────────────────────────────────────────────────

    #[test]
    fn programmatic_dismissal_restores_presenter() {
        let mut s = stack();
        let a = sheet(&mut s, "a");
        let id = s.present(a.clone(), true).unwrap();
        settle(&mut s);
        assert!(s.dismiss(id, true));
        settle(&mut s);

        assert_eq!(s.depth(), 0);
        assert!(s.node(id).is_none());
        assert!(s.views().parent(a.view()).is_none());
        let root = s.registry().root().view();
        assert_transform(&s, root, Transform3d::IDENTITY);
        assert_eq!(s.views().corner_radius(root), Some(0.0));
        assert!(!s.status_bar_light());
    }

    #[test]
    fn only_the_top_node_is_dismissable() {
        let mut s = stack();
        let (a, b) = (sheet(&mut s, "a"), sheet(&mut s, "b"));
        let first = s.present(a, false).unwrap();
        s.present(b, false).unwrap();
        assert!(!s.dismiss(first, true));
        assert_eq!(s.depth(), 2);
    }

    #[test]
    fn non_animated_round_trip_is_immediate() {
        let mut s = stack();
        let a = sheet(&mut s, "a");
        let root = s.registry().root().view();
        let id = s.present(a, false).unwrap();
        assert_eq!(s.depth(), 1);
        assert!(!s.is_transitioning());
        assert_transform(&s, root, s.geometry().scale_transform(ChainRole::Root, false, true));

        assert!(s.dismiss(id, false));
        assert_eq!(s.depth(), 0);
        assert!(!s.is_transitioning());
        assert_transform(&s, root, Transform3d::IDENTITY);
    }

    #[test]
    fn dimming_tap_dismisses_top() {
        let mut s = stack();
        let a = sheet(&mut s, "a");
        let id = s.present(a, true).unwrap();
        settle(&mut s);

        assert!(!s.tap(Vec2::new(195.0, 400.0)));
        assert!(s.tap(Vec2::new(195.0, 20.0)));
        assert_eq!(s.phase(id), Some(NodePhase::WillDismiss));
        settle(&mut s);
        assert_eq!(s.depth(), 0);
    }

    // ── interactive dismissal ────────────────────────────────────────────

    #[test]
    fn cancelled_drag_then_dismissal_nets_zero_depth() {
        let mut s = stack();
        let a = sheet(&mut s, "a");
        let root = s.registry().root().view();
        let id = s.present(a, true).unwrap();
        settle(&mut s);

        drag_and_release(&mut s, id, 40.0, -50.0);
        settle(&mut s);
        assert_eq!(s.depth(), 1);
        assert_eq!(s.phase(id), Some(NodePhase::Presented));
        assert_transform(&s, root, s.geometry().scale_transform(ChainRole::Root, false, true));
        assert!(s.take_events().contains(&DrawerEvent::DismissalEnded { node: id, completed: false }));

        assert!(s.dismiss(id, true));
        settle(&mut s);
        assert_eq!(s.depth(), 0);
        assert_transform(&s, root, Transform3d::IDENTITY);
    }

    #[test]
    fn drag_scrubs_the_transition() {
        let mut s = stack();
        let a = sheet(&mut s, "a");
        let id = s.present(a.clone(), true).unwrap();
        settle(&mut s);
        let rest = s.views().frame(a.view()).unwrap().origin.y;

        s.handle_pan(id, GestureKind::FreePan, &pan(PanPhase::Began, 0.0, 100.0));
        s.handle_pan(id, GestureKind::FreePan, &pan(PanPhase::Changed, available(&s) * 0.25, 100.0));
        let ctx = s.active_transition().unwrap();
        assert!(ctx.is_interactive());
        assert!((ctx.fraction() - 0.25).abs() < EPS);
        assert!(s.views().frame(a.view()).unwrap().origin.y > rest);
    }

    #[test]
    fn half_way_release_completes() {
        let mut s = stack();
        let a = sheet(&mut s, "a");
        let id = s.present(a, true).unwrap();
        settle(&mut s);
        let half = available(&s) * 0.5;
        drag_and_release(&mut s, id, half, 0.0);
        settle(&mut s);
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn release_velocity_decides_short_drags() {
        let mut s = stack();
        let a = sheet(&mut s, "a");
        let id = s.present(a, true).unwrap();
        settle(&mut s);
        let tenth = available(&s) * 0.1;

        drag_and_release(&mut s, id, tenth, 400.0);
        settle(&mut s);
        assert_eq!(s.depth(), 1);

        drag_and_release(&mut s, id, tenth, 700.0);
        settle(&mut s);
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn gesture_on_buried_node_is_ignored() {
        let mut s = stack();
        let (a, b) = (sheet(&mut s, "a"), sheet(&mut s, "b"));
        let first = s.present(a, false).unwrap();
        s.present(b, false).unwrap();
        let d = s.handle_pan(first, GestureKind::FreePan, &pan(PanPhase::Began, 0.0, 100.0));
        assert_eq!(d, PanDisposition::Ignored);
        assert!(!s.is_transitioning());
    }

    #[test]
    fn upward_drag_stretches_then_springs_back() {
        let mut s = stack();
        let a = sheet(&mut s, "a");
        let id = s.present(a.clone(), true).unwrap();
        settle(&mut s);

        s.handle_pan(id, GestureKind::FreePan, &pan(PanPhase::Began, 0.0, -100.0));
        s.handle_pan(id, GestureKind::FreePan, &pan(PanPhase::Changed, -60.0, -100.0));
        assert!(transform_of(&s, a.view()).translation().y < 0.0);

        s.handle_pan(id, GestureKind::FreePan, &pan(PanPhase::Ended, -60.0, 0.0));
        settle(&mut s);
        assert_eq!(s.depth(), 1);
        assert_transform(&s, a.view(), Transform3d::IDENTITY);
    }

    #[test]
    fn hard_flick_on_refresh_list_dismisses_on_release() {
        let mut s = stack();
        let list = RefreshList {
            scroll: Rc::new(ScrollState::new(Rect::new(0.0, 0.0, 390.0, 780.0), 2000.0).top_inset(84.0)),
        };
        let card = Screen::new("list", s.views_mut().create(Rect::default()))
            .with_dismissable(Rc::new(list))
            .into_ref();
        let id = s.present(card, true).unwrap();
        settle(&mut s);
        s.take_events();

        // The refresh indicator keeps the touch at first.
        assert_eq!(s.handle_pan(id, GestureKind::FreePan, &pan(PanPhase::Began, 10.0, 300.0)), PanDisposition::Yielded);
        assert!(!s.is_transitioning());

        assert_eq!(
            s.handle_pan(id, GestureKind::FreePan, &pan(PanPhase::Ended, 90.0, 2000.0)),
            PanDisposition::Dismissing
        );
        assert!(s.is_transitioning());
        settle(&mut s);

        assert_eq!(s.depth(), 0);
        assert!(s.node(id).is_none());
        let events = s.take_events();
        assert!(events.contains(&DrawerEvent::DismissalBegan { node: id, interactive: true }));
        assert!(events.contains(&DrawerEvent::DismissalEnded { node: id, completed: true }));
    }

    // ── delayed animation ────────────────────────────────────────────────

    #[test]
    fn delayed_animation_runs_after_presentation_starts() {
        let mut s = stack();
        let f = fading(&mut s, "f");
        let id = s.present(f.clone(), true).unwrap();
        settle(&mut s);

        assert!(s.take_events().contains(&DrawerEvent::DelayedAnimationFired { node: id }));
        let alpha = s.views().alpha(f.view()).unwrap();
        assert!((alpha - 0.5).abs() < EPS);
    }

    #[test]
    fn dismissal_before_delay_skips_the_animation() {
        let mut config = DrawerConfig::default();
        config.metrics.presentation_delay_ms = 5_000;
        let mut s = stack_with(config);
        let f = fading(&mut s, "f");
        let id = s.present(f.clone(), true).unwrap();
        settle(&mut s);
        assert!(s.dismiss(id, true));
        for _ in 0..400 {
            s.tick(ms(16));
        }

        let events = s.take_events();
        assert!(events.contains(&DrawerEvent::DelayedAnimationSkipped { node: id }));
        assert!(!events.iter().any(|e| matches!(e, DrawerEvent::DelayedAnimationFired { .. })));
        assert_eq!(s.views().alpha(f.view()), Some(1.0));
    }

    // ── layout ───────────────────────────────────────────────────────────

    #[test]
    fn resize_mid_transition_is_deferred() {
        let mut s = stack();
        let a = sheet(&mut s, "a");
        s.present(a.clone(), true).unwrap();
        let landscape = Viewport::new(844.0, 390.0);
        assert!(!s.resize(landscape));
        assert_eq!(s.geometry().container, window());
        assert!(s.take_events().contains(&DrawerEvent::ResizeDeferred(landscape)));

        settle(&mut s);
        assert_eq!(s.geometry().container, landscape);
        let g = *s.geometry();
        assert_eq!(s.views().frame(a.view()), Some(g.presented_frame(false)));
        let root = s.registry().root().view();
        assert_eq!(s.views().frame(root), Some(landscape.bounds()));
        assert_transform(&s, root, g.scale_transform(ChainRole::Root, false, true));
    }

    #[test]
    fn resize_when_idle_applies_at_once() {
        let mut s = stack();
        let root = s.registry().root().view();
        assert!(s.resize(Viewport::new(500.0, 900.0)));
        assert_eq!(s.views().frame(root), Some(Rect::new(0.0, 0.0, 500.0, 900.0)));
        assert!(!s.resize(Viewport::new(0.0, 900.0)));
    }

    #[test]
    fn content_size_change_animates_back_to_rest() {
        let mut s = stack();
        let a = sheet(&mut s, "a");
        let id = s.present(a.clone(), true).unwrap();
        settle(&mut s);
        let rest = s.geometry().presented_frame(false);
        s.views_mut().set_frame(a.view(), rest.with_height(300.0));

        assert!(s.preferred_content_size_changed(id));
        settle(&mut s);
        assert_eq!(s.views().frame(a.view()), Some(rest));
    }
}

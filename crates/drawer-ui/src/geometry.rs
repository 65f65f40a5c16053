//! Pure layout math for drawer presentations.
//!
//! Everything here is a function of the container size, the metrics and the
//! role a screen plays in the chain; nothing reads or writes views.

use drawer_engine::coords::{Rect, Vec2, Viewport};
use drawer_engine::transform::Transform3d;

use crate::config::DrawerMetrics;

/// z scale used for receding screens in 3D mode.
const DEPTH_Z_SCALE: f32 = 1.00001;

/// How a screen sits in the presentation chain.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ChainRole {
    /// The window's base screen.
    Root,
    /// A presented inset card.
    Card,
    /// A presented screen covering the whole window.
    FullScreenCard,
}

/// Which transition a corner radius is requested for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RadiusState {
    Presenting,
    Dismissing,
}

/// Container regions mirrored by the edge proxies.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EdgeRegions {
    pub left: Rect,
    pub right: Rect,
    pub lower: Rect,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeometryModel {
    pub container: Viewport,
    pub metrics: DrawerMetrics,
    pub use_3d: bool,
}

impl GeometryModel {
    pub fn new(container: Viewport, metrics: DrawerMetrics, use_3d: bool) -> Self {
        Self { container, metrics, use_3d }
    }

    /// Top edge of a receded screen.
    #[inline]
    pub fn new_origin(&self) -> f32 {
        self.metrics.status_bar_height + self.metrics.origin_padding
    }

    #[inline]
    pub fn width_ratio(&self) -> f32 {
        let w = self.container.width;
        if w <= 0.0 {
            return 1.0;
        }
        ((w - self.metrics.side_margin) / w).max(0.0)
    }

    /// Frame of a presented screen at rest.
    ///
    /// Cards start below the status bar; both kinds extend past the bottom
    /// edge by the overshoot plus the corner radius.
    pub fn presented_frame(&self, full_screen: bool) -> Rect {
        let m = &self.metrics;
        let h = self.container.height;
        let top = if full_screen { 0.0 } else { m.status_bar_height + 20.0 };
        Rect::new(0.0, top, self.container.width, h - top + m.bottom_overshoot + m.corner_radius)
    }

    /// Frame a presented screen animates from and to: just below the window.
    pub fn offscreen_frame(&self, full_screen: bool) -> Rect {
        let f = self.presented_frame(full_screen);
        f.with_origin(Vec2::new(f.origin.x, self.container.height))
    }

    /// Drag distance that maps to full dismissal progress.
    pub fn available_height(&self, presented_height: f32) -> f32 {
        (presented_height - self.metrics.bottom_overshoot - self.metrics.corner_radius).max(1.0)
    }

    /// Transform of a screen receding behind a new presentation.
    ///
    /// Identity when `completed` is false. `presented_full_screen` describes
    /// the screen being presented on top, whose frame height drives the
    /// vertical centering of a receding card.
    pub fn scale_transform(&self, role: ChainRole, presented_full_screen: bool, completed: bool) -> Transform3d {
        if !completed {
            return Transform3d::IDENTITY;
        }
        let z = if self.use_3d { DEPTH_Z_SCALE } else { 1.0 };

        let t = match role {
            ChainRole::Card => {
                let ratio = self.width_ratio();
                let height = self.presented_frame(presented_full_screen).height();
                let translation = (height - height * ratio) / 2.0;
                Transform3d::translate(0.0, -translation - self.metrics.origin_padding)
                    .then(Transform3d::from_scale(ratio, ratio, z))
            }
            ChainRole::Root | ChainRole::FullScreenCard => {
                let extra = if role == ChainRole::Root { 0.0 } else { self.metrics.full_screen_extra };
                let h = self.container.height + extra;
                let sy = if h > 0.0 { (h - self.new_origin() * 2.0) / h } else { 1.0 };
                Transform3d::from_scale(self.width_ratio(), sy, z)
            }
        };

        if self.use_3d { t } else { t.flattened() }
    }

    /// Receded transform plus the grandpresenter's extra downward shift.
    pub fn grand_transform(&self, role: ChainRole, presented_full_screen: bool, with_offset: bool) -> Transform3d {
        let base = self.scale_transform(role, presented_full_screen, true);
        if with_offset {
            base.then(Transform3d::translate(0.0, self.metrics.grand_parent_offset))
        } else {
            base
        }
    }

    pub fn corner_radius(&self, state: RadiusState, completed: bool) -> f32 {
        let rounded = match state {
            RadiusState::Presenting => completed,
            RadiusState::Dismissing => !completed,
        };
        if rounded { self.metrics.corner_radius } else { 0.0 }
    }

    /// Dimming overlay frame: the header band while presented, the whole
    /// container otherwise.
    pub fn dimming_frame(&self, presented: bool) -> Rect {
        let bounds = self.container.bounds();
        if presented {
            let m = &self.metrics;
            bounds.with_height(m.status_bar_height + m.corner_radius + m.origin_padding)
        } else {
            bounds
        }
    }

    /// Strips of the presenter left uncovered by the receding transforms.
    pub fn edge_regions(&self, presenter_is_root: bool) -> EdgeRegions {
        let w = self.container.width;
        let h = self.container.height;
        let side = ((1.0 - self.width_ratio()) * w) / 2.0;
        let top = if presenter_is_root { self.metrics.status_bar_height + 20.0 } else { 0.0 };
        let lower = self.lower_edge_height();
        EdgeRegions {
            left: Rect::new(0.0, top, side, h - top),
            right: Rect::new(w - side, top, side, h - top),
            lower: Rect::new(0.0, h - lower, w, lower),
        }
    }

    /// Height of the strip a receded root leaves at the bottom.
    pub fn lower_edge_height(&self) -> f32 {
        let h = self.container.height;
        if h <= 0.0 {
            return 0.0;
        }
        let y_ratio = (h - 2.0 * self.new_origin()) / h;
        ((1.0 - y_ratio) * h) / 2.0
    }

    /// Upward rubber-band offset for a drag from `start_y` to `y` (window
    /// coordinates). Zero for downward drags.
    pub fn stretch_offset(&self, start_y: f32, y: f32) -> f32 {
        if start_y <= 0.0 {
            return 0.0;
        }
        let p = ((start_y - y) / start_y).clamp(0.0, 1.0);
        self.metrics.stretch_limit * p * (p - 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn model() -> GeometryModel {
        GeometryModel::new(Viewport::new(400.0, 800.0), DrawerMetrics::default(), false)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn card_frame_starts_below_status_bar_and_overshoots() {
        let f = model().presented_frame(false);
        assert_eq!(f.origin.y, 64.0);
        assert_eq!(f.height(), 800.0 - 64.0 + 20.0 + 18.0);
    }

    #[test]
    fn full_screen_frame_starts_at_top() {
        let f = model().presented_frame(true);
        assert_eq!(f.origin.y, 0.0);
        assert_eq!(f.height(), 838.0);
        assert_eq!(model().offscreen_frame(true).origin.y, 800.0);
    }

    #[test]
    fn available_height_excludes_overshoot_and_radius() {
        let g = model();
        let h = g.presented_frame(false).height();
        assert_eq!(g.available_height(h), 800.0 - 64.0);
    }

    // ── transforms ────────────────────────────────────────────────────────

    #[test]
    fn incomplete_transform_is_identity() {
        let g = model();
        for role in [ChainRole::Root, ChainRole::Card, ChainRole::FullScreenCard] {
            assert!(g.scale_transform(role, false, false).is_identity());
        }
    }

    #[test]
    fn root_recedes_into_new_origin_gap() {
        let g = model();
        let t = g.scale_transform(ChainRole::Root, false, true);
        assert!(close(t.scale_x(), 368.0 / 400.0));
        assert!(close(t.scale_y(), (800.0 - 108.0) / 800.0));
        assert_eq!(t.translation(), Vec2::zero());
    }

    #[test]
    fn full_screen_card_uses_extra_height() {
        let t = model().scale_transform(ChainRole::FullScreenCard, false, true);
        assert!(close(t.scale_y(), (836.0 - 108.0) / 836.0));
    }

    #[test]
    fn card_scales_uniformly_and_shifts_up() {
        let g = model();
        let t = g.scale_transform(ChainRole::Card, false, true);
        let ratio = 368.0 / 400.0;
        let height = g.presented_frame(false).height();
        let translation = (height - height * ratio) / 2.0;
        assert!(close(t.scale_x(), ratio));
        assert!(close(t.scale_y(), ratio));
        assert!(close(t.translation().y, ratio * (-translation - 10.0)));
    }

    #[test]
    fn grand_offset_is_added_after_scaling() {
        let g = model();
        let plain = g.grand_transform(ChainRole::Root, false, false);
        let shifted = g.grand_transform(ChainRole::Root, false, true);
        assert!(close(shifted.translation().y - plain.translation().y, 10.0));
        assert!(close(shifted.scale_y(), plain.scale_y()));
    }

    #[test]
    fn three_d_mode_keeps_depth_scale() {
        let mut g = model();
        g.use_3d = true;
        let t = g.scale_transform(ChainRole::Root, false, true);
        assert!(close(t.cols[2][2], DEPTH_Z_SCALE));
        assert_eq!(model().scale_transform(ChainRole::Root, false, true).cols[2][2], 1.0);
    }

    // ── radii ─────────────────────────────────────────────────────────────

    #[test]
    fn corner_radius_table() {
        let g = model();
        assert_eq!(g.corner_radius(RadiusState::Presenting, true), 18.0);
        assert_eq!(g.corner_radius(RadiusState::Presenting, false), 0.0);
        assert_eq!(g.corner_radius(RadiusState::Dismissing, true), 0.0);
        assert_eq!(g.corner_radius(RadiusState::Dismissing, false), 18.0);
    }

    // ── proxies and overlay ───────────────────────────────────────────────

    #[test]
    fn edge_regions_match_receded_margins() {
        let g = model();
        let e = g.edge_regions(true);
        let expected = [(e.left, Rect::new(0.0, 64.0, 16.0, 736.0)), (e.right, Rect::new(384.0, 64.0, 16.0, 736.0))];
        for (got, want) in expected {
            assert!(close(got.origin.x, want.origin.x) && close(got.origin.y, want.origin.y), "{got:?}");
            assert!(close(got.width(), want.width()) && close(got.height(), want.height()), "{got:?}");
        }
        assert!(close(e.lower.height(), g.new_origin()));
        assert!(close(e.lower.origin.y, 800.0 - 54.0));
    }

    #[test]
    fn dimming_band_height() {
        assert_eq!(model().dimming_frame(true).height(), 44.0 + 18.0 + 10.0);
        assert_eq!(model().dimming_frame(false).height(), 800.0);
    }

    #[test]
    fn stretch_is_upward_and_bounded() {
        let g = model();
        assert_eq!(g.stretch_offset(400.0, 500.0), 0.0);
        assert!(close(g.stretch_offset(400.0, 0.0), -20.0));
        let half = g.stretch_offset(400.0, 200.0);
        assert!(close(half, 20.0 * 0.5 * -1.5));
        assert_eq!(g.stretch_offset(0.0, -10.0), 0.0);
    }
}

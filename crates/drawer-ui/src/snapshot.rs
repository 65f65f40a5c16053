//! Ephemeral proxies of the presenter.
//!
//! While a presentation transition runs, the presenter's real view is parked
//! in an offscreen holder and a full-size proxy takes its exact place in the
//! hierarchy. Three edge proxies cover the strips the receding transform
//! uncovers. [`SnapshotSet`] owns all four; replacing a slot destroys the
//! old proxy immediately.

use drawer_engine::transform::Transform3d;
use drawer_engine::view::{ViewId, ViewTree};

use crate::geometry::GeometryModel;

/// Where the presenter's real view lived before it was parked.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Substitution {
    pub true_view: ViewId,
    pub parent: ViewId,
    pub index: usize,
}

/// Inputs for capturing or refreshing proxies.
pub struct CaptureTarget {
    /// Container the presented view lives in; edge proxies go here.
    pub container: Option<ViewId>,
    /// The presenter's real view.
    pub presenter: Option<ViewId>,
    /// Offscreen parking spot for the real view.
    pub holder: ViewId,
    pub presenter_is_root: bool,
}

#[derive(Debug, Default)]
pub struct SnapshotSet {
    presenter_proxy: Option<ViewId>,
    left_edge: Option<ViewId>,
    right_edge: Option<ViewId>,
    lower_edge: Option<ViewId>,
    substitution: Option<Substitution>,
}

impl SnapshotSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_captured(&self) -> bool {
        self.presenter_proxy.is_some()
    }

    pub fn presenter_proxy(&self) -> Option<ViewId> {
        self.presenter_proxy
    }

    pub fn left_edge(&self) -> Option<ViewId> {
        self.left_edge
    }

    pub fn right_edge(&self) -> Option<ViewId> {
        self.right_edge
    }

    pub fn lower_edge(&self) -> Option<ViewId> {
        self.lower_edge
    }

    pub fn substitution(&self) -> Option<Substitution> {
        self.substitution
    }

    /// Left and right proxies, which recede together with the presenter.
    pub fn side_edges(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.left_edge.into_iter().chain(self.right_edge)
    }

    pub fn is_empty(&self) -> bool {
        self.presenter_proxy.is_none()
            && self.left_edge.is_none()
            && self.right_edge.is_none()
            && self.lower_edge.is_none()
    }

    /// Parks the presenter's view and substitutes a proxy, then creates the
    /// edge proxies in their start position.
    ///
    /// No-op (returns `false`) when the container or presenter is missing or
    /// the set is already captured.
    pub fn capture_for_presentation_start(
        &mut self,
        views: &mut ViewTree,
        geometry: &GeometryModel,
        target: &CaptureTarget,
    ) -> bool {
        let (Some(container), Some(presenter)) = (target.container, target.presenter) else {
            log::debug!("snapshot capture skipped: no container or presenter");
            return false;
        };
        if self.is_captured() {
            log::debug!("snapshot capture skipped: already captured");
            return false;
        }
        if !views.is_alive(container) {
            return false;
        }
        let (Some(parent), Some(index)) = (views.parent(presenter), views.index_in_parent(presenter)) else {
            log::debug!("snapshot capture skipped: presenter {presenter:?} is detached");
            return false;
        };
        let Some(proxy) = views.snapshot(presenter, None) else {
            return false;
        };

        if let Some(src) = views.get(presenter) {
            let (transform, radius, clips) = (src.transform, src.corner_radius, src.clips_to_bounds);
            views.set_transform(proxy, transform);
            views.set_corner_radius(proxy, radius);
            views.set_clips_to_bounds(proxy, clips);
        }
        views.insert_child(parent, proxy, index);
        views.add_child(target.holder, presenter);

        self.presenter_proxy = Some(proxy);
        self.substitution = Some(Substitution { true_view: presenter, parent, index });
        log::debug!("presenter {presenter:?} substituted by {proxy:?} at {parent:?}[{index}]");

        self.refresh(views, geometry, target, true);
        true
    }

    /// Recreates the edge proxies, destroying the previous ones.
    ///
    /// With `for_start` the new proxies are placed off-screen on top of the
    /// container, ready to animate in; otherwise they are inserted at rest
    /// just below the container's topmost child.
    pub fn refresh(&mut self, views: &mut ViewTree, geometry: &GeometryModel, target: &CaptureTarget, for_start: bool) {
        let Some(container) = target.container else {
            return;
        };
        let source = self
            .substitution
            .map(|s| s.true_view)
            .or(target.presenter);
        let Some(source) = source else {
            return;
        };

        let regions = geometry.edge_regions(target.presenter_is_root);
        let radius = geometry.metrics.corner_radius;
        let h = geometry.container.height;
        let lower_h = regions.lower.height();

        let specs = [
            (regions.left, radius, Transform3d::translate(0.0, h)),
            (regions.right, radius, Transform3d::translate(0.0, h)),
            (regions.lower, 0.0, Transform3d::translate(0.0, lower_h)),
        ];

        let mut made = [None; 3];
        for (slot, (region, corner, start)) in made.iter_mut().zip(specs) {
            let Some(proxy) = views.snapshot(source, Some(region)) else {
                continue;
            };
            views.set_frame(proxy, region);
            views.set_corner_radius(proxy, corner);
            views.set_clips_to_bounds(proxy, corner > 0.0);
            if for_start {
                views.set_transform(proxy, start);
                views.add_child(container, proxy);
            } else {
                let below_top = views.children(container).len().saturating_sub(1);
                views.insert_child(container, proxy, below_top);
            }
            *slot = Some(proxy);
        }

        let [left, right, lower] = made;
        replace(views, &mut self.left_edge, left);
        replace(views, &mut self.right_edge, right);
        replace(views, &mut self.lower_edge, lower);
    }

    /// Puts the presenter's real view back where it was and drops every proxy.
    ///
    /// The proxy's current transform and corner radius carry over to the real view.
    pub fn release(&mut self, views: &mut ViewTree) {
        if let Some(sub) = self.substitution.take() {
            let carried = self
                .presenter_proxy
                .and_then(|p| views.get(p))
                .map(|p| (p.transform, p.corner_radius));

            replace(views, &mut self.presenter_proxy, None);

            if views.is_alive(sub.parent) {
                views.insert_child(sub.parent, sub.true_view, sub.index);
            } else {
                log::warn!("presenter parent {:?} is gone; leaving {:?} parked", sub.parent, sub.true_view);
            }
            if let Some((transform, radius)) = carried {
                views.set_transform(sub.true_view, transform);
                views.set_corner_radius(sub.true_view, radius);
            }
        }
        replace(views, &mut self.presenter_proxy, None);
        replace(views, &mut self.left_edge, None);
        replace(views, &mut self.right_edge, None);
        replace(views, &mut self.lower_edge, None);
    }

    /// Hides the edge proxies without releasing them.
    pub fn hide_edges(&self, views: &mut ViewTree) {
        for id in self.left_edge.into_iter().chain(self.right_edge).chain(self.lower_edge) {
            views.set_hidden(id, true);
        }
    }
}

fn replace(views: &mut ViewTree, slot: &mut Option<ViewId>, next: Option<ViewId>) {
    if let Some(old) = std::mem::replace(slot, next) {
        views.destroy(old);
    }
}

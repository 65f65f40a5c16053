use crate::coords::Rect;
use crate::transform::Transform3d;
use crate::view::{ViewId, ViewTree};

/// Masked set of animatable view properties. `None` fields are left alone.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ViewProps {
    pub frame: Option<Rect>,
    pub transform: Option<Transform3d>,
    pub alpha: Option<f32>,
    pub corner_radius: Option<f32>,
}

impl ViewProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(mut self, v: Rect) -> Self {
        self.frame = Some(v);
        self
    }

    pub fn transform(mut self, v: Transform3d) -> Self {
        self.transform = Some(v);
        self
    }

    pub fn alpha(mut self, v: f32) -> Self {
        self.alpha = Some(v);
        self
    }

    pub fn corner_radius(mut self, v: f32) -> Self {
        self.corner_radius = Some(v);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_none()
            && self.transform.is_none()
            && self.alpha.is_none()
            && self.corner_radius.is_none()
    }

    /// Reads the current values of `view` for the fields set in `mask`.
    pub fn read(views: &ViewTree, view: ViewId, mask: &ViewProps) -> Option<ViewProps> {
        let node = views.get(view)?;
        Some(ViewProps {
            frame: mask.frame.map(|_| node.frame),
            transform: mask.transform.map(|_| node.transform),
            alpha: mask.alpha.map(|_| node.alpha),
            corner_radius: mask.corner_radius.map(|_| node.corner_radius),
        })
    }

    /// Writes the set fields onto `view`.
    pub fn write(&self, views: &mut ViewTree, view: ViewId) -> bool {
        let Some(node) = views.get_mut(view) else {
            return false;
        };
        if let Some(f) = self.frame {
            node.frame = f;
        }
        if let Some(t) = self.transform {
            node.transform = t;
        }
        if let Some(a) = self.alpha {
            node.alpha = a.clamp(0.0, 1.0);
        }
        if let Some(r) = self.corner_radius {
            node.corner_radius = r.max(0.0);
        }
        true
    }
}

/// Interpolation of one view between two property sets.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAnimation {
    pub view: ViewId,
    pub from: ViewProps,
    pub to: ViewProps,
}

impl PropertyAnimation {
    /// Animates `view` from its current state to `to`.
    ///
    /// Returns `None` if the view is dead or `to` sets nothing.
    pub fn capture(views: &ViewTree, view: ViewId, to: ViewProps) -> Option<Self> {
        if to.is_empty() {
            return None;
        }
        let from = ViewProps::read(views, view, &to)?;
        Some(Self { view, from, to })
    }

    /// Explicit start state; the view is not touched until `apply`.
    pub fn between(view: ViewId, from: ViewProps, to: ViewProps) -> Self {
        Self { view, from, to }
    }

    /// Interpolated properties at eased fraction `t` (may overshoot `[0, 1]`).
    pub fn sample(&self, t: f32) -> ViewProps {
        fn mix(a: Option<f32>, b: Option<f32>, t: f32) -> Option<f32> {
            match (a, b) {
                (Some(a), Some(b)) => Some(a + (b - a) * t),
                (_, b) => b,
            }
        }

        ViewProps {
            frame: match (self.from.frame, self.to.frame) {
                (Some(a), Some(b)) => Some(a.lerp(b, t)),
                (_, b) => b,
            },
            transform: match (self.from.transform, self.to.transform) {
                (Some(a), Some(b)) => Some(a.lerp(&b, t)),
                (_, b) => b,
            },
            alpha: mix(self.from.alpha, self.to.alpha, t),
            corner_radius: mix(self.from.corner_radius, self.to.corner_radius, t),
        }
    }

    pub fn apply(&self, views: &mut ViewTree, t: f32) -> bool {
        self.sample(t).write(views, self.view)
    }

    /// Same animation played backwards.
    pub fn reversed(&self) -> Self {
        Self {
            view: self.view,
            from: self.to,
            to: self.from,
        }
    }
}

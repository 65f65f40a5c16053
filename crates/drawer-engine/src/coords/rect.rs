use super::Vec2;

/// Axis-aligned rectangle in logical points (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(size: Vec2) -> Self {
        Self { origin: Vec2::zero(), size }
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        p.x >= self.origin.x
            && p.y >= self.origin.y
            && p.x < (self.origin.x + self.size.x)
            && p.y < (self.origin.y + self.size.y)
    }

    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let x0 = self.origin.x.max(other.origin.x);
        let y0 = self.origin.y.max(other.origin.y);
        let x1 = (self.origin.x + self.size.x).min(other.origin.x + other.size.x);
        let y1 = (self.origin.y + self.size.y).min(other.origin.y + other.size.y);

        let w = x1 - x0;
        let h = y1 - y0;

        if w <= 0.0 || h <= 0.0 {
            None
        } else {
            Some(Rect::new(x0, y0, w, h))
        }
    }

    #[inline]
    pub fn with_height(self, h: f32) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.size.x, h)
    }

    #[inline]
    pub fn with_origin(self, origin: Vec2) -> Rect {
        Rect::from_origin_size(origin, self.size)
    }

    #[inline]
    pub fn translated(self, delta: Vec2) -> Rect {
        Rect::from_origin_size(self.origin + delta, self.size)
    }

    /// Component-wise interpolation of origin and size.
    #[inline]
    pub fn lerp(self, to: Rect, t: f32) -> Rect {
        Rect::from_origin_size(self.origin.lerp(to.origin, t), self.size.lerp(to.size, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_interior_point() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn contains_bottom_right_exclusive() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(0.0, 0.0)));
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(10.0, 10.0)));
    }

    // ── intersect ─────────────────────────────────────────────────────────

    #[test]
    fn intersect_overlapping() {
        let i = r(0.0, 0.0, 10.0, 10.0).intersect(r(5.0, 5.0, 10.0, 10.0));
        assert_eq!(i, Some(r(5.0, 5.0, 5.0, 5.0)));
    }

    #[test]
    fn intersect_touching_edge_returns_none() {
        assert!(r(0.0, 0.0, 10.0, 10.0).intersect(r(10.0, 0.0, 10.0, 10.0)).is_none());
    }

    // ── derived rects ─────────────────────────────────────────────────────

    #[test]
    fn with_height_keeps_origin() {
        assert_eq!(r(1.0, 2.0, 3.0, 4.0).with_height(9.0), r(1.0, 2.0, 3.0, 9.0));
    }

    #[test]
    fn lerp_halfway() {
        let a = r(0.0, 0.0, 10.0, 10.0);
        let b = r(10.0, 20.0, 30.0, 10.0);
        assert_eq!(a.lerp(b, 0.5), r(5.0, 10.0, 20.0, 10.0));
    }

    #[test]
    fn translated_moves_origin_only() {
        let t = r(0.0, 0.0, 4.0, 4.0).translated(Vec2::new(2.0, -1.0));
        assert_eq!(t, r(2.0, -1.0, 4.0, 4.0));
    }
}

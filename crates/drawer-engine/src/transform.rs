//! Minimal column-major 4×4 transform applied to views.
//!
//! Covers the subset the presentation layer needs: identity, translation,
//! scale, concatenation and interpolation. Views carry a single local
//! transform applied about the centre of their frame.

use core::ops::Mul;

use crate::coords::Vec2;

/// A column-major 4×4 affine transform stored as `[[f32; 4]; 4]`.
///
/// Each inner array is one *column* `[x, y, z, w]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    pub cols: [[f32; 4]; 4],
}

impl Transform3d {
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f32, sy: f32, sz: f32) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// 2D translation.
    #[inline]
    #[must_use]
    pub const fn translate(x: f32, y: f32) -> Self {
        Self::from_translation(x, y, 0.0)
    }

    /// 2D scale.
    #[inline]
    #[must_use]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self::from_scale(sx, sy, 1.0)
    }

    /// Returns a transform applying `self` first, then `next`.
    #[inline]
    #[must_use]
    pub fn then(self, next: Transform3d) -> Self {
        next * self
    }

    #[inline]
    pub fn scale_x(&self) -> f32 {
        self.cols[0][0]
    }

    #[inline]
    pub fn scale_y(&self) -> f32 {
        self.cols[1][1]
    }

    #[inline]
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.cols[3][0], self.cols[3][1])
    }

    /// Drops the z scale so the transform acts as a plain 2D affine one.
    #[must_use]
    pub fn flattened(mut self) -> Self {
        self.cols[2] = [0.0, 0.0, 1.0, 0.0];
        self.cols[0][2] = 0.0;
        self.cols[1][2] = 0.0;
        self.cols[3][2] = 0.0;
        self
    }

    /// Maps a 2D point (z = 0) through the transform.
    pub fn apply(&self, p: Vec2) -> Vec2 {
        let c = &self.cols;
        let x = c[0][0] * p.x + c[1][0] * p.y + c[3][0];
        let y = c[0][1] * p.x + c[1][1] * p.y + c[3][1];
        let w = c[0][3] * p.x + c[1][3] * p.y + c[3][3];
        if w != 0.0 && w != 1.0 {
            Vec2::new(x / w, y / w)
        } else {
            Vec2::new(x, y)
        }
    }

    /// Element-wise interpolation.
    ///
    /// Exact for the scale/translate transforms views are animated between.
    pub fn lerp(&self, to: &Transform3d, t: f32) -> Self {
        let mut out = *self;
        for (col, to_col) in out.cols.iter_mut().zip(to.cols.iter()) {
            for (v, to_v) in col.iter_mut().zip(to_col.iter()) {
                *v += (to_v - *v) * t;
            }
        }
        out
    }

    pub fn approx_eq(&self, other: &Transform3d, eps: f32) -> bool {
        self.cols
            .iter()
            .flatten()
            .zip(other.cols.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Self::IDENTITY, 1e-6)
    }
}

impl Default for Transform3d {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    /// `a * b` applies `b` first, then `a`.
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut cols = [[0.0_f32; 4]; 4];
        for (j, col) in cols.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self { cols }
    }
}

// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local transform parameters and their composition into an [`Affine`].
//!
//! A node's local transform is described by five independent parameters:
//! position, scale, rotation, skew and pivot. [`TransformParams::to_affine`]
//! composes them as
//!
//! ```text
//!   a = cos(rotation + skew.y) * scale.x
//!   b = sin(rotation + skew.y) * scale.x
//!   c = -sin(rotation - skew.x) * scale.y
//!   d = cos(rotation - skew.x) * scale.y
//!   tx = position.x - (pivot.x * a + pivot.y * c)
//!   ty = position.y - (pivot.x * b + pivot.y * d)
//! ```
//!
//! which matches `kurbo`'s `[a, b, c, d, e, f]` coefficient order.

use kurbo::{Affine, Point, Vec2};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Tolerance used when deciding whether a decomposed matrix is a pure
/// rotation or carries skew.
const DECOMPOSE_EPSILON: f64 = 1e-5;

/// The independently settable parameters of a local transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformParams {
    /// Translation applied last.
    pub position: Point,
    /// Per-axis scale.
    pub scale: Vec2,
    /// Rotation in radians.
    pub rotation: f64,
    /// Skew in radians (x skews the y axis, y skews the x axis).
    pub skew: Vec2,
    /// Point in local space that lands on `position`.
    pub pivot: Point,
}

impl TransformParams {
    /// The identity parameters.
    pub const IDENTITY: Self = Self {
        position: Point::ORIGIN,
        scale: Vec2::new(1.0, 1.0),
        rotation: 0.0,
        skew: Vec2::ZERO,
        pivot: Point::ORIGIN,
    };

    /// Composes the parameters into an affine matrix.
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        let (sx, cx) = sin_cos(self.rotation + self.skew.y);
        let (sy, cy) = sin_cos(self.rotation - self.skew.x);
        let a = cx * self.scale.x;
        let b = sx * self.scale.x;
        let c = -sy * self.scale.y;
        let d = cy * self.scale.y;
        let tx = self.position.x - (self.pivot.x * a + self.pivot.y * c);
        let ty = self.position.y - (self.pivot.x * b + self.pivot.y * d);
        Affine::new([a, b, c, d, tx, ty])
    }

    /// Decomposes `matrix` into parameters, keeping the current pivot.
    ///
    /// Rotation and skew are ambiguous for a general affine matrix; when the
    /// two skew angles agree the result is expressed as a pure rotation.
    #[must_use]
    pub fn from_affine(matrix: Affine, pivot: Point) -> Self {
        let [a, b, c, d, tx, ty] = matrix.as_coeffs();
        let skew_x = -(-c).atan2(d);
        let skew_y = b.atan2(a);
        let delta = (skew_x + skew_y).abs();

        let (rotation, skew) = if delta < DECOMPOSE_EPSILON
            || (core::f64::consts::TAU - delta).abs() < DECOMPOSE_EPSILON
        {
            (skew_y, Vec2::ZERO)
        } else {
            (0.0, Vec2::new(skew_x, skew_y))
        };

        Self {
            position: Point::new(
                tx + (pivot.x * a + pivot.y * c),
                ty + (pivot.x * b + pivot.y * d),
            ),
            scale: Vec2::new((a * a + b * b).sqrt(), (c * c + d * d).sqrt()),
            rotation,
            skew,
            pivot,
        }
    }
}

impl Default for TransformParams {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[inline]
fn sin_cos(radians: f64) -> (f64, f64) {
    #[cfg(feature = "std")]
    let (s, c) = radians.sin_cos();
    #[cfg(not(feature = "std"))]
    let (s, c) = (radians.sin(), radians.cos());
    (s, c)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_affine_eq(a: Affine, b: Affine) {
        let (ca, cb) = (a.as_coeffs(), b.as_coeffs());
        for i in 0..6 {
            assert!(
                (ca[i] - cb[i]).abs() < EPS,
                "coefficient {i} differs: {ca:?} vs {cb:?}"
            );
        }
    }

    #[test]
    fn default_is_identity() {
        assert_affine_eq(TransformParams::default().to_affine(), Affine::IDENTITY);
    }

    #[test]
    fn position_is_translation() {
        let params = TransformParams {
            position: Point::new(10.0, 20.0),
            ..TransformParams::IDENTITY
        };
        assert_affine_eq(params.to_affine(), Affine::translate((10.0, 20.0)));
    }

    #[test]
    fn pivot_is_subtracted_after_scale() {
        let params = TransformParams {
            position: Point::new(50.0, 50.0),
            scale: Vec2::new(2.0, 2.0),
            pivot: Point::new(10.0, 5.0),
            ..TransformParams::IDENTITY
        };
        let m = params.to_affine();
        // The pivot lands on the position.
        let p = m * Point::new(10.0, 5.0);
        assert!((p.x - 50.0).abs() < EPS && (p.y - 50.0).abs() < EPS, "got {p:?}");
        assert_affine_eq(
            m,
            Affine::translate((50.0, 50.0))
                * Affine::scale(2.0)
                * Affine::translate((-10.0, -5.0)),
        );
    }

    #[test]
    fn rotation_matches_kurbo() {
        let params = TransformParams {
            rotation: core::f64::consts::FRAC_PI_3,
            ..TransformParams::IDENTITY
        };
        assert_affine_eq(
            params.to_affine(),
            Affine::rotate(core::f64::consts::FRAC_PI_3),
        );
    }

    #[test]
    fn decompose_round_trips_rotation_and_scale() {
        let params = TransformParams {
            position: Point::new(3.0, -4.0),
            scale: Vec2::new(2.0, 0.5),
            rotation: 0.7,
            skew: Vec2::ZERO,
            pivot: Point::new(1.0, 1.0),
        };
        let back = TransformParams::from_affine(params.to_affine(), params.pivot);
        assert_affine_eq(back.to_affine(), params.to_affine());
        assert!((back.rotation - 0.7).abs() < EPS);
        assert_eq!(back.skew, Vec2::ZERO);
    }

    #[test]
    fn decompose_keeps_skew() {
        let params = TransformParams {
            skew: Vec2::new(0.2, 0.1),
            ..TransformParams::IDENTITY
        };
        let back = TransformParams::from_affine(params.to_affine(), Point::ORIGIN);
        assert_affine_eq(back.to_affine(), params.to_affine());
    }
}

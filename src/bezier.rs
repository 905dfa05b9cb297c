// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bézier curves of arbitrary degree, in matrix (power basis) form.

use smallvec::SmallVec;

use crate::common::binomial;
use crate::{MeasureError, ParamCurve, ParamCurveArclen, ParamCurveDeriv, Point, Vec2};

/// Inline capacity for control polygons. Measurements rarely exceed it.
const INLINE_POINTS: usize = 8;

/// A single Bézier curve of degree `n - 1`, where `n` is the number of
/// control points.
///
/// The Bernstein form is converted once to the power basis:
/// `B(t) = [1, t, t², …, tᵏ] · C · P`, where `C` is the signed
/// Pascal-triangle matrix returned by [`bernstein_matrix`]. Evaluation is then
/// Horner's rule on the `k + 1` coefficients `C · P`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BezierCurve {
    points: SmallVec<[Point; INLINE_POINTS]>,
    coeffs: SmallVec<[Vec2; INLINE_POINTS]>,
}

/// The `(k + 1) × (k + 1)` Bernstein-to-power change of basis, row major.
///
/// `C[i][j] = (-1)^(i - j) · binom(k, i) · binom(i, j)` for `j ≤ i`, and zero
/// above the diagonal.
pub fn bernstein_matrix(degree: usize) -> Vec<f64> {
    let n = degree + 1;
    let mut m = vec![0.0; n * n];
    for i in 0..n {
        let row_scale = binomial(degree, i);
        for j in 0..=i {
            let sign = if (i - j) % 2 == 0 { 1.0 } else { -1.0 };
            m[i * n + j] = sign * row_scale * binomial(i, j);
        }
    }
    m
}

impl BezierCurve {
    /// Create a curve from its control points.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::DegenerateCurve`] if `points` is empty.
    pub fn new(points: impl IntoIterator<Item = Point>) -> Result<BezierCurve, MeasureError> {
        let points: SmallVec<[Point; INLINE_POINTS]> = points.into_iter().collect();
        if points.is_empty() {
            return Err(MeasureError::DegenerateCurve("no control points"));
        }
        Ok(BezierCurve::from_control_points(points))
    }

    /// Power basis coefficients for a non-empty control polygon.
    fn from_control_points(points: SmallVec<[Point; INLINE_POINTS]>) -> BezierCurve {
        let n = points.len();
        let m = bernstein_matrix(n - 1);
        let coeffs = (0..n)
            .map(|i| {
                (0..=i)
                    .map(|j| m[i * n + j] * points[j].to_vec2())
                    .sum::<Vec2>()
            })
            .collect();
        BezierCurve { points, coeffs }
    }

    /// The control points, in insertion order.
    #[inline]
    pub fn control_points(&self) -> &[Point] {
        &self.points
    }

    /// The polynomial degree, one less than the number of control points.
    #[inline]
    pub fn degree(&self) -> usize {
        self.points.len() - 1
    }

    /// Evaluate the curve at every parameter in `ts`.
    pub fn eval_many(&self, ts: &[f64]) -> Vec<Point> {
        ts.iter().map(|&t| self.eval(t)).collect()
    }

    /// `n` points at uniformly spaced parameters, endpoints included.
    ///
    /// This is the polyline a front end draws for the fitted curve.
    pub fn sample(&self, n: usize) -> Vec<Point> {
        match n {
            0 => Vec::new(),
            1 => vec![self.start()],
            _ => {
                let step = ((n - 1) as f64).recip();
                (0..n).map(|i| self.eval(i as f64 * step)).collect()
            }
        }
    }

    /// Magnitude of the first derivative at `t`.
    #[inline]
    pub fn speed(&self, t: f64) -> f64 {
        self.deriv().eval(t).to_vec2().hypot()
    }
}

impl ParamCurve for BezierCurve {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        let mut iter = self.coeffs.iter().rev();
        let mut acc = iter.next().copied().unwrap_or(Vec2::ZERO);
        for &c in iter {
            acc = acc * t + c;
        }
        acc.to_point()
    }

    #[inline]
    fn start(&self) -> Point {
        self.points[0]
    }

    #[inline]
    fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }
}

impl ParamCurveDeriv for BezierCurve {
    type DerivResult = BezierCurve;

    /// The hodograph: control points `k · (P[i+1] - P[i])`, degree `k - 1`.
    ///
    /// The derivative of a single point is the zero vector.
    fn deriv(&self) -> BezierCurve {
        let k = self.degree() as f64;
        let points: SmallVec<[Point; INLINE_POINTS]> = if self.points.len() < 2 {
            SmallVec::from_elem(Point::ZERO, 1)
        } else {
            self.points
                .windows(2)
                .map(|w| (k * (w[1] - w[0])).to_point())
                .collect()
        };
        BezierCurve::from_control_points(points)
    }
}

impl ParamCurveArclen for BezierCurve {
    fn arclen_range(&self, start: f64, end: f64) -> f64 {
        crate::integrate_speed(&self.deriv(), start, end)
    }
}

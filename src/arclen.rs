// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arc length by Gauss-Legendre quadrature, and the fitted length curve that
//! caches it.

use log::debug;

use crate::common::GAUSS_LEGENDRE_COEFFS_24;
use crate::{BezierCurve, MeasureError, ParamCurve, ParamCurveArclen, ParamCurveDeriv, Point, Vec2};

/// Integrate the speed of a curve over `[start, end]`, given its derivative.
///
/// This is fixed order (24 point) Gauss-Legendre quadrature of `‖deriv(t)‖`,
/// rescaled from `[-1, 1]`. The nodes never change, so repeated calls are
/// reproducible; there is no adaptive refinement.
pub fn integrate_speed(deriv: &impl ParamCurve, start: f64, end: f64) -> f64 {
    let half = 0.5 * (end - start);
    let mid = 0.5 * (end + start);
    let sum: f64 = GAUSS_LEGENDRE_COEFFS_24
        .iter()
        .map(|&(wi, xi)| wi * deriv.eval(half * xi + mid).to_vec2().hypot())
        .sum();
    half * sum
}

/// A Bézier curve fitted through the vertices of a length measurement.
///
/// Owns the curve together with its hodograph and total arc length. The
/// caches are only ever rebuilt as a unit, by [`FittedCurve::fit`] or
/// [`FittedCurve::set_control_points`], so they can't go stale.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FittedCurve {
    curve: BezierCurve,
    hodograph: BezierCurve,
    total: f64,
}

impl FittedCurve {
    /// Fit a curve whose control polygon is `points`.
    ///
    /// Consecutive duplicate points (a click that did not move the rubber
    /// band) are collapsed first.
    ///
    /// # Errors
    ///
    /// [`MeasureError::DegenerateCurve`] if fewer than two distinct points
    /// remain, or if the resulting curve has no positive, finite length.
    pub fn fit(points: &[Point]) -> Result<FittedCurve, MeasureError> {
        let mut control: Vec<Point> = Vec::with_capacity(points.len());
        for &p in points {
            if !p.is_finite() {
                return Err(MeasureError::DegenerateCurve("non-finite control point"));
            }
            if control.last() != Some(&p) {
                control.push(p);
            }
        }
        if control.len() < 2 {
            return Err(MeasureError::DegenerateCurve(
                "fewer than 2 distinct control points",
            ));
        }
        let curve = BezierCurve::new(control)?;
        let hodograph = curve.deriv();
        let total = integrate_speed(&hodograph, 0.0, 1.0);
        if !(total > 0.0 && total.is_finite()) {
            return Err(MeasureError::DegenerateCurve("curve has zero length"));
        }
        debug!(
            "fitted degree {} curve, arc length {total:.3}px",
            curve.degree()
        );
        Ok(FittedCurve {
            curve,
            hodograph,
            total,
        })
    }

    /// Replace the control polygon, recomputing every cached quantity.
    ///
    /// On error `self` is left unchanged.
    ///
    /// # Errors
    ///
    /// As for [`FittedCurve::fit`].
    pub fn set_control_points(&mut self, points: &[Point]) -> Result<(), MeasureError> {
        *self = FittedCurve::fit(points)?;
        Ok(())
    }

    /// The underlying Bézier curve.
    #[inline]
    pub fn curve(&self) -> &BezierCurve {
        &self.curve
    }

    /// The derivative curve, one degree lower.
    #[inline]
    pub fn hodograph(&self) -> &BezierCurve {
        &self.hodograph
    }

    /// The control points the curve was fitted with, duplicates removed.
    #[inline]
    pub fn control_points(&self) -> &[Point] {
        self.curve.control_points()
    }

    /// The tangent vector at `t`. Its length is the curve speed.
    #[inline]
    pub fn tangent(&self, t: f64) -> Vec2 {
        self.hodograph.eval(t).to_vec2()
    }

    /// The unit normal at `t`, the tangent turned by 90 degrees.
    ///
    /// `None` where the curve has no usable tangent: where the speed is
    /// below `sqrt(EPSILON)` times the total length, the direction is
    /// dominated by rounding.
    pub fn normal(&self, t: f64) -> Option<Vec2> {
        let tangent = self.tangent(t);
        let speed = tangent.hypot();
        (speed > f64::EPSILON.sqrt() * self.total && speed.is_finite())
            .then(|| (tangent / speed).turn_90())
    }
}

impl ParamCurve for FittedCurve {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        self.curve.eval(t)
    }

    #[inline]
    fn start(&self) -> Point {
        self.curve.start()
    }

    #[inline]
    fn end(&self) -> Point {
        self.curve.end()
    }
}

impl ParamCurveArclen for FittedCurve {
    /// The cached total, computed once when the curve was fitted.
    #[inline]
    fn arclen(&self) -> f64 {
        self.total
    }

    #[inline]
    fn arclen_range(&self, start: f64, end: f64) -> f64 {
        integrate_speed(&self.hodograph, start, end)
    }
}

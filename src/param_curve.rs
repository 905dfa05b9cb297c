// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Traits for curves parametrized by a scalar.

use crate::Point;

/// The default tolerance, in parameter space, for arc length inversion.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// The default iteration cap for arc length inversion.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// A curve parametrized by a scalar.
///
/// If the result is interpreted as a point, this represents a curve.
/// But the result can be interpreted as a vector as well, which is how the
/// hodograph of a Bézier curve is evaluated.
pub trait ParamCurve: Sized {
    /// Evaluate the curve at parameter `t`.
    ///
    /// Generally `t` is in the range [0..1].
    fn eval(&self, t: f64) -> Point;

    /// The start point.
    fn start(&self) -> Point {
        self.eval(0.0)
    }

    /// The end point.
    fn end(&self) -> Point {
        self.eval(1.0)
    }
}

/// A differentiable parametrized curve.
pub trait ParamCurveDeriv {
    /// The parametric curve obtained by taking the derivative of this one.
    type DerivResult: ParamCurve;

    /// The derivative of the curve.
    ///
    /// Note that the type of the return value is somewhat inaccurate, as
    /// the derivative of a curve (mapping of param to point) is a mapping
    /// of param to vector. We choose to accept this rather than have a
    /// more complex type scheme.
    fn deriv(&self) -> Self::DerivResult;
}

/// A parametrized curve that can have its arc length measured.
pub trait ParamCurveArclen: ParamCurve {
    /// The arc length of the whole curve.
    fn arclen(&self) -> f64 {
        self.arclen_range(0.0, 1.0)
    }

    /// The arc length between parameters `start` and `end`.
    ///
    /// Negative when `end < start`.
    fn arclen_range(&self, start: f64, end: f64) -> f64;

    /// Solve for the parameter that has the given arclength from the start.
    ///
    /// Returns `None` for a curve of zero length, or when the solver does
    /// not converge within [`DEFAULT_MAX_ITERATIONS`].
    fn inv_arclen(&self, arclen: f64) -> Option<f64> {
        let total = self.arclen();
        if !(total > 0.0) {
            return None;
        }
        crate::solve_arclen_fraction(
            self,
            total,
            arclen / total,
            DEFAULT_TOLERANCE,
            DEFAULT_MAX_ITERATIONS,
        )
        .ok()
    }
}

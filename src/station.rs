// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Equal arc length stations along a fitted curve.

use crate::{FittedCurve, MeasureError, ParamCurve, ParamCurveArclen, Point, Vec2};

/// A curve location selected for width sampling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Station {
    /// Zero-based position in the profile.
    pub index: usize,
    /// Curve parameter, strictly inside `(0, 1)`.
    pub t: f64,
    /// The point on the curve.
    pub point: Point,
    /// Unit normal to the curve at `point`.
    pub normal: Vec2,
    /// Arc length from the curve start to `point`, as a fraction of the total.
    pub fraction: f64,
}

impl Station {
    /// Position along the curve as a percentage of its length.
    #[inline]
    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }
}

/// Find the parameter at which `fraction` of `curve`'s arc length has been
/// covered.
///
/// Solves `arclen(0, t) / total - fraction = 0` for `t ∈ [0, 1]` with the ITP
/// bracketed method. `total` is passed in because callers usually have it
/// cached. Fractions at or outside the ends clamp to `0` or `1`.
///
/// # Errors
///
/// - [`MeasureError::DegenerateCurve`] if `total` is not positive and finite.
/// - [`MeasureError::InvalidOption`] if `tolerance` is not positive and
///   finite.
/// - [`MeasureError::ConvergenceFailure`] if the bracket hasn't shrunk to
///   `tolerance` after `max_iterations` evaluations.
pub fn solve_arclen_fraction(
    curve: &impl ParamCurveArclen,
    total: f64,
    fraction: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<f64, MeasureError> {
    if !(total > 0.0 && total.is_finite()) {
        return Err(MeasureError::DegenerateCurve("curve has zero length"));
    }
    if !(tolerance > 0.0 && tolerance.is_finite()) {
        return Err(MeasureError::InvalidOption(
            "station tolerance must be positive and finite",
        ));
    }
    if fraction <= 0.0 {
        return Ok(0.0);
    }
    if fraction >= 1.0 {
        return Ok(1.0);
    }
    crate::common::solve_itp(
        |t| curve.arclen_range(0.0, t) / total - fraction,
        0.0,
        1.0,
        tolerance,
        1,
        0.2,
        -fraction,
        curve.arclen_range(0.0, 1.0) / total - fraction,
        max_iterations,
    )
    .ok_or(MeasureError::ConvergenceFailure {
        iterations: max_iterations,
    })
}

/// Place `count` stations at equal arc length spacing, endpoints excluded.
///
/// Station `i` (one-based) sits at `i / (count + 1)` of the curve length.
///
/// # Errors
///
/// As for [`solve_arclen_fraction`]; additionally
/// [`MeasureError::DegenerateCurve`] if the curve has no tangent at one of
/// the stations.
pub fn solve_stations(
    curve: &FittedCurve,
    count: usize,
    tolerance: f64,
    max_iterations: usize,
) -> Result<Vec<Station>, MeasureError> {
    let total = curve.arclen();
    let spacing = ((count + 1) as f64).recip();
    (0..count)
        .map(|index| {
            let fraction = (index + 1) as f64 * spacing;
            let t = solve_arclen_fraction(curve, total, fraction, tolerance, max_iterations)?;
            let normal = curve
                .normal(t)
                .ok_or(MeasureError::DegenerateCurve("zero tangent at station"))?;
            Ok(Station {
                index,
                t,
                point: curve.eval(t),
                normal,
                fraction,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{
        solve_arclen_fraction, solve_stations, FittedCurve, Line, MeasureError,
        ParamCurveArclen, Point,
    };

    fn wiggle() -> FittedCurve {
        FittedCurve::fit(&[
            Point::new(100.0, 500.0),
            Point::new(300.0, 200.0),
            Point::new(600.0, 900.0),
            Point::new(900.0, 450.0),
            Point::new(1200.0, 520.0),
        ])
        .unwrap()
    }

    #[test]
    fn stations_are_equally_spaced() {
        let c = wiggle();
        let n = 9;
        let stations = solve_stations(&c, n, 1e-9, 100).unwrap();
        assert_eq!(stations.len(), n);
        for (i, s) in stations.iter().enumerate() {
            let expected = (i + 1) as f64 / (n + 1) as f64;
            let actual = c.arclen_range(0.0, s.t) / c.arclen();
            assert!((actual - expected).abs() < 1e-3, "station {i}: {actual} vs {expected}");
            assert_eq!(s.index, i);
            assert!(s.t > 0.0 && s.t < 1.0);
        }
        for pair in stations.windows(2) {
            assert!(pair[0].t < pair[1].t);
        }
    }

    #[test]
    fn percent_labels() {
        let stations = solve_stations(&wiggle(), 4, 1e-9, 100).unwrap();
        let percents: Vec<f64> = stations.iter().map(|s| s.percent()).collect();
        for (p, e) in percents.iter().zip([20.0, 40.0, 60.0, 80.0]) {
            assert!((p - e).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_stations() {
        assert!(solve_stations(&wiggle(), 0, 1e-9, 100).unwrap().is_empty());
    }

    #[test]
    fn degenerate_total() {
        let l = Line::degenerate((3.0, 3.0));
        assert!(matches!(
            solve_arclen_fraction(&l, 0.0, 0.5, 1e-9, 100),
            Err(MeasureError::DegenerateCurve(_))
        ));
    }

    #[test]
    fn iteration_cap() {
        let c = wiggle();
        assert_eq!(
            solve_arclen_fraction(&c, c.arclen(), 0.37, 1e-12, 2),
            Err(MeasureError::ConvergenceFailure { iterations: 2 })
        );
    }

    #[test]
    fn tolerance_must_be_positive() {
        let c = wiggle();
        for tolerance in [0.0, -1e-9, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                solve_arclen_fraction(&c, c.arclen(), 0.5, tolerance, 100),
                Err(MeasureError::InvalidOption(_))
            ));
        }
        assert!(solve_stations(&c, 3, 0.0, 100).is_err());
    }

    #[test]
    fn stall_at_station() {
        // x(t) = 5 - 5(1 - 2t)^3: the curve stops dead halfway along.
        let c = FittedCurve::fit(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        ])
        .unwrap();
        assert!((c.arclen() - 10.0).abs() < 1e-9);
        assert_eq!(
            solve_stations(&c, 1, 1e-9, 100),
            Err(MeasureError::DegenerateCurve("zero tangent at station"))
        );
        assert!(solve_stations(&c, 3, 1e-9, 100).is_err());
        assert_eq!(solve_stations(&c, 2, 1e-9, 100).unwrap().len(), 2);
    }

    #[test]
    fn inv_arclen_on_line() {
        let l = Line::new((0.0, 0.0), (0.0, 80.0));
        assert!((solve_arclen_fraction(&l, 80.0, 0.25, 1e-9, 100).unwrap() - 0.25).abs() < 1e-8);
        let c = FittedCurve::fit(&[Point::new(0.0, 0.0), Point::new(0.0, 80.0)]).unwrap();
        assert!((c.inv_arclen(20.0).unwrap() - 0.25).abs() < 1e-8);
    }
}

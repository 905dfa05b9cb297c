// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lines.

use crate::{ParamCurve, ParamCurveArclen, Point, Vec2};

/// A single line segment.
///
/// Every click-to-click stroke of a measurement is a `Line`; the last one of
/// an active measurement is the rubber band that follows the cursor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// The line's start point.
    pub p0: Point,
    /// The line's end point.
    pub p1: Point,
}

/// The result of [`Line::nearest`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    /// The parameter of the nearest point on the segment, in `[0, 1]`.
    pub t: f64,
    /// The square of the distance from the query point.
    pub distance_sq: f64,
}

impl Line {
    /// Create a new line.
    #[inline(always)]
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Line {
        Line {
            p0: p0.into(),
            p1: p1.into(),
        }
    }

    /// A zero-length line anchored at `p`.
    #[inline(always)]
    pub fn degenerate(p: impl Into<Point>) -> Line {
        let p = p.into();
        Line { p0: p, p1: p }
    }

    /// The displacement from start to end.
    #[inline]
    pub fn vector(self) -> Vec2 {
        self.p1 - self.p0
    }

    /// The length of the line.
    #[inline]
    pub fn length(self) -> f64 {
        self.vector().hypot()
    }

    /// The crossing point of two segments, if it lies on both of them.
    ///
    /// Endpoints count as part of the segment. Parallel and collinear
    /// segments never intersect, and neither does a zero-length segment.
    pub fn bounded_intersection(self, other: Line) -> Option<Point> {
        let ab = self.p1 - self.p0;
        let cd = other.p1 - other.p0;
        let denom = ab.cross(cd);
        if denom == 0.0 {
            return None;
        }
        let ac = other.p0 - self.p0;
        let s = ac.cross(cd) / denom;
        let u = ac.cross(ab) / denom;
        if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&u) {
            Some(self.eval(s))
        } else {
            None
        }
    }

    /// Find the point on the segment nearest to `p`.
    ///
    /// A zero-length segment reports its start point.
    pub fn nearest(self, p: Point) -> Nearest {
        let d = self.p1 - self.p0;
        let v = p - self.p0;
        // Infinite or NaN for a zero-length segment, clamped to 0 below.
        let t = d.dot(v) / d.hypot2();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let distance_sq = (v - t * d).hypot2();
        Nearest { t, distance_sq }
    }

    /// Is this line [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    pub fn is_finite(self) -> bool {
        self.p0.is_finite() && self.p1.is_finite()
    }
}

impl From<(Point, Point)> for Line {
    #[inline(always)]
    fn from((from, to): (Point, Point)) -> Self {
        Line::new(from, to)
    }
}

impl ParamCurve for Line {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        self.p0.lerp(self.p1, t)
    }

    #[inline(always)]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline(always)]
    fn end(&self) -> Point {
        self.p1
    }
}

impl ParamCurveArclen for Line {
    #[inline]
    fn arclen(&self) -> f64 {
        self.length()
    }

    #[inline]
    fn arclen_range(&self, start: f64, end: f64) -> f64 {
        (end - start) * self.length()
    }

    #[inline]
    fn inv_arclen(&self, arclen: f64) -> Option<f64> {
        let len = self.length();
        (len > 0.0).then(|| arclen / len)
    }
}

/// Signed angle in degrees from the direction of `a` to the direction of `b`.
///
/// The result is in `(-180, 180]`, positive for a turn from the positive x
/// axis toward the positive y axis. Zero-length lines give `0`.
pub fn angle_between(a: Line, b: Line) -> f64 {
    a.vector().angle_to(b.vector()).to_degrees()
}

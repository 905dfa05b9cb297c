// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A rectangle.

use crate::{Point, Size};

/// A rectangle.
///
/// Width profiles use the image rectangle `[0, W] × [0, H]` as the boundary
/// every station normal is clipped against.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// The minimum x coordinate (left edge).
    pub x0: f64,
    /// The minimum y coordinate (top edge in y-down spaces).
    pub y0: f64,
    /// The maximum x coordinate (right edge).
    pub x1: f64,
    /// The maximum y coordinate (bottom edge in y-down spaces).
    pub y1: f64,
}

impl Rect {
    /// A new rectangle from minimum and maximum coordinates.
    #[inline]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect { x0, y0, x1, y1 }
    }

    /// A new rectangle from two points.
    ///
    /// The result will have non-negative width and height.
    #[inline]
    pub fn from_points(p0: impl Into<Point>, p1: impl Into<Point>) -> Rect {
        let p0 = p0.into();
        let p1 = p1.into();
        Rect::new(p0.x.min(p1.x), p0.y.min(p1.y), p0.x.max(p1.x), p0.y.max(p1.y))
    }

    /// A new rectangle anchored at the origin with the given size.
    ///
    /// This is the bounds of an image of that size.
    #[inline]
    pub fn from_size(size: impl Into<Size>) -> Rect {
        let size = size.into();
        Rect::from_points(Point::ZERO, Point::new(size.width, size.height))
    }

    /// Expand a rectangle by a constant amount in both directions.
    ///
    /// The logic simply applies the amount in each direction. If rectangle
    /// area or added dimensions are negative, this could give odd results.
    #[inline]
    pub fn inflate(&self, width: f64, height: f64) -> Rect {
        Rect {
            x0: self.x0 - width,
            y0: self.y0 - height,
            x1: self.x1 + width,
            y1: self.y1 + height,
        }
    }

    /// Returns `true` if `point` lies within `self`, edges included.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x0 && point.x <= self.x1 && point.y >= self.y0 && point.y <= self.y1
    }
}

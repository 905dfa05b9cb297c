// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed polygons for area measurements.

use crate::{Line, Point};

/// A closed polygon, given by its vertices in order.
///
/// The edge from the last vertex back to the first is implied.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Create a polygon from its vertices.
    pub fn new(vertices: impl IntoIterator<Item = Point>) -> Polygon {
        Polygon {
            vertices: vertices.into_iter().collect(),
        }
    }

    /// The vertices, in order.
    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Signed area by the shoelace formula.
    ///
    /// Positive when the vertices run from the positive x axis toward the
    /// positive y axis. Fewer than three vertices enclose nothing, and give
    /// zero.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for w in self.vertices.windows(2) {
            sum += w[0].to_vec2().cross(w[1].to_vec2());
        }
        sum += self.vertices[n - 1].to_vec2().cross(self.vertices[0].to_vec2());
        0.5 * sum
    }

    /// The enclosed area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }
}

/// Test whether the newest segment of an open polyline closes a loop.
///
/// Only the last segment is checked, against every earlier segment except
/// its immediate predecessor (which it always touches). On the first hit, at
/// segment `i` and point `X`, the loop runs from the end of segment `i`
/// through the end of each later segment up to the newest one's start, and
/// back to `X`.
pub fn find_closure(segments: &[Line]) -> Option<Polygon> {
    let (&newest, earlier) = segments.split_last()?;
    let candidates = earlier.len().checked_sub(1)?;
    earlier[..candidates]
        .iter()
        .enumerate()
        .find_map(|(i, seg)| newest.bounded_intersection(*seg).map(|x| (i, x)))
        .map(|(i, x)| {
            Polygon::new(
                earlier[i..]
                    .iter()
                    .map(|seg| seg.p1)
                    .chain(core::iter::once(x)),
            )
        })
}

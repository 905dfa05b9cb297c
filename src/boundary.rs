// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intersection of a station normal with the image boundary.

use arrayvec::ArrayVec;

use crate::{MeasureError, Point, Rect, Vec2};

/// Crossings closer than this are the same point, whatever the margin.
const MERGE_DISTANCE: f64 = 1e-9;

/// Which coordinate an image edge fixes.
#[derive(Clone, Copy)]
enum Edge {
    Horizontal(f64),
    Vertical(f64),
}

/// Crossings of the infinite line `p + T·v` with the edges of `rect`.
///
/// Edges are visited in the order top (`y = y0`), left (`x = x0`), bottom
/// (`y = y1`), right (`x = x1`), and the crossings are returned in that
/// order. A crossing is accepted if it lies within `rect` grown by `margin`
/// on every side. An edge parallel to `v` is skipped. A crossing within
/// `margin` of one already accepted is dropped, so a line through a corner
/// reports that corner once. A zero margin still absorbs rounding error.
pub fn boundary_crossings(p: Point, v: Vec2, rect: Rect, margin: f64) -> ArrayVec<Point, 4> {
    let slack = margin.max(MERGE_DISTANCE);
    let bounds = rect.inflate(slack, slack);
    let edges = [
        Edge::Horizontal(rect.y0),
        Edge::Vertical(rect.x0),
        Edge::Horizontal(rect.y1),
        Edge::Vertical(rect.x1),
    ];
    let mut crossings = ArrayVec::new();
    for edge in edges {
        let t = match edge {
            Edge::Horizontal(_) if v.y == 0.0 => continue,
            Edge::Vertical(_) if v.x == 0.0 => continue,
            Edge::Horizontal(y) => (y - p.y) / v.y,
            Edge::Vertical(x) => (x - p.x) / v.x,
        };
        let q = p + t * v;
        if !q.is_finite() || !bounds.contains(q) {
            continue;
        }
        if crossings.iter().any(|c: &Point| c.distance(q) < slack) {
            continue;
        }
        crossings.push(q);
    }
    crossings
}

/// The two points where the normal through `p` leaves the image.
///
/// The first is side A, the second side B, in the edge order of
/// [`boundary_crossings`].
///
/// # Errors
///
/// [`MeasureError::BoundaryAnomaly`] unless there are exactly two crossings.
pub fn normal_chord(
    p: Point,
    normal: Vec2,
    image: Rect,
    margin: f64,
) -> Result<(Point, Point), MeasureError> {
    match boundary_crossings(p, normal, image, margin).as_slice() {
        &[a, b] => Ok((a, b)),
        other => Err(MeasureError::BoundaryAnomaly { found: other.len() }),
    }
}

#[cfg(test)]
mod tests {
    use crate::{boundary_crossings, normal_chord, MeasureError, Point, Rect, Size, Vec2};

    fn image() -> Rect {
        Rect::from_size(Size::new(400.0, 300.0))
    }

    fn assert_near(p: Point, q: Point) {
        assert!(p.distance(q) < 1e-9, "{p:?} != {q:?}");
    }

    #[test]
    fn horizontal_normal() {
        let (a, b) = normal_chord(Point::new(100.0, 120.0), Vec2::new(1.0, 0.0), image(), 1.0)
            .unwrap();
        assert_near(a, Point::new(0.0, 120.0));
        assert_near(b, Point::new(400.0, 120.0));
    }

    #[test]
    fn vertical_normal() {
        let (a, b) = normal_chord(Point::new(100.0, 120.0), Vec2::new(0.0, -1.0), image(), 1.0)
            .unwrap();
        assert_near(a, Point::new(100.0, 0.0));
        assert_near(b, Point::new(100.0, 300.0));
    }

    #[test]
    fn diagonal_normal() {
        let v = Vec2::new(1.0, 1.0).normalize();
        let (a, b) = normal_chord(Point::new(200.0, 150.0), v, image(), 1.0).unwrap();
        assert_near(a, Point::new(50.0, 0.0));
        assert_near(b, Point::new(350.0, 300.0));
        // The crossings and the station are collinear along the normal.
        assert!((a - Point::new(200.0, 150.0)).cross(v).abs() < 1e-9);
    }

    #[test]
    fn through_corner() {
        // Passes exactly through (0, 0): top and left edges agree.
        let v = Vec2::new(1.0, 1.0).normalize();
        let crossings = boundary_crossings(Point::new(100.0, 100.0), v, image(), 1.0);
        assert_eq!(crossings.len(), 2);
        assert_near(crossings[0], Point::new(0.0, 0.0));
        assert_near(crossings[1], Point::new(300.0, 300.0));
    }

    #[test]
    fn through_corner_without_margin() {
        let p = Point::new(100.0, 100.0);
        for v in [Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0).normalize()] {
            let crossings = boundary_crossings(p, v, image(), 0.0);
            assert_eq!(crossings.len(), 2, "{v:?}");
            assert_near(crossings[0], Point::new(0.0, 0.0));
            assert_near(crossings[1], Point::new(300.0, 300.0));
        }
        assert!(normal_chord(p, Vec2::new(1.0, 1.0), image(), 0.0).is_ok());
    }

    #[test]
    fn edge_within_margin() {
        // Slightly outside the right edge, still accepted thanks to the margin.
        let crossings = boundary_crossings(
            Point::new(400.5, 150.0),
            Vec2::new(0.0, 1.0),
            image(),
            1.0,
        );
        assert_eq!(crossings.len(), 2);
    }

    #[test]
    fn missing_the_image() {
        let err = normal_chord(
            Point::new(-50.0, -50.0),
            Vec2::new(1.0, -1.0).normalize(),
            image(),
            1.0,
        );
        assert_eq!(err, Err(MeasureError::BoundaryAnomaly { found: 0 }));
    }
}

// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measurements and the primitives they are drawn with.

use core::fmt;

use crate::{FittedCurve, Line, ParamCurve, Point, Polygon, Station};

/// The kind of quantity a measurement records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeasurementKind {
    /// A curve or polyline length, in pixels.
    Length,
    /// A profile of widths across a fitted length curve, in pixels.
    Width,
    /// A signed angle between two strokes, in degrees.
    Angle,
    /// An enclosed area, in square pixels.
    Area,
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MeasurementKind::Length => "length",
            MeasurementKind::Width => "width",
            MeasurementKind::Angle => "angle",
            MeasurementKind::Area => "area",
        })
    }
}

/// One side of a width station.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// The first boundary crossing of the station normal.
    A,
    /// The second boundary crossing.
    B,
}

/// How a station width is read from its handles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SideBias {
    /// Distance between the two handles.
    #[default]
    None,
    /// Twice the distance from the centre line to the side A handle.
    SideA,
    /// Twice the distance from the centre line to the side B handle.
    SideB,
}

/// A draggable point confined to the chord from a station to the boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Handle {
    anchor: Point,
    boundary: Point,
    position: Point,
}

impl Handle {
    /// A handle `offset` pixels from `anchor` toward `boundary`.
    ///
    /// The offset is clamped to the chord.
    pub fn new(anchor: Point, boundary: Point, offset: f64) -> Handle {
        Handle {
            anchor,
            boundary,
            position: point_along(anchor, boundary, offset),
        }
    }

    /// The station point on the centre line.
    #[inline]
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Where the station normal leaves the image on this side.
    #[inline]
    pub fn boundary(&self) -> Point {
        self.boundary
    }

    /// The current handle position.
    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    /// The segment the handle slides along.
    #[inline]
    pub fn chord(&self) -> Line {
        Line::new(self.anchor, self.boundary)
    }

    /// Move the handle to the point of its chord nearest `target`.
    pub fn drag_to(&mut self, target: Point) {
        let chord = self.chord();
        self.position = chord.eval(chord.nearest(target).t);
    }

    /// Distance from the centre line to the handle.
    #[inline]
    pub fn reach(&self) -> f64 {
        self.anchor.distance(self.position)
    }
}

/// The point `distance` pixels from `from` toward `to`, clamped to the segment.
pub(crate) fn point_along(from: Point, to: Point, distance: f64) -> Point {
    let len = from.distance(to);
    if len > 0.0 {
        from.lerp(to, (distance / len).clamp(0.0, 1.0))
    } else {
        from
    }
}

/// A station of a width profile with its pair of side handles.
#[derive(Clone, Debug, PartialEq)]
pub struct WidthStation {
    /// Where the station sits on the source curve.
    pub station: Station,
    /// Side A and side B handles, or `None` if the station normal did not
    /// cross the image boundary exactly twice.
    pub sides: Option<(Handle, Handle)>,
}

impl WidthStation {
    /// Whether the station has usable handles.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.sides.is_some()
    }

    /// The handle on `side`.
    pub fn handle(&self, side: Side) -> Option<&Handle> {
        self.sides.as_ref().map(|(a, b)| match side {
            Side::A => a,
            Side::B => b,
        })
    }

    pub(crate) fn handle_mut(&mut self, side: Side) -> Option<&mut Handle> {
        self.sides.as_mut().map(|(a, b)| match side {
            Side::A => a,
            Side::B => b,
        })
    }

    /// The width read from the current handle positions.
    ///
    /// `None` for an invalid station.
    pub fn width(&self, bias: SideBias) -> Option<f64> {
        let (a, b) = self.sides.as_ref()?;
        Some(match bias {
            SideBias::None => a.position.distance(b.position),
            SideBias::SideA => 2.0 * a.reach(),
            SideBias::SideB => 2.0 * b.reach(),
        })
    }

    /// The export label of this station within the profile called `name`.
    pub fn label(&self, name: &str) -> String {
        format!("{name}_w{:.1}", self.station.percent())
    }
}

/// A drawable item owned by a measurement.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// A straight stroke between two clicks, or the rubber band.
    Segment(Line),
    /// A fitted curve, sampled for drawing.
    CurveSamples(Vec<Point>),
    /// The closing polygon of an area.
    Polygon(Polygon),
    /// A width station and its handles.
    Station(WidthStation),
    /// A text label.
    Label {
        /// The label text.
        text: &'static str,
        /// Where the text is anchored.
        position: Point,
    },
}

impl Primitive {
    /// The segment, if this primitive is one.
    #[inline]
    pub fn as_segment(&self) -> Option<&Line> {
        match self {
            Primitive::Segment(line) => Some(line),
            _ => None,
        }
    }
}

/// The value of a terminated measurement.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeasurementValue {
    /// A length, angle or area.
    Scalar(f64),
    /// One width per station; `None` marks an invalid station.
    Profile(Vec<Option<f64>>),
}

impl MeasurementValue {
    /// The scalar value, if this is not a profile.
    #[inline]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            MeasurementValue::Scalar(v) => Some(*v),
            MeasurementValue::Profile(_) => None,
        }
    }
}

/// A single measurement on the stack.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub(crate) kind: MeasurementKind,
    pub(crate) name: String,
    pub(crate) value: Option<f64>,
    pub(crate) complete: bool,
    pub(crate) primitives: Vec<Primitive>,
    pub(crate) curve: Option<FittedCurve>,
    pub(crate) source: Option<usize>,
}

impl Measurement {
    pub(crate) fn new(kind: MeasurementKind, name: impl Into<String>) -> Measurement {
        Measurement {
            kind,
            name: name.into(),
            value: None,
            complete: false,
            primitives: Vec::new(),
            curve: None,
            source: None,
        }
    }

    /// What is being measured.
    #[inline]
    pub fn kind(&self) -> MeasurementKind {
        self.kind
    }

    /// The caller-supplied name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the measurement has received its terminal event.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Whether this is an area whose polygon has been closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.kind == MeasurementKind::Area
            && self
                .primitives
                .last()
                .is_some_and(|p| matches!(p, Primitive::Polygon(_)))
    }

    /// The drawable primitives, in creation order.
    #[inline]
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// The fitted curve, for a length measured with curve fitting.
    #[inline]
    pub fn curve(&self) -> Option<&FittedCurve> {
        self.curve.as_ref()
    }

    /// For a width profile, the stack index of the length it samples.
    #[inline]
    pub fn source(&self) -> Option<usize> {
        self.source
    }

    /// The straight segments, in order.
    pub fn segments(&self) -> impl Iterator<Item = &Line> + '_ {
        self.primitives.iter().filter_map(Primitive::as_segment)
    }

    /// The width stations, in order along the curve.
    pub fn stations(&self) -> impl Iterator<Item = &WidthStation> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Station(s) => Some(s),
            _ => None,
        })
    }

    pub(crate) fn station_mut(&mut self, index: usize) -> Option<&mut WidthStation> {
        self.primitives
            .iter_mut()
            .filter_map(|p| match p {
                Primitive::Station(s) => Some(s),
                _ => None,
            })
            .nth(index)
    }

    /// The measured value, once complete.
    ///
    /// A width profile is evaluated now, from the current handle positions.
    pub fn value(&self, bias: SideBias) -> Option<MeasurementValue> {
        if !self.complete {
            return None;
        }
        match self.kind {
            MeasurementKind::Width => Some(MeasurementValue::Profile(
                self.stations().map(|s| s.width(bias)).collect(),
            )),
            _ => self.value.map(MeasurementValue::Scalar),
        }
    }
}

/// A terminated measurement's result, ready for export.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasurementReport {
    /// What was measured.
    pub kind: MeasurementKind,
    /// The caller-supplied name.
    pub name: String,
    /// The value, in pixels or degrees.
    pub value: MeasurementValue,
    /// Export labels of a width profile's stations, `<name>_w<percent>`.
    pub labels: Vec<String>,
}

impl MeasurementReport {
    /// One `(label, value)` row per scalar, the way a spreadsheet export
    /// lists them.
    pub fn rows(&self) -> Vec<(String, Option<f64>)> {
        match &self.value {
            MeasurementValue::Scalar(v) => vec![(self.name.clone(), Some(*v))],
            MeasurementValue::Profile(widths) => self
                .labels
                .iter()
                .cloned()
                .zip(widths.iter().copied())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Handle, Point, Side, SideBias, Station, Vec2, WidthStation};

    fn assert_near(p: Point, q: Point) {
        assert!(p.distance(q) < 1e-9, "{p:?} != {q:?}");
    }

    fn assert_width(w: Option<f64>, expected: f64) {
        let w = w.unwrap();
        assert!((w - expected).abs() < 1e-9, "{w} != {expected}");
    }

    fn station(fraction: f64) -> Station {
        Station {
            index: 0,
            t: 0.5,
            point: Point::new(50.0, 50.0),
            normal: Vec2::new(0.0, 1.0),
            fraction,
        }
    }

    #[test]
    fn handle_starts_at_offset() {
        let h = Handle::new(Point::new(50.0, 50.0), Point::new(50.0, 0.0), 10.0);
        assert_near(h.position(), Point::new(50.0, 40.0));
        assert!((h.reach() - 10.0).abs() < 1e-9);
        // Offsets past the boundary clamp to it.
        let h = Handle::new(Point::new(50.0, 50.0), Point::new(50.0, 0.0), 500.0);
        assert_near(h.position(), Point::new(50.0, 0.0));
    }

    #[test]
    fn drag_stays_on_chord() {
        let mut h = Handle::new(Point::new(50.0, 50.0), Point::new(50.0, 0.0), 10.0);
        h.drag_to(Point::new(70.0, 20.0));
        assert_near(h.position(), Point::new(50.0, 20.0));
        h.drag_to(Point::new(50.0, 90.0));
        assert_near(h.position(), h.anchor());
        h.drag_to(Point::new(10.0, -40.0));
        assert_near(h.position(), h.boundary());
    }

    #[test]
    fn widths_by_bias() {
        let anchor = Point::new(50.0, 50.0);
        let mut ws = WidthStation {
            station: station(0.5),
            sides: Some((
                Handle::new(anchor, Point::new(50.0, 0.0), 10.0),
                Handle::new(anchor, Point::new(50.0, 100.0), 10.0),
            )),
        };
        if let Some(b) = ws.handle_mut(Side::B) {
            b.drag_to(Point::new(50.0, 80.0));
        }
        assert_width(ws.width(SideBias::None), 40.0);
        assert_width(ws.width(SideBias::SideA), 20.0);
        assert_width(ws.width(SideBias::SideB), 60.0);
        assert_width(ws.handle(Side::A).map(Handle::reach), 10.0);
    }

    #[test]
    fn invalid_station() {
        let ws = WidthStation {
            station: station(0.25),
            sides: None,
        };
        assert!(!ws.is_valid());
        assert_eq!(ws.width(SideBias::None), None);
        assert_eq!(ws.label("fluke"), "fluke_w25.0");
    }
}

// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The measurement state machine.

use core::fmt;

use log::{debug, warn};

use crate::measurement::point_along;
use crate::{
    angle_between, find_closure, normal_chord, solve_stations, EngineOptions, FittedCurve, Handle,
    Line, MeasureError, Measurement, MeasurementKind, MeasurementReport, MeasurementValue,
    ParamCurveArclen, Point, Primitive, Rect, Side, SideBias, Size, WidthStation,
};

/// What the engine is waiting for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineState {
    /// No measurement is active.
    #[default]
    Idle,
    /// Collecting the vertices of a length.
    LengthActive,
    /// Collecting the three clicks of an angle.
    AngleActive,
    /// Collecting the vertices of an area until it closes.
    AreaActive,
    /// Sampling a width profile. Only observed while the batch runs.
    WidthActive,
}

impl EngineState {
    /// The state of an engine measuring a `kind`.
    pub fn active(kind: MeasurementKind) -> EngineState {
        match kind {
            MeasurementKind::Length => EngineState::LengthActive,
            MeasurementKind::Width => EngineState::WidthActive,
            MeasurementKind::Angle => EngineState::AngleActive,
            MeasurementKind::Area => EngineState::AreaActive,
        }
    }

    /// The kind of measurement in progress, if any.
    pub fn kind(self) -> Option<MeasurementKind> {
        match self {
            EngineState::Idle => None,
            EngineState::LengthActive => Some(MeasurementKind::Length),
            EngineState::AngleActive => Some(MeasurementKind::Angle),
            EngineState::AreaActive => Some(MeasurementKind::Area),
            EngineState::WidthActive => Some(MeasurementKind::Width),
        }
    }

    /// Whether no measurement is active.
    #[inline]
    pub fn is_idle(self) -> bool {
        self == EngineState::Idle
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EngineState::Idle => "idle",
            EngineState::LengthActive => "measuring a length",
            EngineState::AngleActive => "measuring an angle",
            EngineState::AreaActive => "measuring an area",
            EngineState::WidthActive => "sampling widths",
        })
    }
}

/// Owns the measurement stack and turns caller events into measurements.
///
/// Every operation runs to completion and returns the state the engine is
/// left in. A rejected event leaves the engine untouched.
///
/// Points are in image pixels. The last segment of an active measurement is
/// a rubber band: [`add_point`](Self::add_point) pins its free end and starts
/// a new one, [`move_cursor`](Self::move_cursor) drags it.
#[derive(Clone, Debug, Default)]
pub struct MeasurementEngine {
    options: EngineOptions,
    state: EngineState,
    stack: Vec<Measurement>,
    cursor: Option<Point>,
}

impl MeasurementEngine {
    /// An idle engine with an empty stack.
    pub fn new(options: EngineOptions) -> MeasurementEngine {
        MeasurementEngine {
            options,
            ..MeasurementEngine::default()
        }
    }

    /// The options the engine was created with.
    #[inline]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The current state.
    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The measurement stack, oldest first.
    #[inline]
    pub fn measurements(&self) -> &[Measurement] {
        &self.stack
    }

    /// The last known cursor position.
    #[inline]
    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    /// Begin a new measurement.
    ///
    /// Width profiles are not entered point by point; see
    /// [`start_width_sampling`](Self::start_width_sampling).
    ///
    /// # Errors
    ///
    /// [`MeasureError::InvalidTransition`] unless the engine is idle.
    pub fn start(
        &mut self,
        kind: MeasurementKind,
        name: impl Into<String>,
    ) -> Result<EngineState, MeasureError> {
        let state = self.state;
        if !state.is_idle() {
            return Err(MeasureError::InvalidTransition {
                action: "start a measurement",
                state,
            });
        }
        if kind == MeasurementKind::Width {
            return Err(MeasureError::InvalidTransition {
                action: "start a width profile point by point",
                state,
            });
        }
        let name = name.into();
        debug!("start {kind} {name:?}");
        self.stack.push(Measurement::new(kind, name));
        self.state = EngineState::active(kind);
        Ok(self.state)
    }

    /// A click at `p`.
    ///
    /// The third click of an angle ends it. A click that makes an area's
    /// outline cross itself closes the area instead of starting a new
    /// segment; the next click on a closed area commits it, like
    /// [`commit`](Self::commit).
    ///
    /// # Errors
    ///
    /// [`MeasureError::InvalidTransition`] if no measurement is active.
    pub fn add_point(&mut self, p: impl Into<Point>) -> Result<EngineState, MeasureError> {
        let p = p.into();
        let m = self.current("add a point")?;
        let value = match m.kind {
            MeasurementKind::Angle if m.segments().nth(1).is_some() => {
                set_rubber_band(m, p);
                vertex_angle(m)
            }
            MeasurementKind::Area if m.is_closed() => close_area(m),
            MeasurementKind::Area => {
                set_rubber_band(m, p);
                let segments: Vec<Line> = m.segments().copied().collect();
                m.primitives.push(match find_closure(&segments) {
                    Some(polygon) => Primitive::Polygon(polygon),
                    None => Primitive::Segment(Line::degenerate(p)),
                });
                None
            }
            _ => {
                set_rubber_band(m, p);
                m.primitives.push(Primitive::Segment(Line::degenerate(p)));
                None
            }
        };
        self.cursor = Some(p);
        Ok(match value {
            Some(value) => self.complete(value),
            None => self.state,
        })
    }

    /// The cursor moved to `p` without clicking.
    ///
    /// Drags the rubber band. For an area, the closing polygon is rebuilt
    /// from scratch. Hovering while idle is accepted and does nothing.
    ///
    /// # Errors
    ///
    /// [`MeasureError::InvalidTransition`] while sampling widths.
    pub fn move_cursor(&mut self, p: impl Into<Point>) -> Result<EngineState, MeasureError> {
        let p = p.into();
        if self.state.is_idle() {
            self.cursor = Some(p);
            return Ok(EngineState::Idle);
        }
        let m = self.current("move the cursor")?;
        if m.is_closed() {
            m.primitives.pop();
        }
        set_rubber_band(m, p);
        if m.kind == MeasurementKind::Area {
            let segments: Vec<Line> = m.segments().copied().collect();
            if let Some(polygon) = find_closure(&segments) {
                m.primitives.push(Primitive::Polygon(polygon));
            }
        }
        self.cursor = Some(p);
        Ok(self.state)
    }

    /// End a length (a double click).
    ///
    /// The rubber band is discarded. With curve fitting on, a Bézier curve is
    /// fitted through the clicked vertices and the length is its arc length;
    /// otherwise it is the sum of the straight segments.
    ///
    /// # Errors
    ///
    /// - [`MeasureError::InvalidTransition`] unless a length with at least
    ///   one click is active. The engine is unchanged.
    /// - [`MeasureError::DegenerateCurve`] or
    ///   [`MeasureError::ConvergenceFailure`] if no length can be computed.
    ///   The measurement is discarded and the engine returns to idle.
    pub fn finish(&mut self) -> Result<EngineState, MeasureError> {
        let state = self.state;
        let EngineOptions {
            bezier_fit,
            curve_samples,
            ..
        } = self.options;
        let m = self.current("finish")?;
        if m.kind != MeasurementKind::Length {
            return Err(MeasureError::InvalidTransition {
                action: "finish",
                state,
            });
        }
        if m.primitives.pop().is_none() {
            return Err(MeasureError::InvalidTransition {
                action: "finish a length with no points",
                state,
            });
        }
        let vertices: Vec<Point> = m
            .segments()
            .next()
            .map(|s| s.p0)
            .into_iter()
            .chain(m.segments().map(|s| s.p1))
            .collect();
        let outcome = if vertices.len() < 2 {
            Err(MeasureError::DegenerateCurve(
                "a length needs at least two points",
            ))
        } else if bezier_fit {
            FittedCurve::fit(&vertices).map(|curve| {
                let value = curve.arclen();
                m.primitives = vec![Primitive::CurveSamples(curve.curve().sample(curve_samples))];
                m.curve = Some(curve);
                value
            })
        } else {
            Ok(m.segments().map(|s| s.length()).sum())
        };
        match outcome {
            Ok(value) => Ok(self.complete(value)),
            Err(err) => Err(self.abort(err)),
        }
    }

    /// Commit a closed area (the second click after closure).
    ///
    /// # Errors
    ///
    /// [`MeasureError::InvalidTransition`] unless an area with a closing
    /// polygon is active.
    pub fn commit(&mut self) -> Result<EngineState, MeasureError> {
        let state = self.state;
        let m = self.current("commit")?;
        if m.kind != MeasurementKind::Area {
            return Err(MeasureError::InvalidTransition {
                action: "commit",
                state,
            });
        }
        let value = close_area(m).ok_or(MeasureError::InvalidTransition {
            action: "commit an open polygon",
            state,
        })?;
        Ok(self.complete(value))
    }

    /// Sample a width profile of `count` stations across the last
    /// measurement, which must be a completed, curve-fitted length.
    ///
    /// Stations are placed at equal arc length, endpoints excluded. Each
    /// station's normal is intersected with the `image` rectangle; a station
    /// whose normal does not leave the image exactly twice is kept but marked
    /// invalid. The profile is pushed as a completed measurement with the
    /// length's name and the engine returns to idle.
    ///
    /// # Errors
    ///
    /// - [`MeasureError::InvalidTransition`] unless the engine is idle, the
    ///   last measurement is a fitted length, and `count` is at least one.
    /// - [`MeasureError::DegenerateCurve`],
    ///   [`MeasureError::ConvergenceFailure`] or
    ///   [`MeasureError::InvalidOption`] if the stations can't be solved. No
    ///   profile is pushed and the engine returns to idle.
    pub fn start_width_sampling(
        &mut self,
        count: usize,
        image: impl Into<Size>,
    ) -> Result<EngineState, MeasureError> {
        let state = self.state;
        if !state.is_idle() {
            return Err(MeasureError::InvalidTransition {
                action: "sample widths",
                state,
            });
        }
        if count == 0 {
            return Err(MeasureError::InvalidTransition {
                action: "sample zero widths",
                state,
            });
        }
        let source = self.stack.len().saturating_sub(1);
        let Some((name, curve)) = self
            .stack
            .last()
            .filter(|m| m.kind == MeasurementKind::Length && m.complete)
            .and_then(|m| Some((m.name.clone(), m.curve.as_ref()?)))
        else {
            return Err(MeasureError::InvalidTransition {
                action: "sample widths without a fitted length",
                state,
            });
        };
        let EngineOptions {
            boundary_margin,
            station_tolerance,
            max_iterations,
            handle_offset,
            label_offset,
            ..
        } = self.options;

        self.state = EngineState::WidthActive;
        debug!("sample {count} widths along {name:?}");
        let stations = match solve_stations(curve, count, station_tolerance, max_iterations) {
            Ok(stations) => stations,
            Err(err) => {
                warn!("width sampling of {name:?} failed: {err}");
                self.state = EngineState::Idle;
                return Err(err);
            }
        };

        let image = Rect::from_size(image);
        let mut width = Measurement::new(MeasurementKind::Width, name);
        width.source = Some(source);
        for station in stations {
            let sides = match normal_chord(station.point, station.normal, image, boundary_margin) {
                Ok((a, b)) => {
                    if station.index == 0 {
                        for (text, end) in [("A", a), ("B", b)] {
                            width.primitives.push(Primitive::Label {
                                text,
                                position: point_along(station.point, end, label_offset),
                            });
                        }
                    }
                    Some((
                        Handle::new(station.point, a, handle_offset),
                        Handle::new(station.point, b, handle_offset),
                    ))
                }
                Err(err) => {
                    warn!(
                        "width station {} of {:?} is invalid: {err}",
                        station.index, width.name
                    );
                    None
                }
            };
            width
                .primitives
                .push(Primitive::Station(WidthStation { station, sides }));
        }
        width.complete = true;
        self.stack.push(width);
        self.state = EngineState::Idle;
        Ok(self.state)
    }

    /// Step back once.
    ///
    /// An active or plain measurement loses its last primitive and becomes
    /// active again, its new rubber band following the cursor. A measurement
    /// with one primitive, a fitted curve, or a width profile is removed
    /// whole. Removing an empty measurement steps back once more. Undo on an
    /// empty stack does nothing.
    pub fn undo(&mut self) -> EngineState {
        while let Some(m) = self.stack.last_mut() {
            if m.primitives.is_empty() {
                debug!("undo: drop empty {} {:?}", m.kind, m.name);
                self.stack.pop();
                self.state = EngineState::Idle;
                continue;
            }
            if m.primitives.len() == 1 || m.curve.is_some() || m.kind == MeasurementKind::Width {
                debug!("undo: drop {} {:?}", m.kind, m.name);
                self.stack.pop();
                self.state = EngineState::Idle;
            } else {
                m.primitives.pop();
                if let Some(cursor) = self.cursor {
                    set_rubber_band(m, cursor);
                }
                m.complete = false;
                m.value = None;
                self.state = EngineState::active(m.kind);
            }
            break;
        }
        self.state
    }

    /// Drag a width handle toward `to`. The handle stays on its chord.
    ///
    /// Returns the handle's new position.
    ///
    /// # Errors
    ///
    /// [`MeasureError::NoSuchHandle`] if `measurement` is not a width profile,
    /// or `station` is out of range or invalid.
    pub fn drag_handle(
        &mut self,
        measurement: usize,
        station: usize,
        side: Side,
        to: impl Into<Point>,
    ) -> Result<Point, MeasureError> {
        let to = to.into();
        self.stack
            .get_mut(measurement)
            .filter(|m| m.kind == MeasurementKind::Width)
            .and_then(|m| m.station_mut(station))
            .and_then(|s| s.handle_mut(side))
            .map(|h| {
                h.drag_to(to);
                h.position()
            })
            .ok_or(MeasureError::NoSuchHandle {
                measurement,
                station,
            })
    }

    /// A report for every completed measurement, oldest first.
    ///
    /// Width profiles are read from the current handle positions with `bias`.
    pub fn results(&self, bias: SideBias) -> Vec<MeasurementReport> {
        self.stack
            .iter()
            .filter_map(|m| {
                let value = m.value(bias)?;
                let labels = match value {
                    MeasurementValue::Profile(_) => {
                        m.stations().map(|s| s.label(&m.name)).collect()
                    }
                    MeasurementValue::Scalar(_) => Vec::new(),
                };
                Some(MeasurementReport {
                    kind: m.kind,
                    name: m.name.clone(),
                    value,
                    labels,
                })
            })
            .collect()
    }

    /// The active, point by point measurement.
    fn current(&mut self, action: &'static str) -> Result<&mut Measurement, MeasureError> {
        let state = self.state;
        let invalid = MeasureError::InvalidTransition { action, state };
        match state.kind() {
            Some(kind) if kind != MeasurementKind::Width => self
                .stack
                .last_mut()
                .filter(|m| m.kind == kind && !m.complete)
                .ok_or(invalid),
            _ => Err(invalid),
        }
    }

    fn complete(&mut self, value: f64) -> EngineState {
        if let Some(m) = self.stack.last_mut() {
            debug!("{} {:?} = {value}", m.kind, m.name);
            m.value = Some(value);
            m.complete = true;
        }
        self.state = EngineState::Idle;
        self.state
    }

    fn abort(&mut self, err: MeasureError) -> MeasureError {
        if let Some(m) = self.stack.pop() {
            warn!("discarding {} {:?}: {err}", m.kind, m.name);
        }
        self.state = EngineState::Idle;
        err
    }
}

fn set_rubber_band(m: &mut Measurement, p: Point) {
    if let Some(Primitive::Segment(last)) = m.primitives.last_mut() {
        last.p1 = p;
    }
}

/// The angle at the shared vertex of the first two segments, from the first
/// arm to the second.
fn vertex_angle(m: &Measurement) -> Option<f64> {
    let mut segments = m.segments();
    let first = segments.next()?;
    let second = segments.next()?;
    Some(angle_between(Line::new(first.p1, first.p0), *second))
}

/// Reduce a closed area to its polygon, returning the enclosed area.
fn close_area(m: &mut Measurement) -> Option<f64> {
    match m.primitives.pop()? {
        Primitive::Polygon(polygon) => {
            let area = polygon.area();
            m.primitives.clear();
            m.primitives.push(Primitive::Polygon(polygon));
            Some(area)
        }
        other => {
            m.primitives.push(other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        EngineOptions, EngineState, MeasureError, MeasurementEngine, MeasurementKind,
        MeasurementValue, Point, Primitive, Side, SideBias, Size,
    };

    fn engine(bezier_fit: bool) -> MeasurementEngine {
        MeasurementEngine::new(EngineOptions::default().with_bezier_fit(bezier_fit))
    }

    fn scalar(e: &MeasurementEngine, index: usize) -> f64 {
        e.measurements()[index]
            .value(SideBias::None)
            .and_then(|v| v.as_scalar())
            .unwrap()
    }

    fn profile(e: &MeasurementEngine, index: usize, bias: SideBias) -> Vec<Option<f64>> {
        match e.measurements()[index].value(bias) {
            Some(MeasurementValue::Profile(widths)) => widths,
            other => panic!("not a profile: {other:?}"),
        }
    }

    fn measure_length(e: &mut MeasurementEngine, name: &str, points: &[(f64, f64)]) {
        e.start(MeasurementKind::Length, name).unwrap();
        for &p in points {
            e.add_point(p).unwrap();
        }
        assert_eq!(e.finish().unwrap(), EngineState::Idle);
    }

    #[test]
    fn straight_length() {
        let mut e = engine(false);
        assert_eq!(
            e.start(MeasurementKind::Length, "body").unwrap(),
            EngineState::LengthActive
        );
        e.add_point((0.0, 0.0)).unwrap();
        e.add_point((10.0, 0.0)).unwrap();
        e.add_point((10.0, 10.0)).unwrap();
        e.move_cursor((40.0, 40.0)).unwrap();
        assert_eq!(e.finish().unwrap(), EngineState::Idle);
        assert!((scalar(&e, 0) - 20.0).abs() < 1e-12);
        assert!(e.measurements()[0].curve().is_none());
    }

    #[test]
    fn fitted_length() {
        let mut e = engine(true);
        let points = [(0.0, 0.0), (50.0, 1.0), (100.0, 0.0)];
        measure_length(&mut e, "body", &points);
        let polyline = 2.0 * 50.0f64.hypot(1.0);
        let value = scalar(&e, 0);
        assert!((value - polyline).abs() < 0.05 * polyline);
        let m = &e.measurements()[0];
        assert!(m.curve().is_some());
        assert!(matches!(
            m.primitives(),
            [Primitive::CurveSamples(samples)] if samples.len() == 100
        ));
    }

    #[test]
    fn degenerate_length_is_discarded() {
        let mut e = engine(true);
        e.start(MeasurementKind::Length, "dot").unwrap();
        e.add_point((5.0, 5.0)).unwrap();
        e.add_point((5.0, 5.0)).unwrap();
        assert!(matches!(e.finish(), Err(MeasureError::DegenerateCurve(_))));
        assert_eq!(e.state(), EngineState::Idle);
        assert!(e.measurements().is_empty());
    }

    #[test]
    fn finish_without_points() {
        let mut e = engine(true);
        e.start(MeasurementKind::Length, "empty").unwrap();
        assert_eq!(
            e.finish(),
            Err(MeasureError::InvalidTransition {
                action: "finish a length with no points",
                state: EngineState::LengthActive,
            })
        );
        assert_eq!(e.state(), EngineState::LengthActive);
        assert_eq!(e.measurements().len(), 1);
    }

    #[test]
    fn right_angle() {
        let mut e = engine(true);
        e.start(MeasurementKind::Angle, "fin").unwrap();
        e.add_point((10.0, 0.0)).unwrap();
        e.add_point((0.0, 0.0)).unwrap();
        e.move_cursor((0.0, 5.0)).unwrap();
        assert_eq!(e.state(), EngineState::AngleActive);
        assert_eq!(e.add_point((0.0, 10.0)).unwrap(), EngineState::Idle);
        assert!((scalar(&e, 0) - 90.0).abs() < 1e-12);
    }

    #[test]
    fn area_closes_and_commits() {
        let mut e = engine(true);
        e.start(MeasurementKind::Area, "fluke").unwrap();
        for p in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
            e.add_point(p).unwrap();
        }
        e.move_cursor((5.0, -5.0)).unwrap();
        assert!(e.measurements()[0].is_closed());
        // Moving away from the crossing reopens the polygon.
        e.move_cursor((2.0, 5.0)).unwrap();
        assert!(!e.measurements()[0].is_closed());
        assert!(matches!(
            e.commit(),
            Err(MeasureError::InvalidTransition { .. })
        ));
        e.move_cursor((5.0, -5.0)).unwrap();
        assert_eq!(e.add_point((5.0, -5.0)).unwrap(), EngineState::Idle);
        assert!((scalar(&e, 0) - 250.0 / 3.0).abs() < 1e-9);
        let m = &e.measurements()[0];
        assert!(m.is_closed());
        assert_eq!(m.primitives().len(), 1);
    }

    #[test]
    fn explicit_commit() {
        let mut e = engine(true);
        e.start(MeasurementKind::Area, "patch").unwrap();
        for p in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
            e.add_point(p).unwrap();
        }
        e.move_cursor((5.0, -5.0)).unwrap();
        assert_eq!(e.commit().unwrap(), EngineState::Idle);
        assert!((scalar(&e, 0) - 250.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn area_closes_on_click() {
        let mut e = engine(true);
        e.start(MeasurementKind::Area, "fluke").unwrap();
        for p in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (5.0, -5.0)] {
            assert_eq!(e.add_point(p).unwrap(), EngineState::AreaActive);
        }
        assert!(e.measurements()[0].is_closed());
        assert_eq!(e.commit().unwrap(), EngineState::Idle);
        assert!((scalar(&e, 0) - 250.0 / 3.0).abs() < 1e-9);
        assert_eq!(e.measurements()[0].primitives().len(), 1);

        // Or a further click commits it.
        e.start(MeasurementKind::Area, "patch").unwrap();
        for p in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (5.0, -5.0)] {
            e.add_point(p).unwrap();
        }
        assert_eq!(e.add_point((50.0, 50.0)).unwrap(), EngineState::Idle);
        assert!((scalar(&e, 1) - 250.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn undo_on_empty_stack() {
        let mut e = engine(true);
        assert_eq!(e.undo(), EngineState::Idle);
        assert!(e.measurements().is_empty());
    }

    #[test]
    fn undo_steps_back_one_click() {
        let mut e = engine(false);
        e.start(MeasurementKind::Length, "body").unwrap();
        e.add_point((0.0, 0.0)).unwrap();
        e.add_point((10.0, 0.0)).unwrap();
        e.add_point((10.0, 10.0)).unwrap();
        e.move_cursor((20.0, 20.0)).unwrap();
        assert_eq!(e.undo(), EngineState::LengthActive);
        let m = &e.measurements()[0];
        assert_eq!(m.primitives().len(), 2);
        assert_eq!(m.segments().last().unwrap().p1, Point::new(20.0, 20.0));
        e.finish().unwrap();
        assert!((scalar(&e, 0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn undo_removes_fitted_length_whole() {
        let mut e = engine(true);
        measure_length(&mut e, "body", &[(0.0, 0.0), (50.0, 10.0), (100.0, 0.0)]);
        assert_eq!(e.undo(), EngineState::Idle);
        assert!(e.measurements().is_empty());
    }

    #[test]
    fn undo_skips_empty_measurement() {
        let mut e = engine(true);
        e.start(MeasurementKind::Angle, "fin").unwrap();
        for p in [(10.0, 0.0), (0.0, 0.0), (0.0, 10.0)] {
            e.add_point(p).unwrap();
        }
        e.start(MeasurementKind::Length, "nothing").unwrap();
        assert_eq!(e.undo(), EngineState::AngleActive);
        assert_eq!(e.measurements().len(), 1);
        let m = &e.measurements()[0];
        assert!(!m.is_complete());
        assert_eq!(m.value(SideBias::None), None);
    }

    #[test]
    fn start_while_active() {
        let mut e = engine(true);
        e.start(MeasurementKind::Area, "a").unwrap();
        assert_eq!(
            e.start(MeasurementKind::Length, "b"),
            Err(MeasureError::InvalidTransition {
                action: "start a measurement",
                state: EngineState::AreaActive,
            })
        );
        assert_eq!(e.measurements().len(), 1);
        assert_eq!(e.state(), EngineState::AreaActive);
    }

    #[test]
    fn events_while_idle() {
        let mut e = engine(true);
        assert!(e.add_point((1.0, 1.0)).is_err());
        assert!(e.finish().is_err());
        assert!(e.commit().is_err());
        assert_eq!(e.move_cursor((3.0, 3.0)).unwrap(), EngineState::Idle);
        assert!(e.start(MeasurementKind::Width, "w").is_err());
        assert_eq!(e.state(), EngineState::Idle);
    }

    #[test]
    fn width_profile() {
        let mut e = engine(true);
        measure_length(&mut e, "body", &[(100.0, 150.0), (200.0, 150.0), (300.0, 150.0)]);
        assert_eq!(
            e.start_width_sampling(3, Size::new(400.0, 300.0)).unwrap(),
            EngineState::Idle
        );
        let width = &e.measurements()[1];
        assert_eq!(width.kind(), MeasurementKind::Width);
        assert_eq!(width.name(), "body");
        assert_eq!(width.source(), Some(0));
        assert_eq!(width.stations().count(), 3);
        let labels = width
            .primitives()
            .iter()
            .filter(|p| matches!(p, Primitive::Label { .. }))
            .count();
        assert_eq!(labels, 2);
        let stations: Vec<_> = width.stations().collect();
        assert!(stations[0].station.point.distance(Point::new(150.0, 150.0)) < 1e-6);
        assert!(stations[2].station.point.distance(Point::new(250.0, 150.0)) < 1e-6);

        for w in profile(&e, 1, SideBias::None) {
            assert!((w.unwrap() - 20.0).abs() < 1e-6);
        }
        let moved = e.drag_handle(1, 0, Side::A, (170.0, 100.0)).unwrap();
        assert!(moved.distance(Point::new(150.0, 100.0)) < 1e-6);
        let near = |w: Option<f64>, expected: f64| (w.unwrap() - expected).abs() < 1e-6;
        assert!(near(profile(&e, 1, SideBias::None)[0], 60.0));
        assert!(near(profile(&e, 1, SideBias::SideA)[0], 100.0));
        assert!(near(profile(&e, 1, SideBias::SideB)[0], 20.0));

        let reports = e.results(SideBias::None);
        assert_eq!(reports.len(), 2);
        let rows = reports[1].rows();
        let names: Vec<&str> = rows.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["body_w25.0", "body_w50.0", "body_w75.0"]);
    }

    #[test]
    fn width_station_outside_image() {
        let mut e = engine(true);
        measure_length(&mut e, "body", &[(100.0, 150.0), (400.0, 150.0), (700.0, 150.0)]);
        e.start_width_sampling(3, (400.0, 300.0)).unwrap();
        let widths = profile(&e, 1, SideBias::None);
        assert_eq!(widths.len(), 3);
        assert!(widths[0].is_some());
        assert!(widths[1].is_some());
        assert_eq!(widths[2], None);
        assert_eq!(
            e.drag_handle(1, 2, Side::B, (0.0, 0.0)),
            Err(MeasureError::NoSuchHandle {
                measurement: 1,
                station: 2,
            })
        );
    }

    #[test]
    fn width_needs_fitted_length() {
        let mut e = engine(false);
        assert!(e.start_width_sampling(3, (400.0, 300.0)).is_err());
        measure_length(&mut e, "body", &[(0.0, 0.0), (100.0, 0.0)]);
        assert_eq!(
            e.start_width_sampling(3, (400.0, 300.0)),
            Err(MeasureError::InvalidTransition {
                action: "sample widths without a fitted length",
                state: EngineState::Idle,
            })
        );

        let mut e = engine(true);
        measure_length(&mut e, "body", &[(0.0, 50.0), (100.0, 50.0)]);
        assert!(e.start_width_sampling(0, (400.0, 300.0)).is_err());
        e.start(MeasurementKind::Angle, "fin").unwrap();
        assert!(e.start_width_sampling(3, (400.0, 300.0)).is_err());
        assert_eq!(e.measurements().len(), 2);
    }

    #[test]
    fn width_sampling_on_stalled_curve() {
        let mut e = engine(true);
        // The fitted cubic comes to rest at its midpoint, the only station.
        measure_length(&mut e, "stall", &[(0.0, 0.0), (10.0, 0.0), (0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(
            e.start_width_sampling(1, (400.0, 300.0)),
            Err(MeasureError::DegenerateCurve("zero tangent at station"))
        );
        assert_eq!(e.state(), EngineState::Idle);
        assert_eq!(e.measurements().len(), 1);
        assert_eq!(e.results(SideBias::None).len(), 1);
    }

    #[test]
    fn width_sampling_with_zero_tolerance() {
        let mut e = MeasurementEngine::new(EngineOptions {
            station_tolerance: 0.0,
            ..EngineOptions::default()
        });
        measure_length(&mut e, "body", &[(0.0, 50.0), (50.0, 80.0), (100.0, 50.0)]);
        assert!(matches!(
            e.start_width_sampling(3, (400.0, 300.0)),
            Err(MeasureError::InvalidOption(_))
        ));
        assert_eq!(e.state(), EngineState::Idle);
        assert_eq!(e.measurements().len(), 1);
    }

    #[test]
    fn undo_removes_width_profile() {
        let mut e = engine(true);
        measure_length(&mut e, "body", &[(0.0, 50.0), (100.0, 50.0)]);
        e.start_width_sampling(4, (400.0, 300.0)).unwrap();
        assert_eq!(e.undo(), EngineState::Idle);
        assert_eq!(e.measurements().len(), 1);
        assert_eq!(e.measurements()[0].kind(), MeasurementKind::Length);
    }
}

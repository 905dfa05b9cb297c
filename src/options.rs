// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunable parameters of the measurement engine.

use crate::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};

/// Options controlling how the engine fits curves and samples widths.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineOptions {
    /// Fit a Bézier curve through length vertices. When off, a length is the
    /// sum of its straight segments.
    pub bezier_fit: bool,
    /// Number of points a fitted curve is sampled at for drawing.
    pub curve_samples: usize,
    /// Slack, in pixels, when testing whether a normal crossing lies on the
    /// image boundary.
    pub boundary_margin: f64,
    /// Parameter space tolerance of the station solver.
    pub station_tolerance: f64,
    /// Iteration cap of the station solver.
    pub max_iterations: usize,
    /// Initial distance of a width handle from the centre line, in pixels.
    pub handle_offset: f64,
    /// Distance of the "A" and "B" labels from the centre line, in pixels.
    pub label_offset: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            bezier_fit: true,
            curve_samples: 100,
            boundary_margin: 1.0,
            station_tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            handle_offset: 10.0,
            label_offset: 500.0,
        }
    }
}

impl EngineOptions {
    /// The same options with curve fitting switched on or off.
    #[inline]
    pub fn with_bezier_fit(self, bezier_fit: bool) -> Self {
        EngineOptions { bezier_fit, ..self }
    }
}

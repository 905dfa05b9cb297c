// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by the measurement geometry.

use crate::EngineState;

/// Everything that can go wrong while measuring.
///
/// `DegenerateCurve` and `ConvergenceFailure` are fatal to the measurement
/// being built; the engine discards it. `BoundaryAnomaly` only invalidates a
/// single width station. `InvalidTransition` is rejected before any state
/// changes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum MeasureError {
    /// The control polygon does not define a curve with a usable tangent.
    #[error("degenerate curve: {0}")]
    DegenerateCurve(&'static str),
    /// A bracketed root search hit its iteration cap.
    #[error("root finding did not converge within {iterations} iterations")]
    ConvergenceFailure {
        /// The iteration cap that was reached.
        iterations: usize,
    },
    /// A station normal did not cross the image boundary exactly twice.
    #[error("station normal crosses the image boundary {found} times, expected 2")]
    BoundaryAnomaly {
        /// Number of distinct crossings found.
        found: usize,
    },
    /// The requested event is not valid in the engine's current state.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        /// What the caller tried to do.
        action: &'static str,
        /// The state the engine was in.
        state: EngineState,
    },
    /// A solver parameter that cannot be honoured, such as a tolerance that
    /// is not positive.
    #[error("invalid option: {0}")]
    InvalidOption(&'static str),
    /// Camera parameters that cannot produce a pixel scale.
    #[error("invalid calibration: {0}")]
    InvalidCalibration(&'static str),
    /// A width handle lookup named a measurement or station that does not exist.
    #[error("no width station {station} in measurement {measurement}")]
    NoSuchHandle {
        /// Index into the measurement stack.
        measurement: usize,
        /// Index of the station within the profile.
        station: usize,
    },
}

#[cfg(test)]
mod tests {
    use crate::{EngineState, MeasureError};

    #[test]
    fn messages() {
        let err = MeasureError::InvalidTransition {
            action: "sample widths",
            state: EngineState::AreaActive,
        };
        assert_eq!(err.to_string(), "cannot sample widths while measuring an area");
        let err = MeasureError::BoundaryAnomaly { found: 3 };
        assert_eq!(
            err.to_string(),
            "station normal crosses the image boundary 3 times, expected 2"
        );
    }
}

// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measurement geometry for calibrated photographs.
//!
//! The morphometrix library turns points clicked on an image into lengths,
//! width profiles, angles and areas. A length can be a smooth Bézier curve
//! through its vertices, measured by Gauss-Legendre quadrature; a width
//! profile samples a fitted length at equal arc length stations and spans
//! each station's normal to the image boundary; an area closes when the
//! outline crosses itself.
//!
//! Everything is in image pixels. [`Calibration`] converts to metres.
//!
//! # Examples
//!
//! Measuring a length and its widths:
//! ```
//! use morphometrix::{EngineOptions, MeasurementEngine, MeasurementKind, SideBias, Size};
//!
//! let mut engine = MeasurementEngine::new(EngineOptions::default());
//! engine.start(MeasurementKind::Length, "total length").unwrap();
//! for p in [(100.0, 300.0), (400.0, 260.0), (700.0, 300.0)] {
//!     engine.add_point(p).unwrap();
//! }
//! engine.finish().unwrap();
//! engine.start_width_sampling(9, Size::new(800.0, 600.0)).unwrap();
//!
//! let reports = engine.results(SideBias::None);
//! assert_eq!(reports.len(), 2);
//! assert_eq!(reports[1].rows()[0].0, "total length_w10.0");
//! ```
//!
//! Arc length of a curve directly:
//!
//! ```
//! use morphometrix::{FittedCurve, ParamCurveArclen, Point};
//!
//! let curve = FittedCurve::fit(&[
//!     Point::new(0.0, 0.0),
//!     Point::new(0.5, 0.0),
//!     Point::new(1.0, 1.0),
//! ])
//! .unwrap();
//! let exact = 0.5 * 5.0f64.sqrt() + 0.25 * (2.0 + 5.0f64.sqrt()).ln();
//! assert!((curve.arclen() - exact).abs() < 1e-9);
//! ```
//!
//! # Logging
//!
//! Diagnostics go through the [`log`] facade: state transitions and fits at
//! `debug`, discarded measurements and invalid width stations at `warn`. No
//! logger is installed by this crate.
//!
//! # Features
//!
//! - `serde`: `Serialize` and `Deserialize` for the geometry types,
//!   [`EngineOptions`] and [`Calibration`].
//! - `mint`: conversions to and from [`mint`] points and vectors.
//!
//! [`log`]: https://docs.rs/log
//! [`mint`]: https://docs.rs/mint

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::doc_markdown, rustdoc::broken_intra_doc_links)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(unused_qualifications)]
#![allow(
    clippy::unreadable_literal,
    clippy::many_single_char_names,
    clippy::excessive_precision
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod arclen;
mod bezier;
mod boundary;
mod calibration;
pub mod common;
mod engine;
mod error;
mod line;
mod measurement;
mod options;
mod param_curve;
mod point;
mod polygon;
mod rect;
mod size;
mod station;
mod vec2;

pub use crate::arclen::*;
pub use crate::bezier::*;
pub use crate::boundary::*;
pub use crate::calibration::*;
pub use crate::engine::*;
pub use crate::error::*;
pub use crate::line::*;
pub use crate::measurement::*;
pub use crate::options::*;
pub use crate::param_curve::*;
pub use crate::point::*;
pub use crate::polygon::*;
pub use crate::rect::*;
pub use crate::size::*;
pub use crate::station::*;
pub use crate::vec2::*;

// Copyright 2024 the MorphoMetriX Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion from image pixels to metres for a nadir photograph.

use crate::{MeasureError, Size};

/// Camera and flight parameters of a nadir (straight down) photograph.
///
/// The ground size of one pixel is
/// `display_scale · pixel_dimension · altitude / focal_length`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Calibration {
    /// Lens focal length, in millimetres.
    pub focal_length_mm: f64,
    /// Camera height above the subject, in metres.
    pub altitude_m: f64,
    /// Sensor pixel pitch, in millimetres per pixel.
    pub pixel_dimension_mm: f64,
    /// Image pixels per measured pixel, when measuring on a resampled copy.
    pub display_scale: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration {
            focal_length_mm: 25.0,
            altitude_m: 50.0,
            pixel_dimension_mm: 0.0045,
            display_scale: 1.0,
        }
    }
}

impl Calibration {
    /// Set the display scale from the full image size and the size it was
    /// measured at.
    pub fn with_display(self, image: Size, displayed: Size) -> Calibration {
        Calibration {
            display_scale: image.max_side() / displayed.max_side(),
            ..self
        }
    }

    /// Ground distance covered by one pixel, in metres.
    ///
    /// # Errors
    ///
    /// [`MeasureError::InvalidCalibration`] if the focal length is not
    /// positive, or the result is not finite.
    pub fn metres_per_pixel(&self) -> Result<f64, MeasureError> {
        if !(self.focal_length_mm > 0.0) {
            return Err(MeasureError::InvalidCalibration(
                "focal length must be positive",
            ));
        }
        let scale =
            self.display_scale * self.pixel_dimension_mm * self.altitude_m / self.focal_length_mm;
        if scale.is_finite() {
            Ok(scale)
        } else {
            Err(MeasureError::InvalidCalibration("pixel scale is not finite"))
        }
    }

    /// Convert a length in pixels to metres.
    ///
    /// # Errors
    ///
    /// As for [`Calibration::metres_per_pixel`].
    pub fn length_m(&self, pixels: f64) -> Result<f64, MeasureError> {
        Ok(pixels * self.metres_per_pixel()?)
    }

    /// Convert an area in square pixels to square metres.
    ///
    /// # Errors
    ///
    /// As for [`Calibration::metres_per_pixel`].
    pub fn area_m2(&self, square_pixels: f64) -> Result<f64, MeasureError> {
        let s = self.metres_per_pixel()?;
        Ok(square_pixels * s * s)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Calibration, MeasureError, Size};

    #[test]
    fn default_scale() {
        let c = Calibration::default();
        let s = c.metres_per_pixel().unwrap();
        assert!((s - 0.009).abs() < 1e-15);
        assert!((c.length_m(1000.0).unwrap() - 9.0).abs() < 1e-12);
        assert!((c.area_m2(10_000.0).unwrap() - 0.81).abs() < 1e-12);
    }

    #[test]
    fn display_scale() {
        let c = Calibration::default()
            .with_display(Size::new(6000.0, 4000.0), Size::new(1500.0, 1000.0));
        assert_eq!(c.display_scale, 4.0);
        assert!((c.length_m(250.0).unwrap() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn bad_focal_length() {
        let c = Calibration {
            focal_length_mm: 0.0,
            ..Calibration::default()
        };
        assert!(matches!(
            c.metres_per_pixel(),
            Err(MeasureError::InvalidCalibration(_))
        ));
        let c = Calibration {
            focal_length_mm: f64::NAN,
            ..Calibration::default()
        };
        assert!(c.length_m(1.0).is_err());
    }
}

//! Color space conversion utilities
//!
//! Bridges between the three color representations the detector touches:
//! - BGR frames from the capture side (OpenCV native order)
//! - 8-bit HSV buffers the bands are thresholded against
//! - `palette` colors used for configuration and reporting

use opencv::{
    core::{Mat, Scalar, Vector},
    imgproc::{cvt_color_def, COLOR_BGR2HSV},
    prelude::*,
};
use palette::{Hsv, Srgb};

use crate::color::HsvTriple;
use crate::{DetectorError, Result};

/// Convert a BGR frame to OpenCV 8-bit HSV (H in [0, 179])
///
/// The result is a freshly allocated buffer; the input frame is not retained.
pub fn bgr_to_hsv(frame: &Mat) -> Result<Mat> {
    let mut hsv = Mat::default();
    cvt_color_def(frame, &mut hsv, COLOR_BGR2HSV)
        .map_err(|e| DetectorError::opencv("BGR to HSV conversion", e))?;
    Ok(hsv)
}

/// HSV bound as a per-channel array for `in_range`
pub fn hsv_bound(bound: HsvTriple) -> Vector<u8> {
    Vector::from_slice(&bound.channels())
}

/// Display color as an OpenCV scalar in BGR order
pub fn display_scalar(color: Srgb<u8>) -> Scalar {
    Scalar::new(color.blue as f64, color.green as f64, color.red as f64, 0.0)
}

/// Convert an 8-bit OpenCV HSV triple to a normalized `palette` HSV color
///
/// Hue is doubled back to degrees, saturation and value scaled to [0, 1].
pub fn to_palette_hsv(triple: HsvTriple) -> Hsv {
    Hsv::new(
        triple.h as f32 * 2.0,
        triple.s as f32 / 255.0,
        triple.v as f32 / 255.0,
    )
}

/// Hexadecimal representation of an 8-bit sRGB color (e.g. "#FF1493")
pub fn srgb_to_hex(color: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

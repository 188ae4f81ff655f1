//! Per-band binary masks
//!
//! Thresholds the shared HSV buffer against one band, removes speckle with a
//! morphological open and seals small gaps with a close, then extracts the
//! outer boundaries of what is left. Masks never outlive one band of one frame.

use opencv::{
    core::{in_range, Mat, Point, Scalar, Size, Vector, BORDER_CONSTANT},
    imgproc::{
        find_contours, get_structuring_element, morphology_default_border_value, morphology_ex,
        CHAIN_APPROX_SIMPLE, MORPH_CLOSE, MORPH_OPEN, MORPH_RECT, RETR_EXTERNAL,
    },
    prelude::*,
};

use crate::color::{conversion::hsv_bound, ColorSpec};
use crate::{DetectorError, Result};

/// Contour point list as produced by OpenCV
pub type Contour = Vector<Point>;

/// Binary mask of pixels inside `band` on every channel (inclusive bounds)
pub fn band_mask(hsv: &Mat, band: &ColorSpec) -> Result<Mat> {
    let mut mask = Mat::default();
    in_range(hsv, &hsv_bound(band.lower), &hsv_bound(band.upper), &mut mask)
        .map_err(|e| DetectorError::opencv(format!("in_range for band {}", band.label), e))?;
    Ok(mask)
}

/// Open-then-close cleanup with a square structuring element
pub struct MaskCleaner {
    kernel: Mat,
    border_value: Scalar,
}

impl MaskCleaner {
    /// Create a cleaner with a `kernel_size` x `kernel_size` square element
    pub fn new(kernel_size: i32) -> Result<Self> {
        if kernel_size < 1 {
            return Err(DetectorError::invalid_parameter("morph_kernel_size", kernel_size));
        }

        let kernel = get_structuring_element(
            MORPH_RECT,
            Size::new(kernel_size, kernel_size),
            Point::new(-1, -1),
        )
        .map_err(|e| DetectorError::opencv("structuring element creation", e))?;

        let border_value = morphology_default_border_value()
            .map_err(|e| DetectorError::opencv("morphology border value", e))?;

        Ok(Self { kernel, border_value })
    }

    /// Opening first so speckle is gone before closing can merge it into blobs
    pub fn clean(&self, mask: &Mat) -> Result<Mat> {
        let mut opened = Mat::default();
        morphology_ex(
            mask,
            &mut opened,
            MORPH_OPEN,
            &self.kernel,
            Point::new(-1, -1),
            1,
            BORDER_CONSTANT,
            self.border_value,
        )
        .map_err(|e| DetectorError::opencv("mask opening", e))?;

        let mut closed = Mat::default();
        morphology_ex(
            &opened,
            &mut closed,
            MORPH_CLOSE,
            &self.kernel,
            Point::new(-1, -1),
            1,
            BORDER_CONSTANT,
            self.border_value,
        )
        .map_err(|e| DetectorError::opencv("mask closing", e))?;

        Ok(closed)
    }
}

/// Outer boundaries of connected regions; holes are ignored
pub fn external_contours(mask: &Mat) -> Result<Vector<Contour>> {
    let mut contours = Vector::<Contour>::new();
    find_contours(
        mask,
        &mut contours,
        RETR_EXTERNAL,
        CHAIN_APPROX_SIMPLE,
        Point::new(0, 0),
    )
    .map_err(|e| DetectorError::opencv("contour extraction", e))?;
    Ok(contours)
}

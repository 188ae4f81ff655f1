//! Frame acquisition
//!
//! Frames reach the pipeline as OpenCV `Mat`s in BGR order, from either a
//! live camera or a still image on disk.
//!
//! ## Still images
//!
//! Standard formats (JPEG, PNG, GIF, WebP, TIFF, BMP, ...) are decoded with
//! the `image` crate and converted to BGR so downstream processing sees the
//! same layout as camera frames.

use std::path::Path;

use log::info;
use opencv::{
    core::{Mat, Scalar, CV_8UC3},
    prelude::*,
    videoio::{VideoCapture, CAP_ANY},
};

use crate::{DetectorError, Result};

/// Source of BGR frames for the capture loop
pub trait FrameSource {
    /// Next frame, `Ok(None)` once the source is exhausted or stops delivering
    fn next_frame(&mut self) -> Result<Option<Mat>>;
}

/// Live camera opened through OpenCV's video I/O
pub struct CameraSource {
    capture: VideoCapture,
    index: i32,
}

impl CameraSource {
    /// Open camera `index`
    ///
    /// # Errors
    ///
    /// Returns `DetectorError::Capture` if the device cannot be opened.
    pub fn open(index: i32) -> Result<Self> {
        let capture = VideoCapture::new(index, CAP_ANY)
            .map_err(|e| DetectorError::opencv(format!("open camera {}", index), e))?;

        let opened = capture
            .is_opened()
            .map_err(|e| DetectorError::opencv("camera status", e))?;
        if !opened {
            return Err(DetectorError::Capture {
                reason: format!("Could not open camera {}", index),
            });
        }

        info!("Camera {} opened successfully", index);
        Ok(Self { capture, index })
    }

    pub fn index(&self) -> i32 {
        self.index
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        let grabbed = self
            .capture
            .read(&mut frame)
            .map_err(|e| DetectorError::opencv("camera read", e))?;
        Ok(grabbed.then_some(frame))
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        if self.capture.release().is_ok() {
            info!("Camera {} released", self.index);
        }
    }
}

/// Single still image delivered once
pub struct StillImageSource {
    frame: Option<Mat>,
}

impl StillImageSource {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            frame: Some(load_image(path)?),
        })
    }

    pub fn from_frame(frame: Mat) -> Self {
        Self { frame: Some(frame) }
    }
}

impl FrameSource for StillImageSource {
    fn next_frame(&mut self) -> Result<Option<Mat>> {
        Ok(self.frame.take())
    }
}

/// Load an image from disk as a BGR `Mat`
///
/// # Errors
///
/// Returns `DetectorError::ImageLoad` if the file cannot be opened, its
/// format is unknown, or decoding fails.
pub fn load_image(path: &Path) -> Result<Mat> {
    let reader = image::ImageReader::open(path).map_err(|e| {
        DetectorError::image_load(format!("Failed to open image file: {}", path.display()), e)
    })?;
    let reader = reader.with_guessed_format().map_err(|e| {
        DetectorError::image_load(format!("Failed to detect format: {}", path.display()), e)
    })?;
    let decoded = reader.decode().map_err(|e| {
        DetectorError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    rgb_to_bgr_mat(rgb.as_raw(), width as i32, height as i32)
}

/// Check if a path has an extension the still image loader understands
pub fn is_supported_image(path: &Path) -> bool {
    image::ImageFormat::from_path(path)
        .map(|format| format.reading_enabled())
        .unwrap_or(false)
}

/// Copy a packed RGB buffer into a new BGR `Mat`
fn rgb_to_bgr_mat(rgb_data: &[u8], width: i32, height: i32) -> Result<Mat> {
    let expected = width as usize * height as usize * 3;
    if rgb_data.len() != expected {
        return Err(DetectorError::ImageLoad {
            message: format!(
                "RGB buffer holds {} bytes, expected {} for {}x{}",
                rgb_data.len(),
                expected,
                width,
                height
            ),
            source: None,
        });
    }

    let mut mat = Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(0.0))
        .map_err(|e| DetectorError::opencv("frame allocation", e))?;

    let bgr = mat
        .data_bytes_mut()
        .map_err(|e| DetectorError::opencv("frame buffer access", e))?;
    for (dst, src) in bgr.chunks_exact_mut(3).zip(rgb_data.chunks_exact(3)) {
        dst[0] = src[2];
        dst[1] = src[1];
        dst[2] = src[0];
    }

    Ok(mat)
}

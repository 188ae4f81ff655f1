//! # SmartView
//!
//! Live multi-color post-it detection for camera streams.
//!
//! For every frame the detector:
//! - Converts the BGR frame to HSV once
//! - Thresholds each configured color band and cleans the mask
//! - Keeps outer contours that approximate to near-square quadrilaterals
//! - Returns labeled bounding boxes for the overlay to draw
//!
//! ## Example
//!
//! ```rust,no_run
//! use smartview::{capture::load_image, detect_post_its, DetectorConfig};
//! use std::path::Path;
//!
//! let config = DetectorConfig::default_post_it();
//! let frame = load_image(Path::new("desk.jpg"))?;
//! for detection in detect_post_its(&frame, &config)? {
//!     println!("{} at {:?}", detection.label, detection.bounding_box);
//! }
//! # Ok::<(), smartview::DetectorError>(())
//! ```

use opencv::core::Mat;

pub mod capture;
pub mod color;
pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod overlay;
pub mod probe;

pub use color::{ColorBandRegistry, ColorSpec, HsvTriple};
pub use config::{DetectorConfig, ProcessingParams};
pub use detection::{BoundingBox, Detection, FrameDetectionPipeline};
pub use error::{DetectorError, Result};
pub use overlay::OverlayRenderer;
pub use probe::{HsvFrameContext, InteractiveProbe, ProbeReading};

/// Run the full pipeline once on a BGR frame
///
/// Validates `config`, builds a pipeline and processes the frame. Capture
/// loops should build the [`FrameDetectionPipeline`] once and reuse it.
///
/// # Errors
///
/// Returns `DetectorError` if the configuration is invalid or an OpenCV
/// operation fails. A frame without matches is not an error.
pub fn detect_post_its(frame: &Mat, config: &DetectorConfig) -> Result<Vec<Detection>> {
    let registry = config.registry()?;
    let pipeline = FrameDetectionPipeline::new(&config.processing)?;
    pipeline.process(frame, registry.bands())
}

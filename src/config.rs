//! Configuration structures for the post-it detector.
//!
//! This module defines the color bands and every tunable parameter of the
//! detection pipeline, the overlay and the live capture loop.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use smartview::DetectorConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = DetectorConfig::from_json_file(Path::new("smartview.json"))?;
//!
//! // Or use the built-in GREEN / YELLOW / PINK bands
//! let config = DetectorConfig::default_post_it();
//! let registry = config.registry()?;
//! # Ok::<(), smartview::DetectorError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - `bands`: ordered [`ColorSpec`] list (processing and draw order)
//! - [`ProcessingParams`]: shape filters and mask cleanup
//! - [`OverlayConfig`]: annotation styling
//! - [`CaptureConfig`]: camera, window and loop settings

use std::path::Path;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::color::{ColorBandRegistry, ColorSpec, HsvTriple};
use crate::constants::{capture, overlay, processing};
use crate::{DetectorError, Result};

/// Complete detector configuration.
///
/// Loaded once at startup; validated before any frame is processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Color bands in processing order
    pub bands: Vec<ColorSpec>,

    /// Pipeline parameters
    #[serde(default)]
    pub processing: ProcessingParams,

    /// Overlay styling
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Live capture settings
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// Inclusive width / height ratio range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatioRange {
    pub min: f64,
    pub max: f64,
}

impl AspectRatioRange {
    pub fn contains(&self, ratio: f64) -> bool {
        self.min <= ratio && ratio <= self.max
    }
}

impl Default for AspectRatioRange {
    fn default() -> Self {
        Self {
            min: processing::MIN_ASPECT_RATIO,
            max: processing::MAX_ASPECT_RATIO,
        }
    }
}

/// Shape filtering and mask cleanup parameters.
///
/// The structuring element is a square of `morph_kernel_size` pixels; it
/// should scale with the expected target size at the capture resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingParams {
    /// Minimum enclosed contour area in pixels²
    pub min_area: f64,

    /// Polygon approximation epsilon as fraction of perimeter
    pub approx_tolerance: f64,

    /// Side of the square structuring element for open/close
    pub morph_kernel_size: i32,

    /// Accepted bounding box aspect ratios
    pub aspect_ratio: AspectRatioRange,
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self {
            min_area: processing::MIN_AREA,
            approx_tolerance: processing::APPROX_TOLERANCE,
            morph_kernel_size: processing::MORPH_KERNEL_SIZE,
            aspect_ratio: AspectRatioRange::default(),
        }
    }
}

impl ProcessingParams {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !self.min_area.is_finite() || self.min_area < 0.0 {
            return Err(DetectorError::invalid_parameter("min_area", self.min_area));
        }
        if !(self.approx_tolerance > 0.0 && self.approx_tolerance < 1.0) {
            return Err(DetectorError::invalid_parameter("approx_tolerance", self.approx_tolerance));
        }
        if self.morph_kernel_size < 1 {
            return Err(DetectorError::invalid_parameter("morph_kernel_size", self.morph_kernel_size));
        }
        let range = self.aspect_ratio;
        if !(range.min > 0.0 && range.min <= range.max && range.max.is_finite()) {
            return Err(DetectorError::invalid_parameter(
                "aspect_ratio",
                format!("[{}, {}]", range.min, range.max),
            ));
        }
        Ok(())
    }
}

/// Overlay annotation styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Rectangle line thickness
    pub box_thickness: i32,

    /// Label font scale
    pub font_scale: f64,

    /// Label stroke thickness
    pub text_thickness: i32,

    /// Gap between label and box top
    pub text_offset: i32,

    /// Text appended to the band label
    pub label_suffix: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            box_thickness: overlay::BOX_THICKNESS,
            font_scale: overlay::FONT_SCALE,
            text_thickness: overlay::TEXT_THICKNESS,
            text_offset: overlay::TEXT_OFFSET,
            label_suffix: overlay::LABEL_SUFFIX.to_string(),
        }
    }
}

/// Live capture loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Camera device index
    pub camera_index: i32,

    /// Display window title
    pub window_title: String,

    /// Key that ends the loop
    pub quit_key: char,

    /// Key poll delay per frame (ms)
    pub frame_wait_ms: i32,

    /// Consecutive empty frames tolerated before stopping
    pub max_consecutive_empty_frames: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            camera_index: capture::CAMERA_INDEX,
            window_title: capture::WINDOW_TITLE.to_string(),
            quit_key: capture::QUIT_KEY,
            frame_wait_ms: capture::FRAME_WAIT_MS,
            max_consecutive_empty_frames: capture::MAX_CONSECUTIVE_EMPTY_FRAMES,
        }
    }
}

impl DetectorConfig {
    /// GREEN, YELLOW and PINK post-it bands with reference parameters
    pub fn default_post_it() -> Self {
        Self {
            bands: vec![
                ColorSpec::new(
                    "GREEN",
                    HsvTriple::new(35, 40, 40),
                    HsvTriple::new(85, 255, 255),
                    Srgb::new(0, 255, 0),
                ),
                ColorSpec::new(
                    "YELLOW",
                    HsvTriple::new(20, 80, 80),
                    HsvTriple::new(30, 255, 255),
                    Srgb::new(255, 255, 0),
                ),
                ColorSpec::new(
                    "PINK",
                    HsvTriple::new(140, 80, 80),
                    HsvTriple::new(179, 255, 255),
                    Srgb::new(255, 20, 147),
                ),
            ],
            processing: ProcessingParams::default(),
            overlay: OverlayConfig::default(),
            capture: CaptureConfig::default(),
        }
    }

    /// Validate bands and parameters
    pub fn validate(&self) -> Result<()> {
        ColorBandRegistry::new(self.bands.clone())?;
        self.processing.validate()?;
        if self.overlay.box_thickness < 1 || self.overlay.text_thickness < 1 {
            return Err(DetectorError::invalid_parameter(
                "overlay thickness",
                format!("box {} / text {}", self.overlay.box_thickness, self.overlay.text_thickness),
            ));
        }
        if !(self.overlay.font_scale > 0.0) {
            return Err(DetectorError::invalid_parameter("font_scale", self.overlay.font_scale));
        }
        if !self.capture.quit_key.is_ascii() {
            return Err(DetectorError::invalid_parameter("quit_key", self.capture.quit_key));
        }
        Ok(())
    }

    /// Build the validated band registry
    pub fn registry(&self) -> Result<ColorBandRegistry> {
        ColorBandRegistry::new(self.bands.clone())
    }

    /// Load configuration from JSON file and validate it
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DetectorError::config_load(format!("cannot read {}", path.display()), e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| DetectorError::config_load(format!("cannot parse {}", path.display()), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DetectorError::output("cannot serialize configuration", e))?;
        std::fs::write(path, json)
            .map_err(|e| DetectorError::output(format!("cannot write {}", path.display()), e))?;
        Ok(())
    }
}

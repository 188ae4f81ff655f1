//! Reference defaults for the post-it detector
//!
//! Tuned values that seed
//! [`DetectorConfig::default_post_it`](crate::config::DetectorConfig::default_post_it).
//! Processing and overlay values reach the pipeline only through the
//! validated configuration.

/// OpenCV 8-bit HSV channel range; saturation and value span the full byte
pub mod hsv {
    /// Maximum hue value (OpenCV stores hue as degrees / 2)
    pub const HUE_MAX: u8 = 179;
}

/// Shape filtering and mask cleanup parameters
pub mod processing {
    /// Minimum contour area in pixels²
    pub const MIN_AREA: f64 = 2000.0;

    /// Polygon approximation tolerance as fraction of the contour perimeter
    pub const APPROX_TOLERANCE: f64 = 0.04;

    /// Side of the square structuring element used for open/close
    pub const MORPH_KERNEL_SIZE: i32 = 5;

    /// Inclusive width/height ratio range for a near-square box
    pub const MIN_ASPECT_RATIO: f64 = 0.7;
    pub const MAX_ASPECT_RATIO: f64 = 1.3;

    /// Vertex count a candidate polygon must have
    pub const QUADRILATERAL_VERTICES: usize = 4;
}

/// Overlay drawing parameters
pub mod overlay {
    /// Bounding rectangle line thickness
    pub const BOX_THICKNESS: i32 = 3;

    /// Label font scale (Hershey simplex)
    pub const FONT_SCALE: f64 = 0.7;

    /// Label stroke thickness
    pub const TEXT_THICKNESS: i32 = 2;

    /// Vertical gap between label baseline and box top
    pub const TEXT_OFFSET: i32 = 10;

    /// Appended to the band label in the overlay text
    pub const LABEL_SUFFIX: &str = " POST-IT";
}

/// Live capture defaults
pub mod capture {
    /// Default camera index
    pub const CAMERA_INDEX: i32 = 0;

    /// Display window title
    pub const WINDOW_TITLE: &str = "SmartView - Multi-Color Post-it Detector";

    /// Key that ends the capture loop
    pub const QUIT_KEY: char = 'q';

    /// Key poll delay between frames
    pub const FRAME_WAIT_MS: i32 = 1;

    /// Consecutive empty frames tolerated before the loop gives up
    pub const MAX_CONSECUTIVE_EMPTY_FRAMES: u32 = 30;
}

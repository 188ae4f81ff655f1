//! Color bands and color space conversion
//!
//! This module holds the named HSV bands the detector searches for, the
//! ordered registry they live in, and the conversions between BGR frames,
//! HSV buffers and display colors.

pub mod band;
pub mod conversion;
pub mod registry;

pub use band::{ColorSpec, HsvTriple};
pub use registry::ColorBandRegistry;

//! Post-it detection module
//!
//! This module turns one BGR frame into labeled bounding boxes: per-band
//! masking and cleanup, contour extraction, and the shape rules a region
//! must pass to count as a post-it.

pub mod filters;
pub mod mask;
pub mod pipeline;

pub use filters::{Rejection, ShapeFilter};
pub use pipeline::{BoundingBox, Detection, FrameDetectionPipeline, Verdict};

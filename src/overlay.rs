//! Detection overlay rendering
//!
//! Draws each detection's box and label onto the display frame in
//! detection order, so later entries paint over earlier ones.

use log::warn;
use opencv::{
    core::{Mat, Point},
    imgproc::{put_text, rectangle, FONT_HERSHEY_SIMPLEX, LINE_8},
};

use crate::color::{conversion::display_scalar, ColorBandRegistry};
use crate::config::OverlayConfig;
use crate::detection::Detection;
use crate::{DetectorError, Result};

/// Draws detections with the display color of their band
pub struct OverlayRenderer {
    config: OverlayConfig,
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

impl OverlayRenderer {
    pub fn new(config: OverlayConfig) -> Self {
        Self { config }
    }

    /// Text drawn above a detection
    pub fn caption(&self, detection: &Detection) -> String {
        format!("{}{}", detection.label, self.config.label_suffix)
    }

    /// Draw every detection onto `frame`
    ///
    /// Detections whose label is not in the registry are skipped.
    pub fn draw(
        &self,
        frame: &mut Mat,
        detections: &[Detection],
        registry: &ColorBandRegistry,
    ) -> Result<()> {
        for detection in detections {
            let Some(band) = registry.get(&detection.label) else {
                warn!("No color band named {}, skipping overlay", detection.label);
                continue;
            };
            let color = display_scalar(band.display_color);
            let bbox = detection.bounding_box;

            rectangle(frame, bbox.to_rect(), color, self.config.box_thickness, LINE_8, 0)
                .map_err(|e| DetectorError::opencv("overlay rectangle", e))?;

            put_text(
                frame,
                &self.caption(detection),
                Point::new(bbox.x, bbox.y - self.config.text_offset),
                FONT_HERSHEY_SIMPLEX,
                self.config.font_scale,
                color,
                self.config.text_thickness,
                LINE_8,
                false,
            )
            .map_err(|e| DetectorError::opencv("overlay label", e))?;
        }
        Ok(())
    }
}

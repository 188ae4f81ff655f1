//! Pixel inspection of the latest HSV frame
//!
//! The capture loop owns an [`HsvFrameContext`] and hands it to both the
//! pipeline, which publishes each frame's HSV buffer, and the
//! [`InteractiveProbe`], which reads it when the user clicks the window.
//! Publishing swaps the whole buffer under a lock, so a probe running on the
//! window event thread never observes a half-written frame.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use opencv::{
    core::{Mat, Vec3b},
    prelude::*,
};
use palette::Hsv;

use crate::color::{conversion::to_palette_hsv, HsvTriple};
use crate::{DetectorError, Result};

/// Holder of the most recently published HSV frame
#[derive(Default)]
pub struct HsvFrameContext {
    latest: Mutex<Option<Mat>>,
}

impl HsvFrameContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Mat>> {
        // the buffer is only ever replaced whole, a poisoned lock still holds a complete frame
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the published frame
    pub fn publish(&self, hsv: Mat) {
        *self.lock() = Some(hsv);
    }

    pub fn has_frame(&self) -> bool {
        self.lock().is_some()
    }

    /// (width, height) of the published frame
    pub fn dimensions(&self) -> Option<(i32, i32)> {
        self.lock().as_ref().map(|hsv| (hsv.cols(), hsv.rows()))
    }

    /// HSV value at column `x`, row `y`
    ///
    /// Returns `Ok(None)` when nothing has been published yet or the point
    /// lies outside the published frame.
    pub fn sample(&self, x: i32, y: i32) -> Result<Option<HsvTriple>> {
        let guard = self.lock();
        let Some(hsv) = guard.as_ref() else {
            return Ok(None);
        };

        if x < 0 || y < 0 || x >= hsv.cols() || y >= hsv.rows() {
            return Ok(None);
        }

        let pixel = hsv
            .at_2d::<Vec3b>(y, x)
            .map_err(|e| DetectorError::opencv("HSV pixel access", e))?;
        Ok(Some(HsvTriple::new(pixel[0], pixel[1], pixel[2])))
    }
}

/// One probe report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReading {
    pub x: i32,
    pub y: i32,
    pub hsv: HsvTriple,
}

impl ProbeReading {
    /// Normalized HSV (hue in degrees)
    pub fn to_palette(&self) -> Hsv {
        to_palette_hsv(self.hsv)
    }
}

impl fmt::Display for ProbeReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Clicked at ({}, {}) -> HSV: [{}, {}, {}]",
            self.x, self.y, self.hsv.h, self.hsv.s, self.hsv.v
        )
    }
}

/// Click-to-inspect side channel; never feeds back into detection
#[derive(Clone)]
pub struct InteractiveProbe {
    context: Arc<HsvFrameContext>,
}

impl InteractiveProbe {
    pub fn new(context: Arc<HsvFrameContext>) -> Self {
        Self { context }
    }

    /// Report the HSV value under a pointer press
    ///
    /// Silent when no frame has been processed or the press is off-frame.
    pub fn on_pointer_press(&self, x: i32, y: i32) -> Option<ProbeReading> {
        match self.context.sample(x, y) {
            Ok(Some(hsv)) => {
                let reading = ProbeReading { x, y, hsv };
                info!("{}", reading);
                let normalized = reading.to_palette();
                debug!(
                    "  hue {:.0} deg, saturation {:.2}, value {:.2}",
                    normalized.hue.into_positive_degrees(),
                    normalized.saturation,
                    normalized.value
                );
                Some(reading)
            }
            Ok(None) => {
                debug!("Probe at ({}, {}) has no frame data", x, y);
                None
            }
            Err(e) => {
                warn!("Probe at ({}, {}) failed: {}", x, y, e);
                None
            }
        }
    }

    /// Window mouse callback entry point; only left-button presses probe
    pub fn handle_mouse_event(&self, event: i32, x: i32, y: i32) -> Option<ProbeReading> {
        if event == opencv::highgui::EVENT_LBUTTONDOWN {
            self.on_pointer_press(x, y)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    fn hsv_frame(h: f64, s: f64, v: f64) -> Mat {
        Mat::new_rows_cols_with_default(20, 30, CV_8UC3, Scalar::new(h, s, v, 0.0)).unwrap()
    }

    #[test]
    fn test_probe_before_first_frame_is_silent() {
        let probe = InteractiveProbe::new(Arc::new(HsvFrameContext::new()));
        assert_eq!(probe.on_pointer_press(1, 1), None);
    }

    #[test]
    fn test_probe_reads_published_pixel() {
        let context = Arc::new(HsvFrameContext::new());
        context.publish(hsv_frame(60.0, 200.0, 150.0));

        let probe = InteractiveProbe::new(Arc::clone(&context));
        let reading = probe.on_pointer_press(29, 19).unwrap();
        assert_eq!(reading.hsv, HsvTriple::new(60, 200, 150));
        assert_eq!(reading.to_string(), "Clicked at (29, 19) -> HSV: [60, 200, 150]");
    }

    #[test]
    fn test_probe_outside_frame_is_silent() {
        let context = Arc::new(HsvFrameContext::new());
        context.publish(hsv_frame(10.0, 10.0, 10.0));
        let probe = InteractiveProbe::new(context);
        assert_eq!(probe.on_pointer_press(30, 0), None);
        assert_eq!(probe.on_pointer_press(-1, 5), None);
    }

    #[test]
    fn test_publish_replaces_whole_frame() {
        let context = HsvFrameContext::new();
        context.publish(hsv_frame(10.0, 10.0, 10.0));
        context.publish(Mat::new_rows_cols_with_default(5, 5, CV_8UC3, Scalar::new(90.0, 1.0, 2.0, 0.0)).unwrap());

        assert_eq!(context.dimensions(), Some((5, 5)));
        assert_eq!(context.sample(4, 4).unwrap(), Some(HsvTriple::new(90, 1, 2)));
        assert_eq!(context.sample(10, 10).unwrap(), None);
    }

    #[test]
    fn test_only_left_button_probes() {
        let context = Arc::new(HsvFrameContext::new());
        context.publish(hsv_frame(60.0, 60.0, 60.0));
        let probe = InteractiveProbe::new(context);

        assert!(probe.handle_mouse_event(opencv::highgui::EVENT_MOUSEMOVE, 1, 1).is_none());
        assert!(probe.handle_mouse_event(opencv::highgui::EVENT_LBUTTONDOWN, 1, 1).is_some());
    }

    #[test]
    fn test_reading_converts_to_degrees() {
        let reading = ProbeReading {
            x: 0,
            y: 0,
            hsv: HsvTriple::new(90, 255, 255),
        };
        assert!((reading.to_palette().hue.into_positive_degrees() - 180.0).abs() < 0.01);
    }
}

//! Per-frame multi-band detection pipeline
//!
//! Implements the post-it search for one frame:
//! - Converts the BGR frame to HSV once, shared by every band
//! - Thresholds each band and cleans the mask with open then close
//! - Extracts outer contours and keeps near-square quadrilaterals
//! - Returns labeled bounding boxes in band-then-contour order
//!
//! The pipeline keeps no per-frame state: the same frame always yields the
//! same detections, and frames of different sizes can be mixed freely.

use log::{debug, trace};
use opencv::{
    core::{Mat, Rect},
    imgproc::{approx_poly_dp, arc_length, bounding_rect, contour_area},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::color::{conversion::bgr_to_hsv, ColorSpec};
use crate::config::ProcessingParams;
use crate::detection::filters::{Rejection, ShapeFilter};
use crate::detection::mask::{band_mask, external_contours, Contour, MaskCleaner};
use crate::probe::HsvFrameContext;
use crate::{DetectorError, Result};

/// Axis-aligned box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// width / height, `None` for a degenerate box
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.height > 0).then(|| self.width as f64 / self.height as f64)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width as i32, self.height as i32)
    }
}

impl From<Rect> for BoundingBox {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width.max(0) as u32,
            height: rect.height.max(0) as u32,
        }
    }
}

/// One accepted region of one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Label of the band that produced this region
    pub label: String,
    pub bounding_box: BoundingBox,
}

/// Outcome of the shape rules for one contour
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accept(BoundingBox),
    Reject(Rejection),
}

/// Stateless per-frame detector
pub struct FrameDetectionPipeline {
    filter: ShapeFilter,
    cleaner: MaskCleaner,
}

impl FrameDetectionPipeline {
    /// Create a pipeline from validated processing parameters
    ///
    /// # Errors
    ///
    /// Returns `DetectorError::InvalidParameter` if the parameters are out of
    /// range, or `DetectorError::OpenCv` if the structuring element cannot be
    /// built.
    pub fn new(params: &ProcessingParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            filter: ShapeFilter::new(params),
            cleaner: MaskCleaner::new(params.morph_kernel_size)?,
        })
    }

    /// Detect every band in a BGR frame
    ///
    /// An empty frame yields no detections rather than an error.
    pub fn process(&self, frame: &Mat, bands: &[ColorSpec]) -> Result<Vec<Detection>> {
        if is_empty_frame(frame) {
            debug!("Skipping empty frame");
            return Ok(Vec::new());
        }

        let hsv = bgr_to_hsv(frame)?;
        self.detect_in_hsv(&hsv, bands)
    }

    /// Detect every band and publish the HSV buffer for the probe
    ///
    /// The previously published buffer is replaced as a whole once detection
    /// on the new one has finished. Empty frames leave it untouched.
    pub fn process_and_publish(
        &self,
        frame: &Mat,
        bands: &[ColorSpec],
        context: &HsvFrameContext,
    ) -> Result<Vec<Detection>> {
        if is_empty_frame(frame) {
            debug!("Skipping empty frame");
            return Ok(Vec::new());
        }

        let hsv = bgr_to_hsv(frame)?;
        let detections = self.detect_in_hsv(&hsv, bands)?;
        context.publish(hsv);
        Ok(detections)
    }

    /// Detect every band in an already converted HSV buffer
    pub fn detect_in_hsv(&self, hsv: &Mat, bands: &[ColorSpec]) -> Result<Vec<Detection>> {
        let mut detections = Vec::new();
        for band in bands {
            let found = self.detect_band(hsv, band)?;
            detections.extend(found);
        }
        debug!("Frame {}x{}: {} detection(s)", hsv.cols(), hsv.rows(), detections.len());
        Ok(detections)
    }

    fn detect_band(&self, hsv: &Mat, band: &ColorSpec) -> Result<Vec<Detection>> {
        let mask = band_mask(hsv, band)?;
        let cleaned = self.cleaner.clean(&mask)?;
        let contours = external_contours(&cleaned)?;

        let mut detections = Vec::new();
        for contour in contours.iter() {
            match self.classify_contour(&contour)? {
                Verdict::Accept(bounding_box) => detections.push(Detection {
                    label: band.label.clone(),
                    bounding_box,
                }),
                Verdict::Reject(reason) => trace!("{}: rejected contour, {}", band.label, reason),
            }
        }

        debug!(
            "{}: {} contour(s), {} accepted",
            band.label,
            contours.len(),
            detections.len()
        );
        Ok(detections)
    }

    /// Run the area, vertex and aspect rules on one contour
    pub fn classify_contour(&self, contour: &Contour) -> Result<Verdict> {
        let area = contour_area(contour, false)
            .map_err(|e| DetectorError::opencv("contour area", e))?;
        if let Err(reason) = self.filter.check_area(area) {
            return Ok(Verdict::Reject(reason));
        }

        let perimeter = arc_length(contour, true)
            .map_err(|e| DetectorError::opencv("contour perimeter", e))?;
        let mut approx = Contour::new();
        approx_poly_dp(contour, &mut approx, self.filter.approx_epsilon(perimeter), true)
            .map_err(|e| DetectorError::opencv("polygon approximation", e))?;
        if let Err(reason) = self.filter.check_vertices(approx.len()) {
            return Ok(Verdict::Reject(reason));
        }

        let bbox = BoundingBox::from(
            bounding_rect(&approx).map_err(|e| DetectorError::opencv("bounding rectangle", e))?,
        );
        if let Err(reason) = self.filter.check_aspect(&bbox) {
            return Ok(Verdict::Reject(reason));
        }

        Ok(Verdict::Accept(bbox))
    }
}

fn is_empty_frame(frame: &Mat) -> bool {
    frame.empty() || frame.rows() == 0 || frame.cols() == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;
    use opencv::core::{Point, Scalar, Vector, CV_8UC3};
    use opencv::imgproc::{circle, fill_poly, rectangle, FILLED, LINE_8};

    const GREEN_BGR: (f64, f64, f64) = (0.0, 255.0, 0.0);

    fn black_frame(rows: i32, cols: i32) -> Mat {
        Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::all(0.0)).unwrap()
    }

    fn bgr((b, g, r): (f64, f64, f64)) -> Scalar {
        Scalar::new(b, g, r, 0.0)
    }

    fn fill_rect(frame: &mut Mat, rect: Rect, color: (f64, f64, f64)) {
        rectangle(frame, rect, bgr(color), FILLED, LINE_8, 0).unwrap();
    }

    fn fill_polygon(frame: &mut Mat, points: &[(i32, i32)], color: (f64, f64, f64)) {
        let poly: Contour = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        let polys = Vector::<Contour>::from_iter([poly]);
        fill_poly(frame, &polys, bgr(color), LINE_8, 0, Point::new(0, 0)).unwrap();
    }

    fn pipeline() -> FrameDetectionPipeline {
        FrameDetectionPipeline::new(&ProcessingParams::default()).unwrap()
    }

    fn bands() -> Vec<ColorSpec> {
        DetectorConfig::default_post_it().bands
    }

    #[test]
    fn test_square_is_detected_with_exact_box() {
        let mut frame = black_frame(300, 300);
        fill_rect(&mut frame, Rect::new(50, 50, 100, 100), GREEN_BGR);

        let detections = pipeline().process(&frame, &bands()).unwrap();
        assert_eq!(
            detections,
            vec![Detection {
                label: "GREEN".into(),
                bounding_box: BoundingBox::new(50, 50, 100, 100),
            }]
        );
    }

    #[test]
    fn test_black_frame_has_no_detections() {
        let detections = pipeline().process(&black_frame(240, 320), &bands()).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn test_empty_mat_is_not_an_error() {
        let detections = pipeline().process(&Mat::default(), &bands()).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn test_small_square_rejected_by_area() {
        let mut frame = black_frame(200, 200);
        // 40x40 fill encloses 39*39 = 1521 px²
        fill_rect(&mut frame, Rect::new(20, 20, 40, 40), GREEN_BGR);
        assert!(pipeline().process(&frame, &bands()).unwrap().is_empty());
    }

    #[test]
    fn test_triangle_rejected() {
        let mut frame = black_frame(400, 400);
        fill_polygon(&mut frame, &[(100, 300), (300, 300), (200, 100)], GREEN_BGR);
        assert!(pipeline().process(&frame, &bands()).unwrap().is_empty());
    }

    #[test]
    fn test_pentagon_rejected() {
        let mut frame = black_frame(400, 400);
        let points: Vec<(i32, i32)> = (0..5)
            .map(|i| {
                let angle = std::f64::consts::TAU * i as f64 / 5.0 - std::f64::consts::FRAC_PI_2;
                ((200.0 + 100.0 * angle.cos()) as i32, (200.0 + 100.0 * angle.sin()) as i32)
            })
            .collect();
        fill_polygon(&mut frame, &points, GREEN_BGR);
        assert!(pipeline().process(&frame, &bands()).unwrap().is_empty());
    }

    #[test]
    fn test_circle_rejected() {
        let mut frame = black_frame(400, 400);
        circle(&mut frame, Point::new(200, 200), 80, bgr(GREEN_BGR), FILLED, LINE_8, 0).unwrap();
        assert!(pipeline().process(&frame, &bands()).unwrap().is_empty());
    }

    #[test]
    fn test_elongated_rectangle_rejected() {
        let mut frame = black_frame(300, 400);
        fill_rect(&mut frame, Rect::new(50, 50, 200, 60), GREEN_BGR);
        assert!(pipeline().process(&frame, &bands()).unwrap().is_empty());
    }

    #[test]
    fn test_aspect_boundary_on_real_contours() {
        let mut accepted = black_frame(300, 300);
        fill_rect(&mut accepted, Rect::new(50, 50, 70, 100), GREEN_BGR);
        let found = pipeline().process(&accepted, &bands()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].bounding_box, BoundingBox::new(50, 50, 70, 100));

        let mut rejected = black_frame(300, 300);
        fill_rect(&mut rejected, Rect::new(50, 50, 69, 100), GREEN_BGR);
        assert!(pipeline().process(&rejected, &bands()).unwrap().is_empty());
    }

    #[test]
    fn test_band_order_drives_result_order() {
        let mut frame = black_frame(300, 600);
        // pink first on screen, green second
        fill_rect(&mut frame, Rect::new(20, 50, 100, 100), (147.0, 20.0, 255.0));
        fill_rect(&mut frame, Rect::new(300, 50, 100, 100), GREEN_BGR);

        let labels: Vec<_> = pipeline()
            .process(&frame, &bands())
            .unwrap()
            .into_iter()
            .map(|d| d.label)
            .collect();
        assert_eq!(labels, vec!["GREEN", "PINK"]);
    }

    #[test]
    fn test_classify_contour_reports_vertex_rejection() {
        let triangle: Contour = [(0, 0), (200, 0), (100, 150)]
            .iter()
            .map(|&(x, y)| Point::new(x, y))
            .collect();
        let verdict = pipeline().classify_contour(&triangle).unwrap();
        assert_eq!(verdict, Verdict::Reject(Rejection::NotQuadrilateral { vertices: 3 }));
    }

    #[test]
    fn test_publish_makes_hsv_available() {
        let mut frame = black_frame(100, 100);
        fill_rect(&mut frame, Rect::new(0, 0, 50, 50), GREEN_BGR);

        let context = HsvFrameContext::new();
        assert!(!context.has_frame());
        pipeline().process_and_publish(&frame, &bands(), &context).unwrap();
        assert!(context.has_frame());
        assert_eq!(context.dimensions(), Some((100, 100)));
    }

    #[test]
    fn test_bounding_box_from_negative_rect() {
        let bbox = BoundingBox::from(Rect::new(5, 5, -3, 10));
        assert_eq!(bbox.width, 0);
        assert_eq!(bbox.aspect_ratio(), Some(0.0));
        assert_eq!(BoundingBox::new(0, 0, 4, 0).aspect_ratio(), None);
    }
}

//! Shape acceptance rules
//!
//! Each rule is an independent predicate so the policy can be exercised
//! without any image I/O. [`ShapeFilter`] bundles them with the configured
//! thresholds.

use std::fmt;

use crate::config::{AspectRatioRange, ProcessingParams};
use crate::constants::processing::QUADRILATERAL_VERTICES;
use crate::detection::BoundingBox;

/// Enclosed area is at least the configured minimum
pub fn meets_min_area(area: f64, min_area: f64) -> bool {
    area >= min_area
}

/// Approximated polygon has exactly four vertices
pub fn is_quadrilateral(vertex_count: usize) -> bool {
    vertex_count == QUADRILATERAL_VERTICES
}

/// Width / height ratio lies inside the inclusive range
pub fn is_near_square(bbox: &BoundingBox, range: &AspectRatioRange) -> bool {
    bbox.aspect_ratio().is_some_and(|ratio| range.contains(ratio))
}

/// Why a contour was not turned into a detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    TooSmall { area: f64 },
    NotQuadrilateral { vertices: usize },
    NotSquare { width: u32, height: u32 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooSmall { area } => write!(f, "area {:.0} below minimum", area),
            Rejection::NotQuadrilateral { vertices } => {
                write!(f, "approximated to {} vertices", vertices)
            }
            Rejection::NotSquare { width, height } => {
                write!(f, "box {}x{} is not near-square", width, height)
            }
        }
    }
}

/// Configured thresholds for the shape rules
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeFilter {
    min_area: f64,
    approx_tolerance: f64,
    aspect_ratio: AspectRatioRange,
}

impl ShapeFilter {
    pub fn new(params: &ProcessingParams) -> Self {
        Self {
            min_area: params.min_area,
            approx_tolerance: params.approx_tolerance,
            aspect_ratio: params.aspect_ratio,
        }
    }

    /// Polygon approximation epsilon for a contour of this perimeter
    pub fn approx_epsilon(&self, perimeter: f64) -> f64 {
        self.approx_tolerance * perimeter
    }

    pub fn check_area(&self, area: f64) -> Result<(), Rejection> {
        if meets_min_area(area, self.min_area) {
            Ok(())
        } else {
            Err(Rejection::TooSmall { area })
        }
    }

    pub fn check_vertices(&self, vertices: usize) -> Result<(), Rejection> {
        if is_quadrilateral(vertices) {
            Ok(())
        } else {
            Err(Rejection::NotQuadrilateral { vertices })
        }
    }

    pub fn check_aspect(&self, bbox: &BoundingBox) -> Result<(), Rejection> {
        if is_near_square(bbox, &self.aspect_ratio) {
            Ok(())
        } else {
            Err(Rejection::NotSquare {
                width: bbox.width,
                height: bbox.height,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(width: u32, height: u32) -> BoundingBox {
        BoundingBox::new(0, 0, width, height)
    }

    #[test]
    fn test_min_area_boundary() {
        assert!(meets_min_area(2000.0, 2000.0));
        assert!(meets_min_area(2000.5, 2000.0));
        assert!(!meets_min_area(1999.9, 2000.0));
    }

    #[test]
    fn test_only_four_vertices_qualify() {
        assert!(is_quadrilateral(4));
        for n in [0, 3, 5, 8] {
            assert!(!is_quadrilateral(n), "{} vertices accepted", n);
        }
    }

    #[test]
    fn test_aspect_ratio_bounds_inclusive() {
        let range = AspectRatioRange::default();
        assert!(is_near_square(&bbox(70, 100), &range));
        assert!(is_near_square(&bbox(130, 100), &range));
        assert!(is_near_square(&bbox(100, 100), &range));
        assert!(!is_near_square(&bbox(69, 100), &range));
        assert!(!is_near_square(&bbox(131, 100), &range));
    }

    #[test]
    fn test_zero_height_is_not_square() {
        assert!(!is_near_square(&bbox(10, 0), &AspectRatioRange::default()));
    }

    #[test]
    fn test_filter_reports_reason() {
        let filter = ShapeFilter::new(&ProcessingParams::default());
        assert_eq!(filter.check_area(10.0), Err(Rejection::TooSmall { area: 10.0 }));
        assert_eq!(filter.check_vertices(5), Err(Rejection::NotQuadrilateral { vertices: 5 }));
        assert_eq!(
            filter.check_aspect(&bbox(200, 100)),
            Err(Rejection::NotSquare { width: 200, height: 100 })
        );
        assert!(filter.check_aspect(&bbox(100, 95)).is_ok());
        assert_eq!(filter.approx_epsilon(500.0), 20.0);
    }

    #[test]
    fn test_rejection_display() {
        let r = Rejection::NotQuadrilateral { vertices: 3 };
        assert_eq!(r.to_string(), "approximated to 3 vertices");
    }
}

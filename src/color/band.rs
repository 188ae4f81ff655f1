//! Named HSV color bands
//!
//! A [`ColorSpec`] pairs a label with an inclusive HSV box and the color used
//! to annotate matches on screen. Bounds use OpenCV's 8-bit HSV ranges:
//! H in [0, 179], S and V in [0, 255].

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::constants::hsv::HUE_MAX;
use crate::{DetectorError, Result};

/// One HSV triple in OpenCV 8-bit ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HsvTriple {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl HsvTriple {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    /// Channels in (h, s, v) order
    pub fn channels(&self) -> [u8; 3] {
        [self.h, self.s, self.v]
    }
}

impl From<[u8; 3]> for HsvTriple {
    fn from([h, s, v]: [u8; 3]) -> Self {
        Self { h, s, v }
    }
}

/// Immutable color band specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSpec {
    /// Label copied into every detection this band produces
    pub label: String,

    /// Inclusive lower HSV bound
    pub lower: HsvTriple,

    /// Inclusive upper HSV bound
    pub upper: HsvTriple,

    /// Annotation color (sRGB)
    pub display_color: Srgb<u8>,
}

impl ColorSpec {
    pub fn new(
        label: impl Into<String>,
        lower: HsvTriple,
        upper: HsvTriple,
        display_color: Srgb<u8>,
    ) -> Self {
        Self {
            label: label.into(),
            lower,
            upper,
            display_color,
        }
    }

    /// Check the channel invariants of this band
    ///
    /// # Errors
    ///
    /// Returns `DetectorError::InvalidConfiguration` if the label is empty,
    /// a hue bound exceeds 179, or any lower bound exceeds its upper bound.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(DetectorError::invalid_band(&self.label, "label must not be empty"));
        }

        for (name, bound) in [("lower", self.lower), ("upper", self.upper)] {
            if bound.h > HUE_MAX {
                return Err(DetectorError::invalid_band(
                    &self.label,
                    format!("{} hue {} exceeds {}", name, bound.h, HUE_MAX),
                ));
            }
        }

        let names = ["hue", "saturation", "value"];
        let lower = self.lower.channels();
        let upper = self.upper.channels();
        for i in 0..3 {
            if lower[i] > upper[i] {
                return Err(DetectorError::invalid_band(
                    &self.label,
                    format!("lower {} {} exceeds upper {} {}", names[i], lower[i], names[i], upper[i]),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn green() -> ColorSpec {
        ColorSpec::new(
            "GREEN",
            HsvTriple::new(35, 40, 40),
            HsvTriple::new(85, 255, 255),
            Srgb::new(0, 255, 0),
        )
    }

    #[test]
    fn test_valid_band() {
        assert!(green().validate().is_ok());
    }

    #[test]
    fn test_inverted_channel_rejected() {
        let mut band = green();
        band.lower.s = 200;
        band.upper.s = 100;
        let err = band.validate().unwrap_err();
        assert!(matches!(err, DetectorError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("saturation"));
    }

    #[test]
    fn test_hue_out_of_range_rejected() {
        let mut band = green();
        band.upper.h = 180;
        assert!(band.validate().is_err());
    }

    #[test]
    fn test_empty_label_rejected() {
        let mut band = green();
        band.label = "  ".into();
        assert!(band.validate().is_err());
    }
}

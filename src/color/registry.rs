//! Ordered, validated set of color bands
//!
//! The registry is built once at startup. Its iteration order is the
//! processing order of the pipeline and therefore the draw order of the
//! overlay: a band listed later draws on top of an earlier one.

use std::collections::HashSet;

use crate::color::ColorSpec;
use crate::{DetectorError, Result};

/// Immutable ordered collection of [`ColorSpec`]s
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBandRegistry {
    bands: Vec<ColorSpec>,
}

impl ColorBandRegistry {
    /// Build a registry, validating every band
    ///
    /// # Errors
    ///
    /// Returns `DetectorError::InvalidConfiguration` if the set is empty,
    /// a label is repeated, or any band violates its channel invariants.
    pub fn new(bands: Vec<ColorSpec>) -> Result<Self> {
        if bands.is_empty() {
            return Err(DetectorError::invalid_band("<none>", "at least one color band is required"));
        }

        let mut seen = HashSet::new();
        for band in &bands {
            band.validate()?;
            if !seen.insert(band.label.as_str()) {
                return Err(DetectorError::invalid_band(&band.label, "duplicate label"));
            }
        }

        Ok(Self { bands })
    }

    /// Bands in processing order
    pub fn bands(&self) -> &[ColorSpec] {
        &self.bands
    }

    /// Look a band up by label
    pub fn get(&self, label: &str) -> Option<&ColorSpec> {
        self.bands.iter().find(|band| band.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|band| band.label.as_str())
    }
}

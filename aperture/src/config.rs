//! Measurement configuration shared by all aperture operations.
//!
//! A [`PhotometryConfig`] holds the per-call options that do not describe the
//! aperture itself: mask threshold, detector gain, how the error plane is
//! interpreted, how boundary pixels are weighted and how rows are addressed at
//! the top and bottom image edges. It can be stored as JSON next to the data it
//! was used for.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ApertureError;
use crate::flags::InputOptions;

/// Weighting applied to pixels straddling an aperture boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sampling {
    /// Exact geometric overlap between the pixel square and the shape.
    #[default]
    Exact,
    /// `n × n` sub-pixel centre tests against the true boundary.
    Subpixel(u32),
}

/// Addressing convention for rows outside `[0, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RowBoundary {
    /// Bounding boxes are clipped to the image and flagged as truncated.
    #[default]
    Clip,
    /// Rows wrap around the image (toroidal in y); columns are still clipped.
    Periodic,
}

/// Options for a single aperture measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotometryConfig {
    /// A mask pixel whose value exceeds this threshold marks its pixel as masked
    pub mask_threshold: f64,
    /// Detector gain in e⁻/ADU; Poisson noise is added only when positive
    pub gain: f64,
    /// Error interpretation and masking policy
    pub options: InputOptions,
    /// Boundary pixel weighting for single-aperture sums
    pub sampling: Sampling,
    /// Row addressing at the top and bottom image edges
    pub row_boundary: RowBoundary,
}

impl Default for PhotometryConfig {
    fn default() -> Self {
        Self {
            mask_threshold: 0.0,
            gain: 0.0,
            options: InputOptions::empty(),
            sampling: Sampling::Exact,
            row_boundary: RowBoundary::Clip,
        }
    }
}

impl PhotometryConfig {
    /// Set the detector gain used for Poisson noise.
    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    /// Set the mask threshold.
    pub fn with_mask_threshold(mut self, mask_threshold: f64) -> Self {
        self.mask_threshold = mask_threshold;
        self
    }

    /// Replace the input options.
    pub fn with_options(mut self, options: InputOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the boundary pixel sampling.
    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Replace the row addressing convention.
    pub fn with_row_boundary(mut self, row_boundary: RowBoundary) -> Self {
        self.row_boundary = row_boundary;
        self
    }

    /// Save to a pretty-printed JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ApertureError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ApertureError::Config(format!("serialize failed: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| ApertureError::Config(format!("{}: {e}", path.display())))
    }

    /// Load from a JSON file; missing fields take their default values
    pub fn load_from_file(path: &Path) -> Result<Self, ApertureError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ApertureError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&json)
            .map_err(|e| ApertureError::Config(format!("{}: {e}", path.display())))
    }
}

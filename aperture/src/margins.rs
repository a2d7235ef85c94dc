//! Oversampled annuli around aperture boundaries.
//!
//! A pixel whose centre lies at distance `d` from the centre of a circle of
//! radius `r` can only straddle the boundary when `|d − r|` is below the pixel
//! half-diagonal. Outside that band a cheap centre test classifies the whole
//! pixel; inside it the exact overlap (or sub-pixel sampling) is required.

/// Half-diagonal of a unit pixel, rounded up from 1/√2.
pub const PIXEL_HALF_DIAGONAL: f64 = 0.7072;

/// Squared radii bracketing an aperture boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OversampledAnnulus {
    /// Pixels strictly below this reduced distance are entirely inside
    pub inner2: f64,
    /// Pixels at or beyond this reduced distance are entirely outside
    pub outer2: f64,
}

impl OversampledAnnulus {
    /// Margins for a circle of radius `r`.
    pub fn circle(r: f64) -> Self {
        Self::with_offset(r, PIXEL_HALF_DIAGONAL)
    }

    /// Margins for an ellipse of semi-minor axis `b` scaled to `r`.
    ///
    /// The reduced distance of an ellipse is measured in units of its axes, so
    /// one pixel spans up to `1/b` of them along the minor axis.
    pub fn ellipse(r: f64, b: f64) -> Self {
        Self::with_offset(r, PIXEL_HALF_DIAGONAL / b)
    }

    fn with_offset(r: f64, offset: f64) -> Self {
        let r_in = r - offset;
        let r_out = r + offset;
        Self {
            inner2: if r_in > 0.0 { r_in * r_in } else { 0.0 },
            outer2: r_out * r_out,
        }
    }
}

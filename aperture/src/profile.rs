//! Binned radial flux profile around a position.
//!
//! The disc of radius `rmax` is split into `n` concentric bins of equal width.
//! Pixels whose radius falls well inside a bin are assigned to it whole; pixels
//! within a half-diagonal of a bin edge are split over a sub-pixel grid, each
//! sample going to the bin of its own radius. Bins are independent annuli, not
//! cumulative totals.

use crate::config::PhotometryConfig;
use crate::error::ApertureError;
use crate::extent::box_extent;
use crate::flags::ApertureFlags;
use crate::frame::{wrap_row, Frame};
use crate::margins::PIXEL_HALF_DIAGONAL;
use crate::sum::{add_poisson_noise, correct_for_mask};

/// Margin added to `rmax` when choosing which pixels to visit.
const PROFILE_BOX_MARGIN: f64 = 1.5;

/// Flux, variance and area per radial bin.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialProfile {
    /// Outer radius of the last bin
    pub rmax: f64,
    pub sum: Vec<f64>,
    pub sumvar: Vec<f64>,
    pub area: Vec<f64>,
    pub maskarea: Vec<f64>,
    pub flags: ApertureFlags,
}

impl RadialProfile {
    fn zeros(rmax: f64, n: usize, flags: ApertureFlags) -> Self {
        Self {
            rmax,
            sum: vec![0.0; n],
            sumvar: vec![0.0; n],
            area: vec![0.0; n],
            maskarea: vec![0.0; n],
            flags,
        }
    }

    /// Number of bins
    pub fn bins(&self) -> usize {
        self.sum.len()
    }

    /// Radial width of each bin
    pub fn step(&self) -> f64 {
        self.rmax / self.bins() as f64
    }

    /// Total flux over all bins
    pub fn total(&self) -> f64 {
        self.sum.iter().sum()
    }
}

/// Measure `n` annular bins of equal width out to `rmax` around `(x, y)`.
///
/// Pixels near a bin edge are sampled on a `subpix × subpix` grid. Masking,
/// error handling and Poisson noise follow the single-aperture sums and are
/// applied per bin. The boundary sampling setting of `config` is not used.
///
/// # Errors
/// * `ApertureError::IllegalApertureParams` - negative `rmax` or `n == 0`
/// * `ApertureError::IllegalSubpix` - `subpix == 0`
pub fn sum_circann_multi(
    frame: &Frame,
    x: f64,
    y: f64,
    rmax: f64,
    n: usize,
    subpix: u32,
    config: &PhotometryConfig,
) -> Result<RadialProfile, ApertureError> {
    if !(rmax >= 0.0) || n < 1 {
        return Err(ApertureError::IllegalApertureParams(format!(
            "profile needs rmax >= 0 and at least one bin, got rmax={rmax}, n={n}"
        )));
    }
    if subpix < 1 {
        return Err(ApertureError::IllegalSubpix(subpix));
    }

    let r_out = rmax + PROFILE_BOX_MARGIN;
    let r_out2 = r_out * r_out;
    let (bbox, mut flags) = box_extent(
        x,
        y,
        r_out,
        r_out,
        frame.width(),
        frame.height(),
        config.row_boundary,
    );

    let step = rmax / n as f64;
    if step <= 0.0 {
        // Zero-width bins hold nothing
        return Ok(RadialProfile::zeros(rmax, n, flags));
    }
    let stepdens = 1.0 / step;
    let prev_bin_margin = PIXEL_HALF_DIAGONAL;
    let next_bin_margin = step - PIXEL_HALF_DIAGONAL;

    let scale = 1.0 / subpix as f64;
    let scale2 = scale * scale;
    let offset = 0.5 * (scale - 1.0);

    let variance = frame.variance(config.options);
    let mut profile = RadialProfile::zeros(rmax, n, ApertureFlags::empty());

    for iy in bbox.ymin..bbox.ymax {
        let row = wrap_row(iy, frame.height());
        let dy = iy as f64 - y;

        for ix in bbox.xmin..bbox.xmax {
            let dx = ix as f64 - x;
            let rpix2 = dx * dx + dy * dy;
            if rpix2 >= r_out2 {
                continue;
            }

            let col = ix as usize;
            let pix = frame.pixel(row, col);
            let varpix = variance.at(row, col);
            let masked = frame.is_masked(row, col, config.mask_threshold);
            if masked {
                flags |= ApertureFlags::HAS_MASKED;
            }

            let mut deposit = |j: usize, weight: f64| {
                if j < n {
                    if masked {
                        profile.maskarea[j] += weight;
                    } else {
                        profile.sum[j] += weight * pix;
                        profile.sumvar[j] += weight * varpix;
                    }
                    profile.area[j] += weight;
                }
            };

            let rpix = rpix2.sqrt();
            let d = rpix % step;
            if d < prev_bin_margin || d > next_bin_margin {
                // Close to a bin edge: split the pixel
                for sy in 0..subpix {
                    let sdy = dy + offset + sy as f64 * scale;
                    let sdy2 = sdy * sdy;
                    for sx in 0..subpix {
                        let sdx = dx + offset + sx as f64 * scale;
                        let j = ((sdx * sdx + sdy2).sqrt() * stepdens) as usize;
                        deposit(j, scale2);
                    }
                }
            } else {
                deposit((rpix * stepdens) as usize, 1.0);
            }
        }
    }

    for j in 0..n {
        if frame.has_mask() {
            correct_for_mask(
                &mut profile.sum[j],
                &mut profile.sumvar[j],
                &mut profile.area[j],
                profile.maskarea[j],
                config.options,
            );
        }
        add_poisson_noise(profile.sum[j], &mut profile.sumvar[j], config.gain);
    }

    profile.flags = flags;
    Ok(profile)
}

//! Radii enclosing given fractions of a source's flux.

use crate::config::PhotometryConfig;
use crate::error::ApertureError;
use crate::flags::ApertureFlags;
use crate::frame::Frame;
use crate::profile::sum_circann_multi;

/// Number of radial bins used by [`flux_radius`].
///
/// Finer bins resolve the enclosed-flux curve better but make each bin noisier
/// and cost more boundary sampling. 64 bins out to `rmax` is fixed.
pub const FLUX_RADIUS_BINS: usize = 64;

/// Percent point function of a binned profile.
///
/// `profile` holds `n` non-cumulative bins spanning `[0, xmax]`. For each
/// fraction the bins are accumulated until the running sum reaches
/// `fraction × Σ profile`, and the crossing position is interpolated linearly
/// inside that bin. A target reached before any bin is added gives 0, one never
/// reached gives `xmax`.
///
/// The profile is expected to be non-negative. Other inputs give a defined but
/// not necessarily meaningful answer.
///
/// # Examples
/// ```
/// use aperture::ppf;
///
/// let flat = vec![1.0; 10];
/// let r = ppf(5.0, &flat, &[0.5]);
/// assert!((r[0] - 2.5).abs() < 1e-12);
/// ```
pub fn ppf(xmax: f64, profile: &[f64], fractions: &[f64]) -> Vec<f64> {
    let total: f64 = profile.iter().sum();
    ppf_with_total(xmax, profile, fractions, total)
}

/// [`ppf`] with the fractions taken of an externally supplied `total`.
pub fn ppf_with_total(xmax: f64, profile: &[f64], fractions: &[f64], total: f64) -> Vec<f64> {
    let n = profile.len();
    if n == 0 {
        return vec![0.0; fractions.len()];
    }
    let step = xmax / n as f64;

    fractions
        .iter()
        .map(|&frac| {
            let target = frac * total;
            let mut cumsum = 0.0;
            let mut i = 0;
            while i < n && cumsum < target {
                cumsum += profile[i];
                i += 1;
            }

            if i == 0 {
                0.0
            } else if i == n {
                xmax
            } else {
                step * (i as f64 + (target - cumsum) / profile[i - 1])
            }
        })
        .collect()
}

/// Flux radii and the flags raised while building the profile.
#[derive(Debug, Clone, PartialEq)]
pub struct FluxRadius {
    /// One radius per requested fraction, in input order
    pub radii: Vec<f64>,
    pub flags: ApertureFlags,
}

/// Radii around `(x, y)` enclosing each of `fractions` of the flux within `rmax`.
///
/// Builds a [`FLUX_RADIUS_BINS`]-bin profile with [`sum_circann_multi`] and
/// interpolates it with [`ppf`]. When `total_flux` is given the fractions are
/// taken of it instead of the flux inside `rmax`.
///
/// # Errors
/// Propagates the parameter checks of [`sum_circann_multi`].
#[allow(clippy::too_many_arguments)]
pub fn flux_radius(
    frame: &Frame,
    x: f64,
    y: f64,
    rmax: f64,
    subpix: u32,
    fractions: &[f64],
    total_flux: Option<f64>,
    config: &PhotometryConfig,
) -> Result<FluxRadius, ApertureError> {
    let profile = sum_circann_multi(frame, x, y, rmax, FLUX_RADIUS_BINS, subpix, config)?;

    let total = total_flux.unwrap_or_else(|| profile.total());
    if total <= 0.0 {
        log::debug!("flux radius at ({x:.2}, {y:.2}) with non-positive total flux {total}");
    }

    Ok(FluxRadius {
        radii: ppf_with_total(rmax, &profile.sum, fractions, total),
        flags: profile.flags,
    })
}

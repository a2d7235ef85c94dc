//! Aperture summation engine.
//!
//! One algorithm serves every [`ApertureShape`]: walk the shape's bounding box,
//! classify each pixel as fully outside, fully inside or on the boundary, and
//! accumulate weighted flux, variance, area and masked area. Boundary pixels are
//! weighted by their exact overlap with the shape, or by sub-pixel sampling when
//! the configuration asks for it.

use rayon::prelude::*;

use crate::config::{PhotometryConfig, Sampling};
use crate::error::ApertureError;
use crate::flags::{ApertureFlags, InputOptions};
use crate::frame::{wrap_row, Frame};
use crate::geometry::{ApertureShape, Circle, CircularAnnulus, Ellipse, EllipticalAnnulus, Zone};

/// Flux and area accumulated over one aperture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ApertureSum {
    /// Summed pixel values, weighted by pixel overlap
    pub sum: f64,
    /// Summed variance, including Poisson noise when a gain is set
    pub sumvar: f64,
    /// Overlap-weighted pixel area
    pub area: f64,
    /// Part of `area` contributed by masked pixels
    pub maskarea: f64,
    pub flags: ApertureFlags,
}

impl ApertureSum {
    /// One-sigma uncertainty of `sum`
    pub fn error(&self) -> f64 {
        self.sumvar.sqrt()
    }
}

/// Compensate accumulated values for masked pixels.
///
/// With [`InputOptions::MASK_IGNORE`] masked pixels are dropped from the area;
/// otherwise flux and variance are scaled up by `area / (area − maskarea)`,
/// which is taken as 0 when everything was masked.
pub(crate) fn correct_for_mask(
    sum: &mut f64,
    sumvar: &mut f64,
    area: &mut f64,
    maskarea: f64,
    options: InputOptions,
) {
    if options.contains(InputOptions::MASK_IGNORE) {
        *area -= maskarea;
    } else {
        let scale = if *area == maskarea {
            0.0
        } else {
            *area / (*area - maskarea)
        };
        *sum *= scale;
        *sumvar *= scale;
    }
}

/// Add Poisson variance `sum / gain` for positive flux and positive gain.
pub(crate) fn add_poisson_noise(sum: f64, sumvar: &mut f64, gain: f64) {
    if gain > 0.0 && sum > 0.0 {
        *sumvar += sum / gain;
    }
}

/// Sum the pixels covered by `shape` centred at `(x, y)`.
///
/// # Errors
/// * `ApertureError::IllegalSubpix` - the configuration requests `Subpixel(0)`
pub fn sum_aperture<S: ApertureShape + ?Sized>(
    frame: &Frame,
    x: f64,
    y: f64,
    shape: &S,
    config: &PhotometryConfig,
) -> Result<ApertureSum, ApertureError> {
    if let Sampling::Subpixel(0) = config.sampling {
        return Err(ApertureError::IllegalSubpix(0));
    }

    let (bbox, mut flags) = shape.bounds(x, y, frame.width(), frame.height(), config.row_boundary);
    let variance = frame.variance(config.options);

    let mut sum = 0.0;
    let mut sumvar = 0.0;
    let mut area = 0.0;
    let mut maskarea = 0.0;

    for iy in bbox.ymin..bbox.ymax {
        let row = wrap_row(iy, frame.height());
        let dy = iy as f64 - y;

        for ix in bbox.xmin..bbox.xmax {
            let dx = ix as f64 - x;
            let rpix2 = shape.reduced_distance(dx, dy);

            let overlap = match shape.zone(rpix2) {
                Zone::Outside => continue,
                Zone::Inside => 1.0,
                Zone::Boundary => match config.sampling {
                    Sampling::Exact => shape.exact_overlap(dx, dy),
                    Sampling::Subpixel(subpix) => shape.sampled_overlap(dx, dy, subpix),
                },
            };

            let col = ix as usize;
            if frame.is_masked(row, col, config.mask_threshold) {
                flags |= ApertureFlags::HAS_MASKED;
                maskarea += overlap;
            } else {
                sum += overlap * frame.pixel(row, col);
                sumvar += overlap * variance.at(row, col);
            }
            area += overlap;
        }
    }

    if frame.has_mask() {
        correct_for_mask(&mut sum, &mut sumvar, &mut area, maskarea, config.options);
    }
    add_poisson_noise(sum, &mut sumvar, config.gain);

    Ok(ApertureSum {
        sum,
        sumvar,
        area,
        maskarea,
        flags,
    })
}

/// Sum within a circle of radius `r`.
pub fn sum_circle(
    frame: &Frame,
    x: f64,
    y: f64,
    r: f64,
    config: &PhotometryConfig,
) -> Result<ApertureSum, ApertureError> {
    sum_aperture(frame, x, y, &Circle::new(r)?, config)
}

/// Sum within the ellipse `(a, b, theta)` scaled by `r`.
#[allow(clippy::too_many_arguments)]
pub fn sum_ellipse(
    frame: &Frame,
    x: f64,
    y: f64,
    a: f64,
    b: f64,
    theta: f64,
    r: f64,
    config: &PhotometryConfig,
) -> Result<ApertureSum, ApertureError> {
    sum_aperture(frame, x, y, &Ellipse::new(a, b, theta, r)?, config)
}

/// Sum within the circular annulus between `rin` and `rout`.
pub fn sum_circann(
    frame: &Frame,
    x: f64,
    y: f64,
    rin: f64,
    rout: f64,
    config: &PhotometryConfig,
) -> Result<ApertureSum, ApertureError> {
    sum_aperture(frame, x, y, &CircularAnnulus::new(rin, rout)?, config)
}

/// Sum within the elliptical annulus between scales `rin` and `rout`.
#[allow(clippy::too_many_arguments)]
pub fn sum_ellipann(
    frame: &Frame,
    x: f64,
    y: f64,
    a: f64,
    b: f64,
    theta: f64,
    rin: f64,
    rout: f64,
    config: &PhotometryConfig,
) -> Result<ApertureSum, ApertureError> {
    sum_aperture(
        frame,
        x,
        y,
        &EllipticalAnnulus::new(a, b, theta, rin, rout)?,
        config,
    )
}

/// Evaluate one shape at many centres in parallel.
///
/// Results are returned in the order of `centers`.
pub fn sum_apertures_par<S: ApertureShape + ?Sized>(
    frame: &Frame,
    shape: &S,
    centers: &[(f64, f64)],
    config: &PhotometryConfig,
) -> Vec<Result<ApertureSum, ApertureError>> {
    centers
        .par_iter()
        .map(|&(x, y)| sum_aperture(frame, x, y, shape, config))
        .collect()
}

/// Remove a local background measured in an annulus from an aperture sum.
///
/// The annulus mean (`sum / area`) times the aperture area is subtracted, and
/// the annulus variance is propagated with the same scale. An annulus with no
/// area leaves the aperture sum unchanged apart from its flags.
pub fn subtract_background(aperture: &ApertureSum, annulus: &ApertureSum) -> ApertureSum {
    let mut result = *aperture;
    result.flags |= annulus.flags;

    if annulus.area > 0.0 {
        let scale = aperture.area / annulus.area;
        result.sum -= annulus.sum * scale;
        result.sumvar += annulus.sumvar * scale * scale;
    } else {
        log::debug!("background annulus has no unmasked area, skipping subtraction");
    }
    result
}

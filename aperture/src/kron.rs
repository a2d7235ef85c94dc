//! Kron radius: the flux-weighted mean radius inside an ellipse.

use crate::config::PhotometryConfig;
use crate::ellipse::QuadraticForm;
use crate::error::ApertureError;
use crate::extent::box_extent_ellipse;
use crate::flags::ApertureFlags;
use crate::frame::{wrap_row, Frame};

/// Pixel values below this are treated as invalid and skipped like masked pixels.
pub const INVALID_PIXEL_SENTINEL: f64 = -1.0e30;

/// Kron radius in units of the ellipse scale, with diagnostic flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KronRadius {
    pub radius: f64,
    pub flags: ApertureFlags,
}

/// Compute `Σ pix·ρ / Σ pix` over pixels with `form(dx, dy) ≤ r²`, where
/// `ρ = √form(dx, dy)` is the reduced distance.
///
/// Masked and sentinel-valued pixels are skipped and set
/// [`ApertureFlags::HAS_MASKED`]. No valid pixel gives
/// [`ApertureFlags::ALL_MASKED`] and radius 0; a non-positive numerator or
/// denominator gives [`ApertureFlags::NON_POSITIVE`] and radius 0.
///
/// # Errors
/// * `ApertureError::NonEllipseParams` - `form` is not an ellipse
/// * `ApertureError::IllegalApertureParams` - `r` is negative or NaN
pub fn kron_radius(
    frame: &Frame,
    x: f64,
    y: f64,
    form: &QuadraticForm,
    r: f64,
    config: &PhotometryConfig,
) -> Result<KronRadius, ApertureError> {
    if !form.is_ellipse() {
        return Err(ApertureError::NonEllipseParams);
    }
    if !(r >= 0.0) {
        return Err(ApertureError::IllegalApertureParams(format!(
            "Kron scale must be non-negative, got {r}"
        )));
    }

    let r2 = r * r;
    let (bbox, mut flags) = box_extent_ellipse(
        x,
        y,
        form,
        r,
        frame.width(),
        frame.height(),
        config.row_boundary,
    );

    let mut r1 = 0.0;
    let mut v1 = 0.0;
    let mut area = 0usize;

    for iy in bbox.ymin..bbox.ymax {
        let row = wrap_row(iy, frame.height());
        let dy = iy as f64 - y;
        for ix in bbox.xmin..bbox.xmax {
            let dx = ix as f64 - x;
            let rpix2 = form.eval(dx, dy);
            if rpix2 > r2 {
                continue;
            }

            let col = ix as usize;
            let pix = frame.pixel(row, col);
            if pix < INVALID_PIXEL_SENTINEL || frame.is_masked(row, col, config.mask_threshold) {
                flags |= ApertureFlags::HAS_MASKED;
            } else {
                r1 += rpix2.sqrt() * pix;
                v1 += pix;
                area += 1;
            }
        }
    }

    let radius = if area == 0 {
        flags |= ApertureFlags::ALL_MASKED;
        0.0
    } else if r1 <= 0.0 || v1 <= 0.0 {
        log::debug!("Kron radius at ({x:.2}, {y:.2}) undefined: r1={r1}, v1={v1}");
        flags |= ApertureFlags::NON_POSITIVE;
        0.0
    } else {
        r1 / v1
    };

    Ok(KronRadius { radius, flags })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ellipse::ellipse_coeffs;
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use std::f64::consts::PI;

    fn gaussian(size: usize, cx: f64, cy: f64, sigma: f64) -> Array2<f64> {
        Array2::from_shape_fn((size, size), |(row, col)| {
            let dx = col as f64 - cx;
            let dy = row as f64 - cy;
            (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp()
        })
    }

    #[test]
    fn test_gaussian_kron_radius() {
        // Flux-weighted mean radius of a 2-D Gaussian is σ·√(π/2)
        let sigma = 3.0;
        let data = gaussian(81, 40.0, 40.0, sigma);
        let frame = Frame::new(&data);
        let form = QuadraticForm::new(1.0, 1.0, 0.0);

        let kron = kron_radius(&frame, 40.0, 40.0, &form, 6.0 * sigma, &PhotometryConfig::default())
            .unwrap();
        assert!(kron.flags.is_empty());
        assert_relative_eq!(kron.radius, sigma * (PI / 2.0).sqrt(), max_relative = 0.02);
    }

    #[test]
    fn test_kron_radius_in_reduced_units() {
        // A matching elliptical Gaussian has the same radius in reduced units
        let (a, b, theta) = (4.0, 2.0, 0.4);
        let form = ellipse_coeffs(a, b, theta);
        let data = Array2::from_shape_fn((101, 101), |(row, col)| {
            let q = form.eval(col as f64 - 50.0, row as f64 - 50.0);
            (-q / 2.0).exp()
        });
        let frame = Frame::new(&data);

        let kron =
            kron_radius(&frame, 50.0, 50.0, &form, 6.0, &PhotometryConfig::default()).unwrap();
        assert_relative_eq!(kron.radius, (PI / 2.0).sqrt(), max_relative = 0.02);
    }

    #[test]
    fn test_sentinel_and_masked_pixels_are_skipped() {
        let mut data = Array2::<f64>::ones((21, 21));
        data[[10, 11]] = -1.0e31;
        let mut mask = Array2::<f64>::zeros((21, 21));
        mask[[10, 9]] = 1.0;
        let frame = Frame::new(&data).with_mask(&mask).unwrap();
        let form = QuadraticForm::new(1.0, 1.0, 0.0);

        let kron =
            kron_radius(&frame, 10.0, 10.0, &form, 3.0, &PhotometryConfig::default()).unwrap();
        assert!(kron.flags.contains(ApertureFlags::HAS_MASKED));
        assert!(kron.radius > 0.0);
    }

    #[test]
    fn test_all_masked() {
        let data = Array2::<f64>::ones((11, 11));
        let mask = Array2::<f64>::ones((11, 11));
        let frame = Frame::new(&data).with_mask(&mask).unwrap();
        let form = QuadraticForm::new(1.0, 1.0, 0.0);

        let kron = kron_radius(&frame, 5.0, 5.0, &form, 3.0, &PhotometryConfig::default()).unwrap();
        assert_eq!(kron.radius, 0.0);
        assert!(kron.flags.contains(ApertureFlags::ALL_MASKED | ApertureFlags::HAS_MASKED));
    }

    #[test]
    fn test_non_positive_flux() {
        let data = Array2::<f64>::from_elem((11, 11), -2.0);
        let frame = Frame::new(&data);
        let form = QuadraticForm::new(1.0, 1.0, 0.0);

        let kron = kron_radius(&frame, 5.0, 5.0, &form, 3.0, &PhotometryConfig::default()).unwrap();
        assert_eq!(kron.radius, 0.0);
        assert_eq!(kron.flags, ApertureFlags::NON_POSITIVE);
    }

    #[test]
    fn test_invalid_parameters() {
        let data = Array2::<f64>::ones((11, 11));
        let frame = Frame::new(&data);
        let config = PhotometryConfig::default();

        let hyperbola = QuadraticForm::new(1.0, -1.0, 0.0);
        assert_eq!(
            kron_radius(&frame, 5.0, 5.0, &hyperbola, 3.0, &config),
            Err(ApertureError::NonEllipseParams)
        );

        let circle = QuadraticForm::new(1.0, 1.0, 0.0);
        assert!(matches!(
            kron_radius(&frame, 5.0, 5.0, &circle, -1.0, &config),
            Err(ApertureError::IllegalApertureParams(_))
        ));
    }
}

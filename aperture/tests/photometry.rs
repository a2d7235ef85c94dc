//! End-to-end aperture measurements on synthetic frames

mod common;

use std::f64::consts::PI;

use aperture::{
    ellipse_coeffs, flux_radius, kron_radius, subtract_background, sum_aperture,
    sum_apertures_par, sum_circann, sum_circle, sum_ellipse, ApertureFlags, Circle, ErrorInput,
    Frame, InputOptions, PhotometryConfig, QuadraticForm, RawImage, RowBoundary, Sampling,
};
use approx::{assert_abs_diff_eq, assert_relative_eq};
use common::{gaussian_source, init_logging, noisy_flat, to_f32_bytes};
use ndarray::Array2;

#[test]
fn test_circle_area_is_exact_at_subpixel_offsets() {
    init_logging();
    let data = Array2::<f64>::ones((64, 64));
    let frame = Frame::new(&data);
    let config = PhotometryConfig::default();

    for (x, y, r) in [(31.3, 32.8, 7.25), (30.05, 29.5, 3.5), (33.71, 31.12, 12.0)] {
        let result = sum_circle(&frame, x, y, r, &config).unwrap();
        assert_relative_eq!(result.area, PI * r * r, max_relative = 1e-9);
        assert_relative_eq!(result.sum, result.area, max_relative = 1e-12);
    }
}

#[test]
fn test_subpixel_sampling_converges_to_exact() {
    init_logging();
    let data = Array2::<f64>::ones((50, 50));
    let frame = Frame::new(&data);
    let r = 6.3;
    let exact = PI * r * r;

    let coarse = sum_circle(
        &frame,
        24.7,
        25.2,
        r,
        &PhotometryConfig::default().with_sampling(Sampling::Subpixel(2)),
    )
    .unwrap();
    let fine = sum_circle(
        &frame,
        24.7,
        25.2,
        r,
        &PhotometryConfig::default().with_sampling(Sampling::Subpixel(32)),
    )
    .unwrap();

    assert!((fine.area - exact).abs() <= (coarse.area - exact).abs() + 1e-9);
    assert_relative_eq!(fine.area, exact, max_relative = 2e-3);
}

#[test]
fn test_gaussian_flux_recovery_with_background() {
    init_logging();
    let (cx, cy, sigma, flux) = (40.4, 39.6, 2.0, 5000.0);
    let mut data = gaussian_source(80, 80, cx, cy, sigma, flux);
    data.mapv_inplace(|v| v + 20.0);
    let frame = Frame::new(&data);
    let config = PhotometryConfig::default();

    let aper = sum_circle(&frame, cx, cy, 6.0 * sigma, &config).unwrap();
    let sky = sum_circann(&frame, cx, cy, 16.0, 24.0, &config).unwrap();
    let net = subtract_background(&aper, &sky);

    assert_abs_diff_eq!(net.sum, flux, epsilon = 5.0);
}

#[test]
fn test_mask_ignore_matches_unmasked_minus_masked_pixels() {
    init_logging();
    let data = noisy_flat(40, 40, 50.0, 3.0, 7);
    let mut mask = Array2::<u8>::zeros((40, 40));
    mask[[20, 20]] = 1;
    mask[[21, 19]] = 1;

    let masked = Frame::new(&data).with_mask(&mask).unwrap();
    let clean = Frame::new(&data);
    let config = PhotometryConfig::default().with_options(InputOptions::MASK_IGNORE);

    let with_mask = sum_circle(&masked, 20.2, 20.1, 5.0, &config).unwrap();
    let without = sum_circle(&clean, 20.2, 20.1, 5.0, &config).unwrap();

    let removed = data[[20, 20]] + data[[21, 19]];
    assert!(with_mask.flags.contains(ApertureFlags::HAS_MASKED));
    assert_relative_eq!(with_mask.sum, without.sum - removed, max_relative = 1e-12);
    assert_relative_eq!(with_mask.area, without.area - 2.0, max_relative = 1e-12);
}

#[test]
fn test_variance_plane_and_gain() {
    init_logging();
    let data = Array2::<f64>::from_elem((30, 30), 100.0);
    let variance = Array2::<f32>::from_elem((30, 30), 9.0);
    let frame = Frame::new(&data)
        .with_error(ErrorInput::Array(&variance))
        .unwrap();
    let config = PhotometryConfig::default()
        .with_options(InputOptions::ERROR_IS_VARIANCE)
        .with_gain(2.0);

    let result = sum_circle(&frame, 15.0, 15.0, 4.0, &config).unwrap();
    assert_relative_eq!(
        result.sumvar,
        9.0 * result.area + result.sum / 2.0,
        max_relative = 1e-12
    );
}

#[test]
fn test_periodic_rows_match_shifted_image() {
    init_logging();
    // Source straddling the top edge of a row-periodic image, and the same
    // image rolled so the source sits in the middle
    let mut wrapped = Array2::<f64>::zeros((40, 40));
    for cy in [-39.7, 0.3, 40.3] {
        wrapped += &gaussian_source(40, 40, 20.0, cy, 1.5, 1000.0);
    }
    let rolled = Array2::from_shape_fn((40, 40), |(row, col)| wrapped[[(row + 20) % 40, col]]);

    let periodic = PhotometryConfig::default().with_row_boundary(RowBoundary::Periodic);
    let edge = sum_circle(&Frame::new(&wrapped), 20.0, 0.3, 5.0, &periodic).unwrap();
    let centre = sum_circle(&Frame::new(&rolled), 20.0, 20.3, 5.0, &periodic).unwrap();

    assert!(edge.flags.is_empty());
    assert_relative_eq!(edge.sum, centre.sum, max_relative = 1e-9);
    assert_relative_eq!(edge.area, centre.area, max_relative = 1e-9);

    let clipped = sum_circle(&Frame::new(&wrapped), 20.0, 0.3, 5.0, &PhotometryConfig::default())
        .unwrap();
    assert!(clipped.flags.contains(ApertureFlags::TRUNCATED));
    assert!(clipped.area < edge.area);
}

#[test]
fn test_raw_f32_buffer_matches_array() {
    init_logging();
    let image = gaussian_source(32, 24, 15.5, 11.0, 2.0, 800.0);
    let bytes = to_f32_bytes(&image);
    let raw = RawImage::from_tag(&bytes, 32, 24, 42).unwrap();
    let as_f32 = image.mapv(|v| v as f32);

    let config = PhotometryConfig::default();
    let from_raw = sum_ellipse(&Frame::new(&raw), 15.5, 11.0, 2.0, 1.2, 0.3, 3.0, &config).unwrap();
    let from_array =
        sum_ellipse(&Frame::new(&as_f32), 15.5, 11.0, 2.0, 1.2, 0.3, 3.0, &config).unwrap();

    assert_eq!(from_raw, from_array);
}

#[test]
fn test_parallel_batch_over_star_field() {
    init_logging();
    let stars = [(12.0, 14.0), (40.5, 18.2), (25.3, 44.8), (50.0, 50.0)];
    let mut data = Array2::<f64>::zeros((64, 64));
    for &(x, y) in &stars {
        data += &gaussian_source(64, 64, x, y, 1.5, 1000.0);
    }
    let frame = Frame::new(&data);
    let circle = Circle::new(7.0).unwrap();
    let config = PhotometryConfig::default();

    let results = sum_apertures_par(&frame, &circle, &stars, &config);
    for (result, &(x, y)) in results.iter().zip(&stars) {
        let result = result.as_ref().unwrap();
        assert_eq!(*result, sum_aperture(&frame, x, y, &circle, &config).unwrap());
        assert_relative_eq!(result.sum, 1000.0, max_relative = 1e-3);
    }
}

#[test]
fn test_kron_and_flux_radius_of_gaussian() {
    init_logging();
    let sigma = 2.5;
    let data = gaussian_source(96, 96, 48.0, 48.0, sigma, 1.0);
    let frame = Frame::new(&data);
    let config = PhotometryConfig::default();

    let circle = QuadraticForm::new(1.0, 1.0, 0.0);
    let kron = kron_radius(&frame, 48.0, 48.0, &circle, 6.0 * sigma, &config).unwrap();
    assert_relative_eq!(kron.radius, sigma * (PI / 2.0).sqrt(), max_relative = 0.02);

    // Enclosed flux of a Gaussian: 1 - exp(-r²/2σ²)
    let fractions = [0.25, 0.5, 0.75];
    let radii = flux_radius(&frame, 48.0, 48.0, 8.0 * sigma, 5, &fractions, Some(1.0), &config)
        .unwrap();
    for (frac, r) in fractions.iter().zip(&radii.radii) {
        let expected = sigma * (-2.0 * (1.0 - frac).ln()).sqrt();
        assert_relative_eq!(*r, expected, max_relative = 0.02);
    }
}

#[test]
fn test_elliptical_source_kron_scale() {
    init_logging();
    let form = ellipse_coeffs(3.0, 1.5, -0.6);
    let data = Array2::from_shape_fn((64, 64), |(row, col)| {
        (-form.eval(col as f64 - 32.0, row as f64 - 32.0) / 2.0).exp()
    });
    let frame = Frame::new(&data);

    let kron = kron_radius(&frame, 32.0, 32.0, &form, 6.0, &PhotometryConfig::default()).unwrap();
    assert_relative_eq!(kron.radius, (PI / 2.0).sqrt(), max_relative = 0.03);
}

//! Synthetic image builders shared by the integration tests

#![allow(dead_code)]

use ndarray::Array2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Circular Gaussian of unit total flux scaled by `flux`, sampled at pixel centres
pub fn gaussian_source(
    width: usize,
    height: usize,
    cx: f64,
    cy: f64,
    sigma: f64,
    flux: f64,
) -> Array2<f64> {
    let norm = flux / (2.0 * std::f64::consts::PI * sigma * sigma);
    Array2::from_shape_fn((height, width), |(row, col)| {
        let dx = col as f64 - cx;
        let dy = row as f64 - cy;
        norm * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp()
    })
}

/// Flat frame with seeded Gaussian noise around `level`
pub fn noisy_flat(width: usize, height: usize, level: f64, std_dev: f64, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let normal = Normal::new(level, std_dev).unwrap();
    Array2::from_shape_fn((height, width), |_| normal.sample(&mut rng))
}

/// Native-endian byte image of an `f32` array
pub fn to_f32_bytes(image: &Array2<f64>) -> Vec<u8> {
    image
        .iter()
        .flat_map(|&v| (v as f32).to_ne_bytes())
        .collect()
}

//! Conversions between ellipse representations.
//!
//! An ellipse is described either by its semi-axes and position angle
//! `(a, b, theta)` or by the quadratic form `cxx·x² + cyy·y² + cxy·x·y = 1`.
//! Scaling the right-hand side to `r²` scales the ellipse by `r`, which is how
//! Kron and elliptical apertures express their size.

use std::f64::consts::PI;

use crate::error::ApertureError;

/// Semi-major axis, semi-minor axis and position angle of an ellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseAxes {
    pub a: f64,
    pub b: f64,
    /// Angle of the major axis from +x, counter-clockwise, in (−π/2, π/2]
    pub theta: f64,
}

/// Coefficients of `cxx·x² + cyy·y² + cxy·x·y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticForm {
    pub cxx: f64,
    pub cyy: f64,
    pub cxy: f64,
}

impl QuadraticForm {
    pub fn new(cxx: f64, cyy: f64, cxy: f64) -> Self {
        Self { cxx, cyy, cxy }
    }

    /// Whether the coefficients describe a real, non-degenerate ellipse
    pub fn is_ellipse(&self) -> bool {
        self.cxx * self.cyy - self.cxy * self.cxy / 4.0 > 0.0 && self.cxx + self.cyy > 0.0
    }

    /// Evaluate the form at an offset from the ellipse centre
    #[inline]
    pub fn eval(&self, dx: f64, dy: f64) -> f64 {
        self.cxx * dx * dx + self.cyy * dy * dy + self.cxy * dx * dy
    }
}

/// Semi-axes and position angle from a quadratic form.
///
/// Fails with [`ApertureError::NonEllipseParams`] unless
/// `cxx·cyy − cxy²/4 > 0` and `cxx + cyy > 0`.
pub fn ellipse_axes(form: &QuadraticForm) -> Result<EllipseAxes, ApertureError> {
    let QuadraticForm { cxx, cyy, cxy } = *form;
    if !form.is_ellipse() {
        return Err(ApertureError::NonEllipseParams);
    }

    let p = cxx + cyy;
    let q = cxx - cyy;
    let t = (q * q + cxy * cxy).sqrt();

    let a = (2.0 / (p - t)).sqrt();
    let b = (2.0 / (p + t)).sqrt();

    // tan(2θ) = cxy/q with cos(2θ) of opposite sign to q, since 1/a² < 1/b²
    let mut theta = if cxy == 0.0 && q == 0.0 {
        0.0
    } else {
        0.5 * (-cxy).atan2(-q)
    };
    if theta <= -PI / 2.0 {
        theta += PI;
    }

    Ok(EllipseAxes { a, b, theta })
}

/// Quadratic form from semi-axes and position angle.
pub fn ellipse_coeffs(a: f64, b: f64, theta: f64) -> QuadraticForm {
    let (sin_t, cos_t) = theta.sin_cos();
    let inv_a2 = 1.0 / (a * a);
    let inv_b2 = 1.0 / (b * b);

    QuadraticForm {
        cxx: cos_t * cos_t * inv_a2 + sin_t * sin_t * inv_b2,
        cyy: sin_t * sin_t * inv_a2 + cos_t * cos_t * inv_b2,
        cxy: 2.0 * cos_t * sin_t * (inv_a2 - inv_b2),
    }
}

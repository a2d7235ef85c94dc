//! Aperture shapes and the per-pixel tests the summation engine relies on.
//!
//! Each shape is validated and has its derived constants (squared radii,
//! quadratic-form coefficients, oversampled margins) computed once at
//! construction. The engine then only needs a reduced distance per pixel, a
//! three-way zone test on it, and the exact overlap for boundary pixels.

use std::f64::consts::FRAC_PI_2;

use crate::config::RowBoundary;
use crate::ellipse::{ellipse_coeffs, QuadraticForm};
use crate::error::ApertureError;
use crate::extent::{box_extent, box_extent_ellipse, PixelBox};
use crate::flags::ApertureFlags;
use crate::margins::OversampledAnnulus;
use crate::overlap::{circle_overlap, ellipse_overlap};

/// Classification of a pixel relative to an aperture boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// The whole pixel lies outside the aperture
    Outside,
    /// The pixel may straddle the boundary and needs a fractional weight
    Boundary,
    /// The whole pixel lies inside the aperture
    Inside,
}

/// Geometry of an aperture, independent of where it is placed.
///
/// Offsets `(dx, dy)` are measured from the aperture centre to a pixel centre.
pub trait ApertureShape: Sync {
    /// Pixel bounding box for an aperture centred at `(x, y)`.
    fn bounds(
        &self,
        x: f64,
        y: f64,
        width: usize,
        height: usize,
        rows: RowBoundary,
    ) -> (PixelBox, ApertureFlags);

    /// Distance measure compared against the squared radii of the shape.
    fn reduced_distance(&self, dx: f64, dy: f64) -> f64;

    /// Zone of a pixel with the given reduced distance.
    fn zone(&self, rpix2: f64) -> Zone;

    /// Whether a point with the given reduced distance is inside the true boundary.
    fn contains(&self, rpix2: f64) -> bool;

    /// Exact fraction of the unit pixel at `(dx, dy)` covered by the shape.
    fn exact_overlap(&self, dx: f64, dy: f64) -> f64;

    /// Fraction of the pixel covered, estimated from `subpix × subpix` point tests.
    fn sampled_overlap(&self, dx: f64, dy: f64, subpix: u32) -> f64 {
        let scale = 1.0 / subpix as f64;
        let scale2 = scale * scale;
        let offset = 0.5 * (scale - 1.0);

        let mut overlap = 0.0;
        for sy in 0..subpix {
            let sdy = dy + offset + sy as f64 * scale;
            for sx in 0..subpix {
                let sdx = dx + offset + sx as f64 * scale;
                if self.contains(self.reduced_distance(sdx, sdy)) {
                    overlap += scale2;
                }
            }
        }
        overlap
    }
}

fn check_ellipse_axes(a: f64, b: f64, theta: f64) -> Result<(), ApertureError> {
    if !(b > 0.0 && a >= b && (-FRAC_PI_2..=FRAC_PI_2).contains(&theta)) {
        return Err(ApertureError::IllegalApertureParams(format!(
            "ellipse needs a >= b > 0 and |theta| <= pi/2, got a={a}, b={b}, theta={theta}"
        )));
    }
    Ok(())
}

#[inline]
fn single_zone(rpix2: f64, margins: &OversampledAnnulus) -> Zone {
    if rpix2 >= margins.outer2 {
        Zone::Outside
    } else if rpix2 < margins.inner2 {
        Zone::Inside
    } else {
        Zone::Boundary
    }
}

#[inline]
fn annulus_zone(rpix2: f64, inner: &OversampledAnnulus, outer: &OversampledAnnulus) -> Zone {
    if rpix2 >= outer.outer2 || rpix2 < inner.inner2 {
        Zone::Outside
    } else if rpix2 < outer.inner2 && rpix2 >= inner.outer2 {
        Zone::Inside
    } else {
        Zone::Boundary
    }
}

/// Circle of radius `r`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    r: f64,
    r2: f64,
    margins: OversampledAnnulus,
}

impl Circle {
    pub fn new(r: f64) -> Result<Self, ApertureError> {
        if !(r >= 0.0) {
            return Err(ApertureError::IllegalApertureParams(format!(
                "radius must be non-negative, got {r}"
            )));
        }
        Ok(Self {
            r,
            r2: r * r,
            margins: OversampledAnnulus::circle(r),
        })
    }

    pub fn radius(&self) -> f64 {
        self.r
    }
}

impl ApertureShape for Circle {
    fn bounds(
        &self,
        x: f64,
        y: f64,
        width: usize,
        height: usize,
        rows: RowBoundary,
    ) -> (PixelBox, ApertureFlags) {
        box_extent(x, y, self.r, self.r, width, height, rows)
    }

    #[inline]
    fn reduced_distance(&self, dx: f64, dy: f64) -> f64 {
        dx * dx + dy * dy
    }

    #[inline]
    fn zone(&self, rpix2: f64) -> Zone {
        single_zone(rpix2, &self.margins)
    }

    #[inline]
    fn contains(&self, rpix2: f64) -> bool {
        rpix2 < self.r2
    }

    fn exact_overlap(&self, dx: f64, dy: f64) -> f64 {
        circle_overlap(dx - 0.5, dy - 0.5, dx + 0.5, dy + 0.5, self.r)
    }
}

/// Ellipse with semi-axes `a`, `b` and position angle `theta`, scaled by `r`.
///
/// The aperture covers `cxx·dx² + cyy·dy² + cxy·dx·dy < r²`, so its true
/// semi-axes are `a·r` and `b·r`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    a: f64,
    b: f64,
    theta: f64,
    r: f64,
    r2: f64,
    form: QuadraticForm,
    margins: OversampledAnnulus,
}

impl Ellipse {
    pub fn new(a: f64, b: f64, theta: f64, r: f64) -> Result<Self, ApertureError> {
        if !(r >= 0.0) {
            return Err(ApertureError::IllegalApertureParams(format!(
                "ellipse scale must be non-negative, got {r}"
            )));
        }
        check_ellipse_axes(a, b, theta)?;

        Ok(Self {
            a,
            b,
            theta,
            r,
            r2: r * r,
            form: ellipse_coeffs(a, b, theta),
            margins: OversampledAnnulus::ellipse(r, b),
        })
    }

    /// Quadratic form of the unscaled ellipse
    pub fn form(&self) -> &QuadraticForm {
        &self.form
    }
}

impl ApertureShape for Ellipse {
    fn bounds(
        &self,
        x: f64,
        y: f64,
        width: usize,
        height: usize,
        rows: RowBoundary,
    ) -> (PixelBox, ApertureFlags) {
        box_extent_ellipse(x, y, &self.form, self.r, width, height, rows)
    }

    #[inline]
    fn reduced_distance(&self, dx: f64, dy: f64) -> f64 {
        self.form.eval(dx, dy)
    }

    #[inline]
    fn zone(&self, rpix2: f64) -> Zone {
        single_zone(rpix2, &self.margins)
    }

    #[inline]
    fn contains(&self, rpix2: f64) -> bool {
        rpix2 < self.r2
    }

    fn exact_overlap(&self, dx: f64, dy: f64) -> f64 {
        ellipse_overlap(
            dx - 0.5,
            dy - 0.5,
            dx + 0.5,
            dy + 0.5,
            self.a * self.r,
            self.b * self.r,
            self.theta,
        )
    }
}

/// Circular annulus between `rin` and `rout`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularAnnulus {
    rin: f64,
    rout: f64,
    rin2: f64,
    rout2: f64,
    inner: OversampledAnnulus,
    outer: OversampledAnnulus,
}

impl CircularAnnulus {
    pub fn new(rin: f64, rout: f64) -> Result<Self, ApertureError> {
        if !(rin >= 0.0 && rout >= rin) {
            return Err(ApertureError::IllegalApertureParams(format!(
                "annulus needs 0 <= rin <= rout, got rin={rin}, rout={rout}"
            )));
        }
        Ok(Self {
            rin,
            rout,
            rin2: rin * rin,
            rout2: rout * rout,
            inner: OversampledAnnulus::circle(rin),
            outer: OversampledAnnulus::circle(rout),
        })
    }
}

impl ApertureShape for CircularAnnulus {
    fn bounds(
        &self,
        x: f64,
        y: f64,
        width: usize,
        height: usize,
        rows: RowBoundary,
    ) -> (PixelBox, ApertureFlags) {
        box_extent(x, y, self.rout, self.rout, width, height, rows)
    }

    #[inline]
    fn reduced_distance(&self, dx: f64, dy: f64) -> f64 {
        dx * dx + dy * dy
    }

    #[inline]
    fn zone(&self, rpix2: f64) -> Zone {
        annulus_zone(rpix2, &self.inner, &self.outer)
    }

    #[inline]
    fn contains(&self, rpix2: f64) -> bool {
        rpix2 < self.rout2 && rpix2 >= self.rin2
    }

    fn exact_overlap(&self, dx: f64, dy: f64) -> f64 {
        let (x0, y0, x1, y1) = (dx - 0.5, dy - 0.5, dx + 0.5, dy + 0.5);
        circle_overlap(x0, y0, x1, y1, self.rout) - circle_overlap(x0, y0, x1, y1, self.rin)
    }
}

/// Elliptical annulus between scales `rin` and `rout` of one ellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipticalAnnulus {
    a: f64,
    b: f64,
    theta: f64,
    rin: f64,
    rout: f64,
    rin2: f64,
    rout2: f64,
    form: QuadraticForm,
    inner: OversampledAnnulus,
    outer: OversampledAnnulus,
}

impl EllipticalAnnulus {
    pub fn new(a: f64, b: f64, theta: f64, rin: f64, rout: f64) -> Result<Self, ApertureError> {
        if !(rin >= 0.0 && rout >= rin) {
            return Err(ApertureError::IllegalApertureParams(format!(
                "annulus needs 0 <= rin <= rout, got rin={rin}, rout={rout}"
            )));
        }
        check_ellipse_axes(a, b, theta)?;

        Ok(Self {
            a,
            b,
            theta,
            rin,
            rout,
            rin2: rin * rin,
            rout2: rout * rout,
            form: ellipse_coeffs(a, b, theta),
            inner: OversampledAnnulus::ellipse(rin, b),
            outer: OversampledAnnulus::ellipse(rout, b),
        })
    }
}

impl ApertureShape for EllipticalAnnulus {
    fn bounds(
        &self,
        x: f64,
        y: f64,
        width: usize,
        height: usize,
        rows: RowBoundary,
    ) -> (PixelBox, ApertureFlags) {
        box_extent_ellipse(x, y, &self.form, self.rout, width, height, rows)
    }

    #[inline]
    fn reduced_distance(&self, dx: f64, dy: f64) -> f64 {
        self.form.eval(dx, dy)
    }

    #[inline]
    fn zone(&self, rpix2: f64) -> Zone {
        annulus_zone(rpix2, &self.inner, &self.outer)
    }

    #[inline]
    fn contains(&self, rpix2: f64) -> bool {
        rpix2 < self.rout2 && rpix2 >= self.rin2
    }

    fn exact_overlap(&self, dx: f64, dy: f64) -> f64 {
        let (x0, y0, x1, y1) = (dx - 0.5, dy - 0.5, dx + 0.5, dy + 0.5);
        let (a, b, theta) = (self.a, self.b, self.theta);
        ellipse_overlap(x0, y0, x1, y1, a * self.rout, b * self.rout, theta)
            - ellipse_overlap(x0, y0, x1, y1, a * self.rin, b * self.rin, theta)
    }
}

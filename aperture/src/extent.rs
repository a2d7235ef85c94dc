//! Pixel bounding boxes for apertures.
//!
//! Pixel `i` covers `[i − 0.5, i + 0.5)`, so a box includes every pixel whose
//! centre lies within half a pixel of the aperture's axis-aligned envelope.

use crate::config::RowBoundary;
use crate::ellipse::QuadraticForm;
use crate::flags::ApertureFlags;

/// Half-open pixel ranges `[xmin, xmax) × [ymin, ymax)`.
///
/// Columns are always within `[0, width]`. Rows are within `[0, height]` when
/// clipping, or may extend past either edge under [`RowBoundary::Periodic`], in
/// which case they are mapped back with [`wrap_row`](crate::wrap_row).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub xmin: i64,
    pub xmax: i64,
    pub ymin: i64,
    pub ymax: i64,
}

impl PixelBox {
    /// Number of pixels covered by the box
    pub fn area(&self) -> usize {
        let w = (self.xmax - self.xmin).max(0) as usize;
        let h = (self.ymax - self.ymin).max(0) as usize;
        w * h
    }
}

/// Bounding box of an axis-aligned envelope with half-extents `rx`, `ry`.
///
/// Any bound that leaves the image is clamped and reported as
/// [`ApertureFlags::TRUNCATED`]. Under periodic rows the y-range is left as is,
/// limited to one image height.
pub fn box_extent(
    x: f64,
    y: f64,
    rx: f64,
    ry: f64,
    width: usize,
    height: usize,
    rows: RowBoundary,
) -> (PixelBox, ApertureFlags) {
    let mut flags = ApertureFlags::empty();
    let (w, h) = (width as i64, height as i64);

    let mut bbox = PixelBox {
        xmin: (x - rx + 0.5).floor() as i64,
        xmax: (x + rx + 1.4999999).floor() as i64,
        ymin: (y - ry + 0.5).floor() as i64,
        ymax: (y + ry + 1.4999999).floor() as i64,
    };

    if bbox.xmin < 0 {
        bbox.xmin = 0;
        flags |= ApertureFlags::TRUNCATED;
    }
    if bbox.xmax > w {
        bbox.xmax = w;
        flags |= ApertureFlags::TRUNCATED;
    }

    if rows == RowBoundary::Periodic && height > 0 {
        if bbox.ymax - bbox.ymin > h {
            bbox.ymax = bbox.ymin + h;
            flags |= ApertureFlags::TRUNCATED;
        }
    } else {
        if bbox.ymin < 0 {
            bbox.ymin = 0;
            flags |= ApertureFlags::TRUNCATED;
        }
        if bbox.ymax > h {
            bbox.ymax = h;
            flags |= ApertureFlags::TRUNCATED;
        }
    }

    if !flags.is_empty() {
        log::trace!("aperture box at ({x:.2}, {y:.2}) clipped to {bbox:?}");
    }

    (bbox, flags)
}

/// Bounding box of the ellipse `form(dx, dy) ≤ r²`.
///
/// The half-extents are `r / √(cxx − cxy²/4cyy)` in x and the symmetric
/// expression in y; a non-positive denominator gives a zero half-extent.
pub fn box_extent_ellipse(
    x: f64,
    y: f64,
    form: &QuadraticForm,
    r: f64,
    width: usize,
    height: usize,
    rows: RowBoundary,
) -> (PixelBox, ApertureFlags) {
    let QuadraticForm { cxx, cyy, cxy } = *form;

    let dxlim = cxx - cxy * cxy / (4.0 * cyy);
    let dxlim = if dxlim > 0.0 { r / dxlim.sqrt() } else { 0.0 };
    let dylim = cyy - cxy * cxy / (4.0 * cxx);
    let dylim = if dylim > 0.0 { r / dylim.sqrt() } else { 0.0 };

    box_extent(x, y, dxlim, dylim, width, height, rows)
}

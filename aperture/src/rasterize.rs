//! Painting elliptical regions into an image, e.g. for segmentation masks.

use ndarray::ArrayViewMut2;

use crate::config::RowBoundary;
use crate::ellipse::QuadraticForm;
use crate::extent::box_extent_ellipse;
use crate::flags::ApertureFlags;

/// Set every pixel with `form(dx, dy) ≤ r²` around `(x, y)` to `val`.
///
/// Pixels outside the array are skipped; the returned flags carry
/// [`ApertureFlags::TRUNCATED`] when that happened. Rows never wrap.
///
/// # Examples
/// ```
/// use aperture::{set_ellipse, QuadraticForm};
/// use ndarray::Array2;
///
/// let mut seg = Array2::<u8>::zeros((9, 9));
/// let circle = QuadraticForm::new(1.0, 1.0, 0.0);
/// set_ellipse(seg.view_mut(), 4.0, 4.0, &circle, 2.0, 7);
/// assert_eq!(seg[[4, 6]], 7);
/// assert_eq!(seg[[4, 7]], 0);
/// ```
pub fn set_ellipse<T: Copy>(
    mut arr: ArrayViewMut2<T>,
    x: f64,
    y: f64,
    form: &QuadraticForm,
    r: f64,
    val: T,
) -> ApertureFlags {
    let (height, width) = arr.dim();
    let r2 = r * r;
    let (bbox, flags) = box_extent_ellipse(x, y, form, r, width, height, RowBoundary::Clip);

    for iy in bbox.ymin..bbox.ymax {
        let dy = iy as f64 - y;
        let mut row = arr.row_mut(iy as usize);
        for ix in bbox.xmin..bbox.xmax {
            if form.eval(ix as f64 - x, dy) <= r2 {
                row[ix as usize] = val;
            }
        }
    }

    flags
}

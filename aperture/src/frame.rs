//! Measurement inputs: data, error and mask planes plus row addressing.

use crate::error::ApertureError;
use crate::flags::InputOptions;
use crate::pixel::PixelSource;

/// Per-pixel uncertainty supplied alongside the data plane.
#[derive(Clone, Copy, Default)]
pub enum ErrorInput<'a> {
    /// No error information; summed variance stays zero (apart from Poisson noise).
    #[default]
    None,
    /// One error value applied to every pixel.
    Scalar(f64),
    /// A per-pixel error plane with the same shape as the data.
    Array(&'a dyn PixelSource),
}

/// Read-only view of the planes an aperture is measured on.
///
/// # Examples
/// ```rust
/// use aperture::{ErrorInput, Frame};
/// use ndarray::Array2;
///
/// let data = Array2::<f32>::ones((32, 32));
/// let mask = Array2::<u8>::zeros((32, 32));
/// let frame = Frame::new(&data)
///     .with_error(ErrorInput::Scalar(0.5))
///     .unwrap()
///     .with_mask(&mask)
///     .unwrap();
/// assert_eq!(frame.width(), 32);
/// ```
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    data: &'a dyn PixelSource,
    error: ErrorInput<'a>,
    mask: Option<&'a dyn PixelSource>,
    height: usize,
    width: usize,
}

impl<'a> Frame<'a> {
    /// Frame with only a data plane.
    pub fn new(data: &'a dyn PixelSource) -> Self {
        let (height, width) = data.dim();
        Self {
            data,
            error: ErrorInput::None,
            mask: None,
            height,
            width,
        }
    }

    /// Attach error information; an error plane must match the data shape.
    pub fn with_error(mut self, error: ErrorInput<'a>) -> Result<Self, ApertureError> {
        if let ErrorInput::Array(plane) = error {
            self.check_shape("error", plane)?;
        }
        self.error = error;
        Ok(self)
    }

    /// Attach a mask plane, which must match the data shape.
    pub fn with_mask(mut self, mask: &'a dyn PixelSource) -> Result<Self, ApertureError> {
        self.check_shape("mask", mask)?;
        self.mask = Some(mask);
        Ok(self)
    }

    fn check_shape(
        &self,
        plane: &'static str,
        source: &dyn PixelSource,
    ) -> Result<(), ApertureError> {
        let actual = source.dim();
        let expected = (self.height, self.width);
        if actual != expected {
            return Err(ApertureError::ShapeMismatch {
                plane,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether a mask plane is attached
    pub fn has_mask(&self) -> bool {
        self.mask.is_some()
    }

    #[inline]
    pub(crate) fn pixel(&self, row: usize, col: usize) -> f64 {
        self.data.value(row, col)
    }

    #[inline]
    pub(crate) fn is_masked(&self, row: usize, col: usize, threshold: f64) -> bool {
        match self.mask {
            Some(mask) => mask.value(row, col) > threshold,
            None => false,
        }
    }

    /// Variance model resolved once per measurement.
    pub(crate) fn variance(&self, options: InputOptions) -> VarianceModel<'a> {
        let is_std = !options.contains(InputOptions::ERROR_IS_VARIANCE);
        match self.error {
            ErrorInput::None => VarianceModel::Constant(0.0),
            ErrorInput::Scalar(err) => {
                VarianceModel::Constant(if is_std { err * err } else { err })
            }
            ErrorInput::Array(plane) => VarianceModel::PerPixel { plane, is_std },
        }
    }
}

/// Pixel variance lookup with the std-to-variance conversion folded in.
#[derive(Clone, Copy)]
pub(crate) enum VarianceModel<'a> {
    Constant(f64),
    PerPixel {
        plane: &'a dyn PixelSource,
        is_std: bool,
    },
}

impl VarianceModel<'_> {
    #[inline]
    pub(crate) fn at(&self, row: usize, col: usize) -> f64 {
        match *self {
            VarianceModel::Constant(var) => var,
            VarianceModel::PerPixel { plane, is_std } => {
                let err = plane.value(row, col);
                if is_std {
                    err * err
                } else {
                    err
                }
            }
        }
    }
}

/// Map a possibly out-of-range row index onto the image.
///
/// Rows are periodic (`iy mod height`, always non-negative); columns are never
/// wrapped and must be clipped by the caller. `height` must be non-zero.
#[inline]
pub fn wrap_row(iy: i64, height: usize) -> usize {
    iy.rem_euclid(height as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_wrap_row_in_range() {
        for iy in 0..10 {
            assert_eq!(wrap_row(iy, 10), iy as usize);
        }
    }

    #[test]
    fn test_wrap_row_past_bottom_edge() {
        assert_eq!(wrap_row(10, 10), 0);
        assert_eq!(wrap_row(11, 10), 1);
        assert_eq!(wrap_row(29, 10), 9);
    }

    #[test]
    fn test_wrap_row_past_top_edge() {
        assert_eq!(wrap_row(-1, 10), 9);
        assert_eq!(wrap_row(-10, 10), 0);
        assert_eq!(wrap_row(-11, 10), 9);
    }

    #[test]
    fn test_shape_checks() {
        let data = Array2::<f64>::zeros((4, 5));
        let wrong = Array2::<f64>::zeros((5, 4));

        let err = Frame::new(&data).with_mask(&wrong).err().unwrap();
        assert_eq!(
            err,
            ApertureError::ShapeMismatch {
                plane: "mask",
                expected: (4, 5),
                actual: (5, 4)
            }
        );
        assert!(Frame::new(&data)
            .with_error(ErrorInput::Array(&wrong))
            .is_err());
        assert!(Frame::new(&data)
            .with_error(ErrorInput::Scalar(1.0))
            .is_ok());
    }

    #[test]
    fn test_variance_model() {
        let data = Array2::<f64>::zeros((2, 2));
        let err = Array2::<f64>::from_elem((2, 2), 3.0);

        let frame = Frame::new(&data).with_error(ErrorInput::Scalar(2.0)).unwrap();
        assert_eq!(frame.variance(InputOptions::empty()).at(0, 0), 4.0);
        assert_eq!(frame.variance(InputOptions::ERROR_IS_VARIANCE).at(0, 0), 2.0);

        let frame = Frame::new(&data).with_error(ErrorInput::Array(&err)).unwrap();
        assert_eq!(frame.variance(InputOptions::empty()).at(1, 1), 9.0);
        assert_eq!(frame.variance(InputOptions::ERROR_IS_VARIANCE).at(1, 1), 3.0);

        let frame = Frame::new(&data);
        assert_eq!(frame.variance(InputOptions::empty()).at(1, 0), 0.0);
    }

    #[test]
    fn test_mask_threshold() {
        let data = Array2::<f64>::zeros((2, 2));
        let mut mask = Array2::<u8>::zeros((2, 2));
        mask[[0, 1]] = 1;
        let frame = Frame::new(&data).with_mask(&mask).unwrap();

        assert!(frame.is_masked(0, 1, 0.0));
        assert!(!frame.is_masked(0, 1, 1.0));
        assert!(!frame.is_masked(1, 1, 0.0));
    }
}

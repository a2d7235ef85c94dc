//! Error type shared by every aperture operation.

use thiserror::Error;

/// Errors that can occur while setting up or running an aperture measurement.
///
/// All variants are raised by upfront validation, before any pixel is read, so a
/// failing call never produces partial results. Degenerate but valid inputs
/// (fully masked regions, non-positive flux) are reported through
/// [`ApertureFlags`](crate::ApertureFlags) instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApertureError {
    #[error("Illegal aperture parameters: {0}")]
    IllegalApertureParams(String),

    #[error("Illegal sub-pixel sampling factor {0}, must be at least 1")]
    IllegalSubpix(u32),

    #[error("Quadratic form does not describe an ellipse")]
    NonEllipseParams,

    #[error("Unsupported pixel data type tag {0}")]
    UnsupportedDataType(i32),

    #[error("Image of {width}x{height} pixels does not fit in memory")]
    ImageTooLarge { width: usize, height: usize },

    #[error("Buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("{plane} plane is {actual:?} (rows, cols), data plane is {expected:?}")]
    ShapeMismatch {
        plane: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

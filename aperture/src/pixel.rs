//! Pixel value access for the data, error and mask planes.
//!
//! Measurements read pixels through the [`PixelSource`] trait, which yields
//! every value as `f64` regardless of how the plane is stored. Two kinds of
//! sources are provided:
//!
//! - any 2-D `ndarray` array or view of a primitive numeric type
//! - [`RawImage`], a row-major byte buffer whose element encoding is chosen at
//!   runtime by a [`DataType`] tag and decoded by a resolved [`Converter`]

use ndarray::{ArrayBase, Data, Ix2};
use num_traits::AsPrimitive;

use crate::error::ApertureError;

/// Element encodings understood by [`RawImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Unsigned 8-bit integer
    U8,
    /// Signed 32-bit integer
    I32,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
}

impl DataType {
    /// Resolve a numeric type tag (11, 31, 42 or 82).
    pub fn from_tag(tag: i32) -> Result<Self, ApertureError> {
        match tag {
            11 => Ok(Self::U8),
            31 => Ok(Self::I32),
            42 => Ok(Self::F32),
            82 => Ok(Self::F64),
            other => Err(ApertureError::UnsupportedDataType(other)),
        }
    }

    /// Numeric tag of this encoding
    pub fn tag(&self) -> i32 {
        match self {
            Self::U8 => 11,
            Self::I32 => 31,
            Self::F32 => 42,
            Self::F64 => 82,
        }
    }
}

/// Decodes one native-endian element starting at the beginning of the slice.
pub type Converter = fn(&[u8]) -> f64;

fn convert_u8(bytes: &[u8]) -> f64 {
    bytes[0] as f64
}

fn convert_i32(bytes: &[u8]) -> f64 {
    i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
}

fn convert_f32(bytes: &[u8]) -> f64 {
    f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
}

fn convert_f64(bytes: &[u8]) -> f64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    f64::from_ne_bytes(raw)
}

/// Look up the converter and element size in bytes for an encoding.
pub fn resolve_converter(dtype: DataType) -> (Converter, usize) {
    match dtype {
        DataType::U8 => (convert_u8 as Converter, 1),
        DataType::I32 => (convert_i32, 4),
        DataType::F32 => (convert_f32, 4),
        DataType::F64 => (convert_f64, 8),
    }
}

/// A read-only 2-D plane of pixel values.
///
/// Coordinates follow the `ndarray` convention: `dim()` is `(rows, cols)` and
/// `value(row, col)` must only be called with in-range indices.
pub trait PixelSource: Sync {
    /// Plane dimensions as (rows, cols)
    fn dim(&self) -> (usize, usize);

    /// Pixel value converted to `f64`
    fn value(&self, row: usize, col: usize) -> f64;
}

impl<S, T> PixelSource for ArrayBase<S, Ix2>
where
    S: Data<Elem = T> + Sync,
    T: AsPrimitive<f64> + Sync,
{
    fn dim(&self) -> (usize, usize) {
        ArrayBase::dim(self)
    }

    #[inline]
    fn value(&self, row: usize, col: usize) -> f64 {
        self[[row, col]].as_()
    }
}

/// Row-major pixel buffer with a runtime-selected element encoding.
///
/// # Examples
/// ```rust
/// use aperture::{PixelSource, RawImage};
///
/// let pixels: Vec<u8> = [1.5f32, 2.5, 3.5, 4.5]
///     .iter()
///     .flat_map(|v| v.to_ne_bytes())
///     .collect();
/// let image = RawImage::from_tag(&pixels, 2, 2, 42).unwrap();
/// assert_eq!(image.value(1, 0), 3.5);
/// ```
#[derive(Clone, Copy)]
pub struct RawImage<'a> {
    bytes: &'a [u8],
    width: usize,
    height: usize,
    convert: Converter,
    element_size: usize,
}

impl<'a> RawImage<'a> {
    /// Wrap a buffer of `width * height` elements of the given encoding.
    pub fn new(
        bytes: &'a [u8],
        width: usize,
        height: usize,
        dtype: DataType,
    ) -> Result<Self, ApertureError> {
        let (convert, element_size) = resolve_converter(dtype);
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(element_size))
            .ok_or(ApertureError::ImageTooLarge { width, height })?;
        if bytes.len() != expected {
            return Err(ApertureError::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            bytes,
            width,
            height,
            convert,
            element_size,
        })
    }

    /// Wrap a buffer whose encoding is given as a numeric type tag.
    pub fn from_tag(
        bytes: &'a [u8],
        width: usize,
        height: usize,
        tag: i32,
    ) -> Result<Self, ApertureError> {
        Self::new(bytes, width, height, DataType::from_tag(tag)?)
    }
}

impl PixelSource for RawImage<'_> {
    fn dim(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    #[inline]
    fn value(&self, row: usize, col: usize) -> f64 {
        let offset = (row * self.width + col) * self.element_size;
        (self.convert)(&self.bytes[offset..offset + self.element_size])
    }
}

impl std::fmt::Debug for RawImage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("element_size", &self.element_size)
            .finish()
    }
}

//! Aperture photometry on 2-D pixel grids
//!
//! Sums pixel values and propagated variance inside circular, elliptical and
//! annular apertures, weighting boundary pixels by their exact geometric
//! overlap with the aperture. Built on the same machinery are a binned radial
//! profile, flux-fraction radii, the Kron radius and an ellipse rasterizer for
//! segmentation masks.
//!
//! Images are read through [`PixelSource`], which covers `ndarray` arrays of any
//! primitive element type and raw byte buffers ([`RawImage`]). A [`Frame`]
//! bundles the data plane with optional error and mask planes; measurement
//! settings live in a serde-backed [`PhotometryConfig`].
//!
//! ```
//! use aperture::{sum_circle, Frame, PhotometryConfig};
//! use ndarray::Array2;
//!
//! let image = Array2::<f32>::from_elem((64, 64), 2.0);
//! let frame = Frame::new(&image);
//! let result = sum_circle(&frame, 32.0, 32.0, 5.0, &PhotometryConfig::default()).unwrap();
//! assert!((result.sum - 2.0 * std::f64::consts::PI * 25.0).abs() < 1e-6);
//! ```

mod config;
mod ellipse;
mod error;
mod extent;
mod flags;
mod flux_radius;
mod frame;
pub mod geometry;
mod kron;
mod margins;
pub mod overlap;
mod pixel;
mod profile;
mod rasterize;
mod sum;

pub use config::{PhotometryConfig, RowBoundary, Sampling};
pub use ellipse::{ellipse_axes, ellipse_coeffs, EllipseAxes, QuadraticForm};
pub use error::ApertureError;
pub use extent::{box_extent, box_extent_ellipse, PixelBox};
pub use flags::{ApertureFlags, InputOptions};
pub use flux_radius::{flux_radius, ppf, ppf_with_total, FluxRadius, FLUX_RADIUS_BINS};
pub use frame::{wrap_row, ErrorInput, Frame};
pub use geometry::{ApertureShape, Circle, CircularAnnulus, Ellipse, EllipticalAnnulus, Zone};
pub use kron::{kron_radius, KronRadius, INVALID_PIXEL_SENTINEL};
pub use margins::{OversampledAnnulus, PIXEL_HALF_DIAGONAL};
pub use overlap::{circle_overlap, ellipse_overlap};
pub use pixel::{resolve_converter, Converter, DataType, PixelSource, RawImage};
pub use profile::{sum_circann_multi, RadialProfile};
pub use rasterize::set_ellipse;
pub use sum::{
    subtract_background, sum_aperture, sum_apertures_par, sum_circann, sum_circle, sum_ellipann,
    sum_ellipse, ApertureSum,
};

//! Image decoding pipeline.
//!
//! This module provides functionality for:
//! - Probing the pixel dimensions of an upload from its header
//! - Decoding JPEG, PNG and WebP containers into RGB rasters
//! - Exact-size resampling for print output
//!
//! All operations are synchronous and pure: bytes in, fresh buffers out.
//!
//! # Examples
//!
//! ```ignore
//! use stencil_core::decode::{decode_image, probe_dimensions};
//!
//! let bytes = std::fs::read("design.png").unwrap();
//! let dims = probe_dimensions(&bytes).unwrap();
//! let image = decode_image(&bytes).unwrap();
//! assert_eq!((dims.width, dims.height), (image.width, image.height));
//! ```

mod resize;
mod source;
mod types;

pub use resize::resize;
pub use source::{decode_image, probe_dimensions};
pub use types::{
    DecodeError, DecodedImage, FilterType, ImageDimensions, Orientation, SourceFormat, WHITE,
};

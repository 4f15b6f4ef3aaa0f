//! Image encoding for sheet delivery.
//!
//! Every sheet leaves the core as PNG bytes; storage and document assembly
//! treat them as opaque blobs.
//!
//! # Examples
//!
//! ```ignore
//! use stencil_core::encode::encode_png;
//!
//! let pixels = vec![255u8; 100 * 100 * 3]; // White sheet
//! let png_bytes = encode_png(&pixels, 100, 100).unwrap();
//! ```

mod png;

pub use png::{encode_png, EncodeError};

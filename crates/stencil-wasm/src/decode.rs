//! Decoding and probing bindings.
//!
//! # Functions
//!
//! - [`probe_dimensions`] - Read width/height from the container header
//! - [`decode_image`] - Decode a JPEG, PNG or WebP upload to RGB
//! - [`resize`] - Resample an image to exact dimensions
//!
//! # Example
//!
//! ```typescript
//! import { probe_dimensions, informational_dpi } from '@stencil/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const dims = probe_dimensions(bytes);
//! const dpi = informational_dpi(dims.width, settings.targetWidthInches);
//! ```

use crate::types::{filter_from_u8, JsDecodedImage, JsImageDimensions};
use stencil_core::decode;
use wasm_bindgen::prelude::*;

/// Read the pixel dimensions of an upload without decoding it.
///
/// EXIF orientation is taken into account, so a portrait phone photo stored
/// sideways reports its upright size.
///
/// # Errors
///
/// Returns an error if the bytes are not JPEG, PNG or WebP, or the header is
/// unreadable.
#[wasm_bindgen]
pub fn probe_dimensions(bytes: &[u8]) -> Result<JsImageDimensions, JsValue> {
    decode::probe_dimensions(bytes)
        .map(JsImageDimensions::from)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decode an upload into RGB pixels, with orientation applied and alpha
/// flattened onto white.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported or intact image.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Resize an image to exact dimensions.
///
/// # Arguments
///
/// * `image` - Source image
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
/// * `filter` - 0 = Nearest, 1 = Bilinear, 2 = Lanczos3
///
/// # Errors
///
/// Returns an error for a zero target size.
#[wasm_bindgen]
pub fn resize(
    image: &JsDecodedImage,
    width: u32,
    height: u32,
    filter: u8,
) -> Result<JsDecodedImage, JsValue> {
    decode::resize(&image.to_decoded(), width, height, filter_from_u8(filter))
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

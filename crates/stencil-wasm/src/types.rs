//! WASM-compatible wrapper types.
//!
//! These types wrap the core stencil types and handle the conversion between
//! Rust and JavaScript data representations.

use stencil_core::decode::{DecodedImage, FilterType, ImageDimensions};
use stencil_core::{EncodedSheet, SheetPlan};
use wasm_bindgen::prelude::*;

/// A decoded RGB image for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create a new JsDecodedImage from dimensions and pixel data.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 3).
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGB pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Clones the pixel data.
    pub(crate) fn to_decoded(&self) -> DecodedImage {
        DecodedImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}

/// Header dimensions of an upload, after EXIF orientation.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsImageDimensions {
    width: u32,
    height: u32,
    media_type: &'static str,
}

#[wasm_bindgen]
impl JsImageDimensions {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Media type sniffed from the bytes, e.g. `image/png`.
    #[wasm_bindgen(getter)]
    pub fn media_type(&self) -> String {
        self.media_type.to_string()
    }
}

impl From<ImageDimensions> for JsImageDimensions {
    fn from(dims: ImageDimensions) -> Self {
        Self {
            width: dims.width,
            height: dims.height,
            media_type: dims.format.media_type(),
        }
    }
}

/// Planned print geometry.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsSheetPlan {
    inner: SheetPlan,
}

#[wasm_bindgen]
impl JsSheetPlan {
    #[wasm_bindgen(getter)]
    pub fn final_width(&self) -> u32 {
        self.inner.final_width
    }

    #[wasm_bindgen(getter)]
    pub fn final_height(&self) -> u32 {
        self.inner.final_height
    }

    #[wasm_bindgen(getter)]
    pub fn quadrant_width(&self) -> u32 {
        self.inner.quadrant_width
    }

    #[wasm_bindgen(getter)]
    pub fn quadrant_height(&self) -> u32 {
        self.inner.quadrant_height
    }

    /// Width of one sheet's image area in inches.
    #[wasm_bindgen(getter)]
    pub fn sheet_width_inches(&self) -> f64 {
        self.inner.sheet_size_inches().0
    }

    /// Height of one sheet's image area in inches.
    #[wasm_bindgen(getter)]
    pub fn sheet_height_inches(&self) -> f64 {
        self.inner.sheet_size_inches().1
    }

    /// Whether a sheet prints on A4 at 100% scale.
    pub fn fits_a4(&self) -> bool {
        self.inner.fits_paper(&stencil_core::PaperSize::A4)
    }
}

impl From<SheetPlan> for JsSheetPlan {
    fn from(inner: SheetPlan) -> Self {
        Self { inner }
    }
}

/// One encoded sheet, ready to upload or place on a page.
#[wasm_bindgen]
pub struct JsSheet {
    inner: EncodedSheet,
}

#[wasm_bindgen]
impl JsSheet {
    /// 1-based page number, `row * 2 + col + 1`.
    #[wasm_bindgen(getter)]
    pub fn page_number(&self) -> u8 {
        self.inner.page_number
    }

    #[wasm_bindgen(getter)]
    pub fn row(&self) -> u8 {
        self.inner.position.row
    }

    #[wasm_bindgen(getter)]
    pub fn col(&self) -> u8 {
        self.inner.position.col
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// PNG bytes as Uint8Array (a copy).
    pub fn png(&self) -> Vec<u8> {
        self.inner.png.clone()
    }
}

impl From<EncodedSheet> for JsSheet {
    fn from(inner: EncodedSheet) -> Self {
        Self { inner }
    }
}

/// Convert a u8 filter type value to the core FilterType enum.
///
/// Values:
/// - 0 = Nearest
/// - 1 = Bilinear
/// - 2 = Lanczos3
///
/// Any other value falls back to Lanczos3, the print default.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        1 => FilterType::Bilinear,
        _ => FilterType::Lanczos3,
    }
}

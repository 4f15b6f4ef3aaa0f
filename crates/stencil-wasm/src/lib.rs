//! Stencil WASM - WebAssembly bindings for the print partition core
//!
//! This crate exposes stencil-core to the browser editor so uploads can be
//! checked, measured and split without a server round trip.
//!
//! # Module Structure
//!
//! - `validate` - Upload type and size checks
//! - `decode` - Dimension probing, decoding and resizing
//! - `settings` - Split settings and the informational DPI
//! - `plan` - Print geometry preview
//! - `transform` - Rotation preview
//! - `split` - The full 2x2 split with PNG output
//! - `encode` - PNG encoding
//! - `types` - WASM-compatible wrapper types
//!
//! # Usage
//!
//! ```typescript
//! import init, { validate_upload, probe_dimensions, ImageSettings, split_image } from '@stencil/wasm';
//!
//! await init();
//!
//! const check = validate_upload(file.type, file.size);
//! if (!check.valid) throw new Error(check.error);
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const dims = probe_dimensions(bytes);
//! const settings = new ImageSettings();
//! settings.update_dpi(dims.width);
//! const sheets = split_image(bytes, settings, false);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod plan;
mod settings;
mod split;
mod transform;
mod types;
mod validate;

// Re-export public types
pub use decode::{decode_image, probe_dimensions, resize};
pub use encode::encode_png;
pub use plan::plan_sheets;
pub use settings::{dpi_message, informational_dpi, ImageSettings};
pub use split::split_image;
pub use transform::{apply_rotation, compute_rotated_bounds};
pub use types::{JsDecodedImage, JsImageDimensions, JsSheet, JsSheetPlan};
pub use validate::{max_upload_bytes, validate_upload};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Output resolution of every sheet, in pixels per inch
#[wasm_bindgen]
pub fn print_dpi() -> u32 {
    stencil_core::PRINT_DPI
}

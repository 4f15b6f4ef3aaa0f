//! Sheet splitting bindings.
//!
//! Runs the whole pipeline in WASM: decode, rotate, resample, cut into four
//! sheets and encode each as PNG. The returned array is in page order.
//!
//! # Example
//!
//! ```typescript
//! import { ImageSettings, split_image } from '@stencil/wasm';
//!
//! const settings = ImageSettings.from_json(store.settings);
//! const sheets = split_image(bytes, settings, false);
//! for (const sheet of sheets) {
//!   const blob = new Blob([sheet.png()], { type: 'image/png' });
//!   upload(`page-${sheet.page_number}.png`, blob);
//! }
//! ```

use crate::settings::ImageSettings;
use crate::types::JsSheet;
use stencil_core::split::{self, SplitError, SplitOptions};
use stencil_core::OverlayOptions;
use tracing::debug;
use wasm_bindgen::prelude::*;

pub(crate) fn split_sheets(
    bytes: &[u8],
    settings: &stencil_core::ImageSettings,
    with_overlay: bool,
) -> Result<Vec<JsSheet>, SplitError> {
    let mut options = SplitOptions::default();
    if with_overlay {
        options = options.with_overlay(OverlayOptions::at_print_resolution());
    }

    let encoded = split::split_to_png(bytes, settings, &options)?;
    debug!(
        final_width = encoded.plan.final_width,
        final_height = encoded.plan.final_height,
        with_overlay,
        "Split upload in WASM"
    );

    Ok(encoded.sheets.into_iter().map(JsSheet::from).collect())
}

/// Split an upload into four PNG sheets.
///
/// # Arguments
///
/// * `bytes` - The uploaded file
/// * `settings` - Target width and rotation; overlap and DPI are ignored
/// * `with_overlay` - Draw the 1 cm grid and registration marks
///
/// # Errors
///
/// Returns an error if the bytes cannot be decoded, the geometry is
/// degenerate, or encoding fails. No sheets are returned on error.
#[wasm_bindgen]
pub fn split_image(
    bytes: &[u8],
    settings: &ImageSettings,
    with_overlay: bool,
) -> Result<Vec<JsSheet>, JsValue> {
    split_sheets(bytes, settings.inner(), with_overlay).map_err(|e| JsValue::from_str(&e.to_string()))
}

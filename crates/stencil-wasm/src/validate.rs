//! Upload validation bindings.
//!
//! The editor calls this before reading the file, so only the declared media
//! type and the byte size are checked.
//!
//! # Example
//!
//! ```typescript
//! import { validate_upload } from '@stencil/wasm';
//!
//! const check = validate_upload(file.type, file.size);
//! if (!check.valid) {
//!   showError(check.error);
//! }
//! ```

use serde::Serialize;
use stencil_core::validate::{self, UploadLimits};
use wasm_bindgen::prelude::*;

/// Result shape returned to JavaScript: `{ valid: true }` or
/// `{ valid: false, error: "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct UploadCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub(crate) fn check_upload(media_type: &str, size_bytes: f64) -> UploadCheck {
    // JS sizes arrive as doubles; anything negative or NaN counts as empty
    let size = if size_bytes.is_finite() && size_bytes > 0.0 {
        size_bytes as u64
    } else {
        0
    };

    match validate::validate_upload(media_type, size, &UploadLimits::default()) {
        Ok(_) => UploadCheck {
            valid: true,
            error: None,
        },
        Err(e) => UploadCheck {
            valid: false,
            error: Some(e.to_string()),
        },
    }
}

/// Validate an upload's declared media type and size.
///
/// # Arguments
///
/// * `media_type` - The browser-reported `File.type`
/// * `size_bytes` - The browser-reported `File.size`
///
/// # Returns
///
/// A plain object `{ valid, error? }`.
#[wasm_bindgen]
pub fn validate_upload(media_type: &str, size_bytes: f64) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&check_upload(media_type, size_bytes))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Largest accepted upload in bytes.
#[wasm_bindgen]
pub fn max_upload_bytes() -> f64 {
    validate::MAX_UPLOAD_BYTES as f64
}

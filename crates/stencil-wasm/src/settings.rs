//! Split settings bindings.
//!
//! Mirrors the editor's settings store: target width, rotation, overlap and
//! the informational DPI. Values can be set field by field or loaded from the
//! store's JSON shape.

use stencil_core::settings::{self, DpiRating};
use wasm_bindgen::prelude::*;

/// Split settings wrapper for JavaScript
#[wasm_bindgen]
pub struct ImageSettings {
    inner: stencil_core::ImageSettings,
}

#[wasm_bindgen]
impl ImageSettings {
    /// Create settings with the editor defaults (6.5 in, no rotation, no overlap)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: stencil_core::ImageSettings::default(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn target_width_inches(&self) -> f64 {
        self.inner.target_width_inches
    }

    #[wasm_bindgen(setter)]
    pub fn set_target_width_inches(&mut self, value: f64) {
        self.inner.target_width_inches = value;
    }

    /// Rotation in degrees, positive = clockwise
    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> f64 {
        self.inner.rotation_degrees
    }

    #[wasm_bindgen(setter)]
    pub fn set_rotation(&mut self, value: f64) {
        self.inner.rotation_degrees = value;
    }

    #[wasm_bindgen(getter)]
    pub fn overlap_mm(&self) -> u32 {
        self.inner.overlap_mm
    }

    #[wasm_bindgen(setter)]
    pub fn set_overlap_mm(&mut self, value: u32) {
        self.inner.overlap_mm = value;
    }

    #[wasm_bindgen(getter)]
    pub fn dpi(&self) -> u32 {
        self.inner.dpi
    }

    /// Recompute the informational DPI for a source of the given width
    pub fn update_dpi(&mut self, original_width_px: u32) {
        self.inner = self.inner.clone().with_source_width(original_width_px);
    }

    /// `excellent`, `good` or `warning`
    pub fn dpi_rating(&self) -> String {
        rating_name(DpiRating::from_dpi(self.inner.dpi)).to_string()
    }

    /// Policy error message, or `undefined` when the settings are acceptable
    pub fn policy_error(&self) -> Option<String> {
        self.inner.check_policy().err().map(|e| e.to_string())
    }

    /// Serialize to the settings store's JSON shape
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Deserialize from the settings store's JSON shape. Missing fields take
    /// their defaults.
    pub fn from_json(value: JsValue) -> Result<ImageSettings, JsValue> {
        let inner: stencil_core::ImageSettings =
            serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSettings {
    pub(crate) fn inner(&self) -> &stencil_core::ImageSettings {
        &self.inner
    }
}

fn rating_name(rating: DpiRating) -> &'static str {
    match rating {
        DpiRating::Excellent => "excellent",
        DpiRating::Good => "good",
        DpiRating::Warning => "warning",
    }
}

/// `round(original_width_px / target_width_inches)`, or 0 when undefined.
#[wasm_bindgen]
pub fn informational_dpi(original_width_px: u32, target_width_inches: f64) -> u32 {
    settings::informational_dpi(original_width_px, target_width_inches)
}

/// Human-readable quality label for an informational DPI.
#[wasm_bindgen]
pub fn dpi_message(dpi: u32) -> String {
    DpiRating::from_dpi(dpi).message().to_string()
}

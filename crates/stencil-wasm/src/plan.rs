//! Print geometry bindings, used by the editor to show sheet sizes before
//! the split runs.

use crate::types::JsSheetPlan;
use stencil_core::plan;
use wasm_bindgen::prelude::*;

/// Plan the sheet geometry for an image of the given (post-rotation) size.
///
/// # Errors
///
/// Returns an error for empty or single-pixel sources, a non-positive target
/// width, or a plan too small to split.
#[wasm_bindgen]
pub fn plan_sheets(
    width_px: u32,
    height_px: u32,
    target_width_inches: f64,
) -> Result<JsSheetPlan, JsValue> {
    plan::plan(width_px, height_px, target_width_inches)
        .map(JsSheetPlan::from)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_zero_width_rejected() {
        assert!(plan_sheets(0, 100, 6.5).is_err());
    }
}

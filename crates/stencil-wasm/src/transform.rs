//! Rotation preview bindings.
//!
//! The editor previews the rotation on a downscaled copy before the real
//! split runs, so it needs the same rotation and bounding-box math.

use crate::types::JsDecodedImage;
use stencil_core::transform::{
    apply_rotation as core_rotate, compute_rotated_bounds as core_bounds, InterpolationFilter,
};
use wasm_bindgen::prelude::*;

/// Rotate an image around its center onto an expanded white canvas.
///
/// # Arguments
///
/// * `image` - Source image to rotate
/// * `angle_degrees` - Rotation angle in degrees (positive = clockwise)
/// * `use_lanczos` - Use the Lanczos3 filter (slower), otherwise bilinear
///
/// # Example (TypeScript)
///
/// ```typescript
/// const preview = apply_rotation(thumbnail, settings.rotation, false);
/// ```
#[wasm_bindgen]
pub fn apply_rotation(
    image: &JsDecodedImage,
    angle_degrees: f64,
    use_lanczos: bool,
) -> JsDecodedImage {
    let src = image.to_decoded();
    let filter = if use_lanczos {
        InterpolationFilter::Lanczos3
    } else {
        InterpolationFilter::Bilinear
    };

    JsDecodedImage::from_decoded(core_rotate(&src, angle_degrees, filter))
}

/// Size of the canvas after rotation, as `[width, height]`.
#[wasm_bindgen]
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> Vec<u32> {
    let (w, h) = core_bounds(width, height, angle_degrees);
    vec![w, h]
}

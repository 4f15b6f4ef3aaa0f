//! PNG encoding bindings.

use crate::types::JsDecodedImage;
use stencil_core::encode;
use wasm_bindgen::prelude::*;

/// Encode a JsDecodedImage to PNG bytes.
///
/// # Errors
///
/// Returns an error for an empty image or if encoding fails.
#[wasm_bindgen]
pub fn encode_png(image: &JsDecodedImage) -> Result<Vec<u8>, JsValue> {
    let decoded = image.to_decoded();
    encode::encode_png(&decoded.pixels, decoded.width, decoded.height)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_signature() {
        let image = JsDecodedImage::new(4, 4, vec![200u8; 4 * 4 * 3]);
        let png = encode_png(&image).unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }
}

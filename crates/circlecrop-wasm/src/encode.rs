//! PNG encoding WASM bindings.
//!
//! - [`encode_png`] - Encode RGBA pixel data to PNG bytes
//! - [`encode_png_from_image`] - Encode a `JsDecodedImage` to PNG bytes

use crate::types::JsDecodedImage;
use circlecrop_core::encode;
use wasm_bindgen::prelude::*;

/// Encode RGBA pixel data (4 bytes per pixel, row-major) to PNG.
///
/// Always lossless, with the alpha channel preserved.
///
/// # Errors
///
/// Returns an error if:
/// - The pixel data length doesn't match width * height * 4
/// - Width or height is zero
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(pixels, width, height).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode a `JsDecodedImage` to PNG.
#[wasm_bindgen]
pub fn encode_png_from_image(image: &JsDecodedImage) -> Result<Vec<u8>, JsValue> {
    let decoded = image.to_decoded();
    encode::encode_png(&decoded.pixels, decoded.width, decoded.height)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

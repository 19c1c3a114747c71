//! Image decoding WASM bindings.
//!
//! - [`decode_image`] - Decode JPEG, PNG, GIF, WebP or BMP bytes to RGBA
//! - [`is_image_media_type`] - The media type guard applied to picked files
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, is_image_media_type } from '@circlecrop/wasm';
//!
//! if (is_image_media_type(file.type)) {
//!   const bytes = new Uint8Array(await file.arrayBuffer());
//!   const image = decode_image(bytes);
//!   console.log(`Decoded ${image.width}x${image.height}`);
//! }
//! ```

use crate::types::JsDecodedImage;
use circlecrop_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an image from bytes, applying EXIF orientation.
///
/// # Errors
///
/// Returns an error if the format is not recognized or the data is
/// corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Whether a declared media type (e.g. `File.type`) is accepted.
#[wasm_bindgen]
pub fn is_image_media_type(media_type: &str) -> bool {
    decode::is_image_media_type(media_type)
}

//! WASM-compatible wrapper types for image data.

use circlecrop_core::DecodedImage;
use wasm_bindgen::prelude::*;

/// A decoded RGBA image for JavaScript.
///
/// The pixel data lives in WASM memory. `pixels()` copies it out as a
/// `Uint8Array`, which can be wrapped in an `ImageData` for display.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create an image from dimensions and RGBA pixel data (4 bytes per
    /// pixel, row-major order).
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

    /// Number of bytes in the pixel buffer (width * height * 4).
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// RGBA pixel data as a `Uint8Array` (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Release WASM memory now instead of waiting for the finalizer.
    pub fn free(self) {}
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Copy back into a core image.
    pub(crate) fn to_decoded(&self) -> DecodedImage {
        DecodedImage::new(self.width, self.height, self.pixels.clone())
    }
}

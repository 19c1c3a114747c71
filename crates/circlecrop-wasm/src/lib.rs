//! Circle Crop WASM - WebAssembly bindings for the circle crop tool
//!
//! # Module Structure
//!
//! - `tool` - The interactive `CircleCropTool` bound to a canvas element
//! - `canvas` - `DrawingSurface` over `CanvasRenderingContext2d`
//! - `resource` - Blob URLs for picked files
//! - `decode` / `encode` - Headless image decoding and PNG encoding
//! - `export` - Headless crop of raw file bytes
//! - `config` - Configuration from JS objects
//! - `logger` - `log` output to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { CircleCropTool } from '@circlecrop/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const tool = new CircleCropTool(document.querySelector('canvas'));
//! tool.bind_file_input(document.querySelector('input[type=file]'));
//! ```

use wasm_bindgen::prelude::*;

mod canvas;
mod config;
mod decode;
mod encode;
mod export;
mod logger;
mod resource;
mod tool;
mod types;

// Re-export public types
pub use canvas::{CanvasSurface, HtmlBitmap};
pub use config::default_config;
pub use decode::{decode_image, is_image_media_type};
pub use encode::{encode_png, encode_png_from_image};
pub use export::{crop_image_bytes, export_file_name};
pub use logger::set_log_level;
pub use resource::{BlobUrl, BlobUrlHost};
pub use tool::CircleCropTool;
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::init_logging(logger::default_level());
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }
}

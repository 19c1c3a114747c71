//! Headless crop export.
//!
//! Runs the whole crop in Rust on raw file bytes, without a canvas: decode,
//! render the circular crop on a software surface, encode as PNG. Useful in
//! workers and for hosts that track the view themselves.
//!
//! ```typescript
//! import { crop_image_bytes, export_file_name } from '@circlecrop/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const png = crop_image_bytes(bytes, 1.2, -15, 30);
//! const name = export_file_name(new Date().toISOString());
//! ```

use circlecrop_core::{decode, export_crop, CropConfig, PixelSurface, Point, ViewState};
use wasm_bindgen::prelude::*;

use crate::config::parse_config;

/// Crop an encoded image to a transparent circular PNG.
///
/// `scale`, `offset_x` and `offset_y` describe the view in preview pixels,
/// exactly as the interactive tool reports them. `config` is optional.
///
/// # Errors
///
/// Returns an error if the bytes cannot be decoded, the config is invalid,
/// or the export surface cannot be allocated.
#[wasm_bindgen]
pub fn crop_image_bytes(
    bytes: &[u8],
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    config: JsValue,
) -> Result<Vec<u8>, JsValue> {
    let config = parse_config(config)?;
    crop_bytes(bytes, scale, Point::new(offset_x, offset_y), &config, &current_timestamp())
        .map_err(|e| JsValue::from_str(&e))
}

/// Download name for an export made at `iso_timestamp` (as produced by
/// `Date.prototype.toISOString`).
#[wasm_bindgen]
pub fn export_file_name(iso_timestamp: &str) -> String {
    circlecrop_core::export_file_name(iso_timestamp)
}

fn crop_bytes(
    bytes: &[u8],
    scale: f64,
    offset: Point,
    config: &CropConfig,
    timestamp: &str,
) -> Result<Vec<u8>, String> {
    let image = decode::decode_image(bytes).map_err(|e| e.to_string())?;

    let mut view = ViewState::new();
    view.set_scale(scale, &config.zoom);
    view.set_offset(offset);

    let artifact = export_crop(
        Some(&image),
        &view,
        config.preview_size,
        config.export,
        PixelSurface::for_export,
        timestamp,
    )
    .map_err(|e| e.to_string())?;
    Ok(artifact.bytes)
}

/// Current time as an ISO 8601 string.
pub(crate) fn current_timestamp() -> String {
    js_sys::Date::new_0().to_iso_string().into()
}

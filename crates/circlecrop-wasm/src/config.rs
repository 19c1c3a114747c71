//! Configuration passed from JavaScript.
//!
//! Hosts pass a plain object with any subset of the `CropConfig` fields:
//!
//! ```typescript
//! new CircleCropTool(canvas, { preview_size: 256, export: { max_size: 2048 } });
//! ```

use circlecrop_core::CropConfig;
use wasm_bindgen::prelude::*;

/// Parse and validate a JS config object. `undefined` and `null` give the
/// defaults.
pub(crate) fn parse_config(value: JsValue) -> Result<CropConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(CropConfig::default());
    }

    let config: CropConfig = serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid crop config: {e}")))?;
    config
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(config)
}

/// The default configuration as a plain JS object.
#[wasm_bindgen]
pub fn default_config() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&CropConfig::default())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_missing_config_uses_defaults() {
        assert_eq!(parse_config(JsValue::UNDEFINED).unwrap(), CropConfig::default());
        assert_eq!(parse_config(JsValue::NULL).unwrap(), CropConfig::default());
    }

    #[wasm_bindgen_test]
    fn test_default_config_round_trips() {
        let value = default_config().unwrap();
        assert_eq!(parse_config(value).unwrap(), CropConfig::default());
    }

    #[wasm_bindgen_test]
    fn test_partial_config() {
        let value =
            js_sys::JSON::parse(r#"{"preview_size": 256, "export": {"max_size": 2048}}"#).unwrap();
        let config = parse_config(value).unwrap();
        assert_eq!(config.preview_size, 256);
        assert_eq!(config.export.max_size, 2048);
        assert_eq!(config.export.min_size, 512);
        assert_eq!(config.zoom.max, 2.0);
    }

    #[wasm_bindgen_test]
    fn test_invalid_config_rejected() {
        let value = js_sys::JSON::parse(r#"{"zoom": {"min": 3.0, "max": 1.0}}"#).unwrap();
        assert!(parse_config(value).is_err());
    }
}

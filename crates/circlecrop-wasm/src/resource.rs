//! Blob URLs for picked files.

use circlecrop_core::{LoadError, ResourceHost, SourceFile};
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{File, Url};

/// An object URL created with `URL.createObjectURL`.
///
/// Not `Clone`: the loader moves it back to [`BlobUrlHost`] exactly once to
/// be revoked.
#[derive(Debug, PartialEq, Eq)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Resource host backed by the browser's object URL registry.
#[derive(Debug, Default)]
pub struct BlobUrlHost;

impl ResourceHost for BlobUrlHost {
    type File = File;
    type Url = BlobUrl;

    fn describe(&self, file: &File) -> SourceFile {
        SourceFile::new(file.name(), file.type_())
    }

    fn create_url(&mut self, file: &File) -> Result<BlobUrl, LoadError> {
        Url::create_object_url_with_blob(file)
            .map(BlobUrl)
            .map_err(|e| LoadError::ResourceUnavailable(js_error_message(&e)))
    }

    fn revoke_url(&mut self, url: BlobUrl) {
        if let Err(e) = Url::revoke_object_url(&url.0) {
            warn!("Failed to revoke {}: {}", url.0, js_error_message(&e));
        }
    }
}

/// Best-effort text for a thrown JS value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(error) => error.message().into(),
        None => format!("{value:?}"),
    }
}

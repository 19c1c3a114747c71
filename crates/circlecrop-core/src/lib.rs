//! Circle Crop Core - circular image cropping
//!
//! This crate holds everything about the crop tool that does not need a
//! browser: image decoding, the pan/zoom view, pointer input, the load
//! lifecycle, crop geometry, rendering through a [`DrawingSurface`] and PNG
//! export. The `circlecrop-wasm` crate binds it to an HTML canvas.
//!
//! # Example
//!
//! ```ignore
//! use circlecrop_core::{decode_image, export_crop, CropConfig, PixelSurface, ViewState};
//!
//! let image = decode_image(&bytes)?;
//! let config = CropConfig::default();
//! let artifact = export_crop(
//!     Some(&image),
//!     &ViewState::default(),
//!     config.preview_size,
//!     config.export,
//!     PixelSurface::for_export,
//!     "2024-03-05T14:07:09.123Z",
//! )?;
//! ```

pub mod config;
pub mod decode;
pub mod encode;
pub mod geometry;
pub mod input;
pub mod loader;
pub mod render;
pub mod session;
pub mod surface;
pub mod view;

pub use config::{ConfigError, CropConfig, ExportLimits, PreviewStyle};
pub use decode::{
    decode_image, is_image_media_type, DecodeError, DecodedImage, ACCEPTED_MEDIA_TYPES,
};
pub use encode::{encode_png, EncodeError, PNG_EXTENSION, PNG_MEDIA_TYPE};
pub use geometry::{export_size, CanvasGeometry, Circle, Point, Rect};
pub use input::{DragState, InputEvent, InputResponse, PointerTracker};
pub use loader::{
    ImageLoader, LoadError, LoadOutcome, LoadTicket, LoadedImage, ResourceHost, SourceFile,
};
pub use render::{export_crop, export_file_name, render_preview, CropError, ExportArtifact};
pub use session::CropSession;
pub use surface::{
    BitmapSource, Color, DrawingSurface, InterpolationFilter, PixelSurface, StrokeStyle,
    SurfaceError,
};
pub use view::{ViewState, ZoomLimits};

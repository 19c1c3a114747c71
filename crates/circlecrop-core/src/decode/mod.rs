//! Image decoding for the circle crop tool.
//!
//! This module provides functionality for:
//! - Validating the declared media type of a user-selected file
//! - Decoding JPEG, PNG, GIF, WebP and BMP bytes into RGBA bitmaps
//! - Applying EXIF orientation so bitmaps are upright
//!
//! # Architecture
//!
//! In the browser the platform decodes images asynchronously from a blob URL;
//! this module is the pure-Rust equivalent used by the headless export path
//! and by tests. All operations are synchronous.
//!
//! # Examples
//!
//! ```ignore
//! use circlecrop_core::decode::decode_image;
//!
//! let bytes = std::fs::read("portrait.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod media;
mod reader;
mod types;

pub use media::{is_image_media_type, ACCEPTED_MEDIA_TYPES};
pub use reader::decode_image;
pub use types::{DecodeError, DecodedImage, Orientation};

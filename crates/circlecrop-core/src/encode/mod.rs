//! Image encoding for export.
//!
//! This module provides functionality for:
//! - Encoding RGBA pixel data to PNG with the best compression setting
//!
//! # Examples
//!
//! ```ignore
//! use circlecrop_core::encode::encode_png;
//!
//! let pixels = vec![0u8; 512 * 512 * 4];
//! let png_bytes = encode_png(&pixels, 512, 512).unwrap();
//! println!("Encoded {} bytes", png_bytes.len());
//! ```

mod png;

pub use png::{encode_png, EncodeError, PNG_EXTENSION, PNG_MEDIA_TYPE};

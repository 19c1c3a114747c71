//! PNG encoding for export.
//!
//! Every export is written as an RGBA PNG regardless of the input format, so
//! the transparent corners outside the circle survive. PNG is lossless; the
//! only tunable is compression effort, which is fixed at the best setting.

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use std::io::Cursor;
use thiserror::Error;

/// Media type of every exported file.
pub const PNG_MEDIA_TYPE: &str = "image/png";

/// File extension of every exported file.
pub const PNG_EXTENSION: &str = "png";

/// Errors that can occur during PNG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode straight-alpha RGBA pixel data to PNG bytes.
///
/// # Arguments
///
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Example
///
/// ```ignore
/// use circlecrop_core::encode::encode_png;
///
/// let pixels = vec![0u8; 64 * 64 * 4]; // Fully transparent
/// let png = encode_png(&pixels, 64, 64).unwrap();
/// assert_eq!(&png[1..4], b"PNG");
/// ```
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 4;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    let encoder =
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive);

    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}


// ============================================================================
// Property-Based Tests
// ============================================================================

//! Image decoding from raw file bytes with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageReader};

use super::{DecodeError, DecodedImage, Orientation};

/// Decode any supported image (JPEG, PNG, GIF, WebP, BMP) from bytes.
///
/// The format is sniffed from the content, not taken from a file name or
/// media type. EXIF orientation is applied so the result is upright, and
/// the pixels are converted to straight-alpha RGBA.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the bytes are not a recognized format.
/// Returns `DecodeError::CorruptedFile` if the data is truncated or malformed.
/// Returns `DecodeError::EmptyImage` if the image has a zero dimension.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    let rgba = apply_orientation(img, orientation).into_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }

    Ok(DecodedImage::from_rgba_image(rgba))
}

/// EXIF orientation of the image, or `Orientation::Normal` if absent.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

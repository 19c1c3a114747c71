//! Media type guard for user-selected files.
//!
//! Only the declared media type is checked. Size limits and content sniffing
//! are not part of the guard; malformed data is caught later by the decoder.

/// Value for the file picker's `accept` attribute.
pub const ACCEPTED_MEDIA_TYPES: &str = "image/*";

/// Check whether a declared media type is an image type.
#[inline]
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

//! Circle crop rendering.
//!
//! Two paths share [`CanvasGeometry`]:
//!
//! - **Preview**: the full square bitmap is drawn on the fixed-size preview
//!   surface with a decorative circle outline on top. Nothing is clipped so
//!   the user sees what will be cut away.
//! - **Export**: a fresh transparent surface sized from the source
//!   resolution is clipped to the inscribed circle, the same framing is
//!   redrawn at that resolution and the result is serialized to PNG.

use log::debug;
use thiserror::Error;

use crate::config::{ExportLimits, PreviewStyle};
use crate::encode::{PNG_EXTENSION, PNG_MEDIA_TYPE};
use crate::geometry::{export_size, CanvasGeometry, Circle};
use crate::surface::{BitmapSource, DrawingSurface, SurfaceError};
use crate::view::ViewState;

/// Prefix of exported file names.
pub const EXPORT_FILE_PREFIX: &str = "circle-crop-";

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum CropError {
    /// Export was requested before any image was loaded.
    #[error("Please upload an image first")]
    NoImageLoaded,

    /// The export surface could not be created.
    #[error("Export surface unavailable: {0}")]
    SurfaceUnavailable(SurfaceError),

    /// The export surface could not be serialized.
    #[error("Failed to encode the cropped image: {0}")]
    Encode(SurfaceError),
}

/// A finished export, ready to be offered as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub media_type: &'static str,
    /// Side length of the square PNG.
    pub size: u32,
    pub bytes: Vec<u8>,
}

/// Redraw the preview from scratch.
///
/// Always clears first, so repeated calls with the same inputs produce the
/// same frame.
pub fn render_preview<S: DrawingSurface>(
    surface: &mut S,
    image: Option<&S::Bitmap>,
    view: &ViewState,
    style: &PreviewStyle,
) {
    let square_size = surface.size() as f64;
    let circle = Circle::inscribed(square_size);
    surface.clear();

    let Some(image) = image else {
        surface.fill_circle(circle, style.placeholder_fill);
        surface.stroke_circle(circle, style.placeholder_outline);
        return;
    };

    let geo = CanvasGeometry::preview(image.dimensions(), square_size, view);
    surface.draw_image_region(image, geo.source_rect(), geo.dest_rect());
    surface.stroke_circle(geo.circle(), style.outline);
}

/// Render the circular crop at export resolution and serialize it.
///
/// `allocate` creates a transparent surface of the requested side length.
/// `iso_timestamp` is the current time in ISO 8601 form, used for the file
/// name.
///
/// # Errors
///
/// - `CropError::NoImageLoaded` when `image` is `None`; nothing is allocated
/// - `CropError::SurfaceUnavailable` when `allocate` fails
/// - `CropError::Encode` when PNG serialization fails
pub fn export_crop<S, F>(
    image: Option<&S::Bitmap>,
    view: &ViewState,
    preview_size: u32,
    limits: ExportLimits,
    allocate: F,
    iso_timestamp: &str,
) -> Result<ExportArtifact, CropError>
where
    S: DrawingSurface,
    F: FnOnce(u32) -> Result<S, SurfaceError>,
{
    let image = image.ok_or(CropError::NoImageLoaded)?;

    let dimensions = image.dimensions();
    let size = export_size(dimensions, limits.min_size, limits.max_size);
    let scale_factor = size as f64 / preview_size as f64;
    debug!(
        "Exporting {}x{} source at {}px (x{:.3})",
        dimensions.0, dimensions.1, size, scale_factor
    );

    let mut surface = allocate(size).map_err(CropError::SurfaceUnavailable)?;
    surface.clear();

    let geo = CanvasGeometry::scaled(dimensions, size as f64, view, scale_factor);
    surface.with_circle_clip(geo.circle(), |s| {
        s.draw_image_region(image, geo.source_rect(), geo.dest_rect());
    });

    let bytes = surface.serialize_png().map_err(CropError::Encode)?;

    Ok(ExportArtifact {
        file_name: export_file_name(iso_timestamp),
        media_type: PNG_MEDIA_TYPE,
        size,
        bytes,
    })
}

/// Filesystem-safe export name for an ISO 8601 timestamp.
///
/// `2024-03-05T14:07:09.123Z` becomes `circle-crop-2024-03-05T14-07-09.png`:
/// `:` and `.` are replaced by `-` and the milliseconds and zone suffix
/// (the last five characters) are dropped.
pub fn export_file_name(iso_timestamp: &str) -> String {
    let safe: String = iso_timestamp
        .chars()
        .map(|c| if c == ':' || c == '.' { '-' } else { c })
        .collect();
    let keep = safe.chars().count().saturating_sub(5);
    let stamp: String = safe.chars().take(keep).collect();
    format!("{EXPORT_FILE_PREFIX}{stamp}.{PNG_EXTENSION}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode_image, DecodedImage};
    use crate::geometry::Point;
    use crate::surface::PixelSurface;

    const TIMESTAMP: &str = "2024-03-05T14:07:09.123Z";

    fn alloc(size: u32) -> Result<PixelSurface, SurfaceError> {
        PixelSurface::for_export(size)
    }

    /// Image whose four quadrants are red, green, blue and white.
    fn quadrants(size: u32) -> DecodedImage {
        let half = size / 2;
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let rgba = match (x < half, y < half) {
                    (true, true) => [255, 0, 0, 255],
                    (false, true) => [0, 255, 0, 255],
                    (true, false) => [0, 0, 255, 255],
                    (false, false) => [255, 255, 255, 255],
                };
                pixels.extend_from_slice(&rgba);
            }
        }
        DecodedImage::new(size, size, pixels)
    }

    #[test]
    fn test_placeholder_without_image() {
        let style = PreviewStyle::default();
        let mut surface = PixelSurface::new(64).unwrap();
        render_preview(&mut surface, None, &ViewState::default(), &style);

        // Faint fill at the center, nothing in the corners
        let center = surface.pixel(32, 32);
        assert_eq!(&center[..3], &[128, 128, 128]);
        assert!(center[3] > 0 && center[3] < 64);
        assert_eq!(surface.pixel(0, 0)[3], 0);
        // Outline sits on the circle edge and is more opaque than the fill
        assert!(surface.pixel(32, 0)[3] > center[3]);
    }

    #[test]
    fn test_preview_is_not_clipped() {
        let img = DecodedImage::filled(100, 100, [10, 20, 30, 255]);
        let mut surface = PixelSurface::new(100).unwrap();
        render_preview(&mut surface, Some(&img), &ViewState::default(), &PreviewStyle::default());

        assert_eq!(surface.pixel(0, 0), [10, 20, 30, 255]);
        assert_eq!(surface.pixel(50, 50), [10, 20, 30, 255]);
        assert_eq!(surface.clip_depth(), 0);
    }

    #[test]
    fn test_preview_draws_outline_over_image() {
        let img = DecodedImage::filled(100, 100, [0, 0, 0, 255]);
        let mut surface = PixelSurface::new(100).unwrap();
        render_preview(&mut surface, Some(&img), &ViewState::default(), &PreviewStyle::default());

        let edge = surface.pixel(50, 0);
        assert!(edge[0] > 200, "outline should lighten the edge, got {edge:?}");
    }

    #[test]
    fn test_preview_redraw_is_idempotent() {
        let img = quadrants(64);
        let mut view = ViewState::default();
        view.set_offset(Point::new(7.0, -3.0));
        let style = PreviewStyle::default();

        let mut surface = PixelSurface::new(48).unwrap();
        render_preview(&mut surface, Some(&img), &view, &style);
        let first = surface.pixels().to_vec();
        render_preview(&mut surface, Some(&img), &view, &style);
        assert_eq!(surface.pixels(), &first[..]);
    }

    #[test]
    fn test_preview_clears_previous_frame() {
        let img = DecodedImage::filled(10, 10, [255, 0, 0, 255]);
        let mut surface = PixelSurface::new(40).unwrap();
        render_preview(&mut surface, Some(&img), &ViewState::default(), &PreviewStyle::default());
        render_preview(&mut surface, None, &ViewState::default(), &PreviewStyle::default());

        assert_eq!(&surface.pixel(20, 20)[..3], &[128, 128, 128]);
    }

    #[test]
    fn test_export_without_image_fails() {
        let mut allocated = false;
        let result = export_crop::<PixelSurface, _>(
            None,
            &ViewState::default(),
            320,
            ExportLimits::default(),
            |size| {
                allocated = true;
                alloc(size)
            },
            TIMESTAMP,
        );
        assert!(matches!(result, Err(CropError::NoImageLoaded)));
        assert!(!allocated);
    }

    #[test]
    fn test_export_allocation_failure() {
        let img = DecodedImage::filled(600, 600, [1, 2, 3, 255]);
        let result = export_crop::<PixelSurface, _>(
            Some(&img),
            &ViewState::default(),
            320,
            ExportLimits::default(),
            |size| {
                Err(SurfaceError::Allocation {
                    size,
                    reason: "out of memory".into(),
                })
            },
            TIMESTAMP,
        );
        assert!(matches!(result, Err(CropError::SurfaceUnavailable(_))));
    }

    #[test]
    fn test_export_small_image_upscaled_to_floor() {
        let img = DecodedImage::filled(200, 100, [50, 60, 70, 255]);
        let artifact = export_crop(
            Some(&img),
            &ViewState::default(),
            320,
            ExportLimits::default(),
            alloc,
            TIMESTAMP,
        )
        .unwrap();

        assert_eq!(artifact.size, 512);
        assert_eq!(artifact.media_type, "image/png");
        assert_eq!(artifact.file_name, "circle-crop-2024-03-05T14-07-09.png");

        let decoded = decode_image(&artifact.bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (512, 512));
    }

    #[test]
    fn test_export_corners_are_transparent() {
        let img = DecodedImage::filled(520, 520, [200, 100, 50, 255]);
        let artifact = export_crop(
            Some(&img),
            &ViewState::default(),
            320,
            ExportLimits::default(),
            alloc,
            TIMESTAMP,
        )
        .unwrap();
        let out = decode_image(&artifact.bytes).unwrap();

        assert_eq!(out.width, 520);
        assert_eq!(out.pixel(0, 0)[3], 0);
        assert_eq!(out.pixel(519, 519)[3], 0);
        assert_eq!(out.pixel(0, 519)[3], 0);
        assert_eq!(out.pixel(260, 260), [200, 100, 50, 255]);
    }

    #[test]
    fn test_export_matches_preview_framing() {
        // At scale 1 a 640px source spans twice the 320px preview, so with
        // a half-size preview only the center of the image is visible.
        // Panning right by 80 preview pixels (160 export pixels) moves the
        // quadrant boundary off center in both renderings.
        let img = quadrants(640);
        let mut view = ViewState::default();
        view.set_offset(Point::new(80.0, 0.0));

        let mut preview = PixelSurface::new(320).unwrap();
        render_preview(&mut preview, Some(&img), &view, &PreviewStyle::default());
        let artifact =
            export_crop(Some(&img), &view, 320, ExportLimits::default(), alloc, TIMESTAMP).unwrap();
        let out = decode_image(&artifact.bytes).unwrap();
        assert_eq!(out.width, 640);

        // Boundary between left and right halves: preview x = 240, export x = 480
        assert_eq!(preview.pixel(230, 100), [255, 0, 0, 255]);
        assert_eq!(preview.pixel(250, 100), [0, 255, 0, 255]);
        assert_eq!(out.pixel(460, 200), [255, 0, 0, 255]);
        assert_eq!(out.pixel(500, 200), [0, 255, 0, 255]);
        assert_eq!(preview.pixel(230, 220), [0, 0, 255, 255]);
        assert_eq!(out.pixel(460, 440), [0, 0, 255, 255]);
    }

    #[test]
    fn test_export_uses_limits() {
        let img = DecodedImage::filled(300, 300, [9, 9, 9, 255]);
        let limits = ExportLimits {
            min_size: 64,
            max_size: 128,
        };
        let artifact =
            export_crop(Some(&img), &ViewState::default(), 320, limits, alloc, TIMESTAMP).unwrap();
        assert_eq!(artifact.size, 128);
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name("2024-03-05T14:07:09.123Z"),
            "circle-crop-2024-03-05T14-07-09.png"
        );
        assert_eq!(export_file_name(""), "circle-crop-.png");
    }

    #[test]
    fn test_crop_error_messages() {
        assert_eq!(CropError::NoImageLoaded.to_string(), "Please upload an image first");
    }
}

//! Drawing surface abstraction.
//!
//! The renderer never talks to a concrete canvas. It draws through the
//! [`DrawingSurface`] capability, which a browser canvas context and the
//! software [`PixelSurface`] both implement. Geometry, clipping and
//! serialization can therefore be tested without a rendering backend.
//!
//! ## Surfaces
//!
//! - **PixelSurface**: RGBA buffer with anti-aliased circle coverage and
//!   Bilinear / Lanczos3 image sampling, serialized with the PNG encoder
//! - **Canvas**: implemented by the WASM crate over `CanvasRenderingContext2d`

mod raster;
mod sample;

pub use raster::{PixelSurface, MAX_SURFACE_SIZE};
pub use sample::InterpolationFilter;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::EncodeError;
use crate::geometry::{Circle, Rect};

/// Errors that can occur when creating or reading back a surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The surface could not be allocated at the requested size.
    #[error("Cannot allocate a {size}x{size} drawing surface: {reason}")]
    Allocation { size: u32, reason: String },

    /// Pixel data could not be read back from the surface.
    #[error("Cannot read surface pixels: {0}")]
    Readback(String),

    /// PNG serialization failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Anything with natural pixel dimensions that a surface can draw.
pub trait BitmapSource {
    /// Natural `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);
}

/// Non-premultiplied color with a fractional alpha, as CSS writes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity from 0.0 (transparent) to 1.0 (opaque).
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba()` notation for canvas fill and stroke styles.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a.clamp(0.0, 1.0))
    }

    /// Premultiplied components in 0.0..=1.0.
    pub(crate) fn premultiplied(&self) -> [f32; 4] {
        let a = self.a.clamp(0.0, 1.0);
        [
            self.r as f32 / 255.0 * a,
            self.g as f32 / 255.0 * a,
            self.b as f32 / 255.0 * a,
            a,
        ]
    }
}

/// Line color and width for outlines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    /// Line width in surface pixels, centered on the path.
    pub width: f64,
}

/// Minimal drawing capability needed by the crop renderer.
///
/// All drawing calls composite with source-over. Clips stack: every draw is
/// restricted to the intersection of the clips currently pushed.
pub trait DrawingSurface {
    /// Bitmap type this surface can draw.
    type Bitmap: BitmapSource;

    /// Side length of the square surface in pixels.
    fn size(&self) -> u32;

    /// Reset every pixel to fully transparent.
    fn clear(&mut self);

    /// Fill a circle.
    fn fill_circle(&mut self, circle: Circle, color: Color);

    /// Stroke the outline of a circle.
    fn stroke_circle(&mut self, circle: Circle, stroke: StrokeStyle);

    /// Draw the `src` region of `bitmap` scaled into the `dst` region.
    fn draw_image_region(&mut self, bitmap: &Self::Bitmap, src: Rect, dst: Rect);

    /// Restrict subsequent drawing to the inside of `circle`.
    fn push_circle_clip(&mut self, circle: Circle);

    /// Remove the most recently pushed clip.
    fn pop_clip(&mut self);

    /// Encode the current contents as an RGBA PNG.
    fn serialize_png(&self) -> Result<Vec<u8>, SurfaceError>;

    /// Run `draw` with a circular clip that is released afterwards.
    fn with_circle_clip<R>(&mut self, circle: Circle, draw: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        self.push_circle_clip(circle);
        let result = draw(self);
        self.pop_clip();
        result
    }
}

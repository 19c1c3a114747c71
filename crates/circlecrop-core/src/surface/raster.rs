//! Software drawing surface backed by an RGBA buffer.
//!
//! Shapes are anti-aliased with a one-pixel coverage ramp measured from the
//! pixel center. Clips multiply their coverage into every draw. Pixels are
//! stored as straight (non-premultiplied) RGBA so the buffer can be handed
//! to the PNG encoder directly.

use log::debug;

use super::sample::{sample, SampleBounds};
use super::{Color, DrawingSurface, InterpolationFilter, StrokeStyle, SurfaceError};
use crate::decode::DecodedImage;
use crate::encode::encode_png;
use crate::geometry::{Circle, Point, Rect};

/// Largest side length a `PixelSurface` will allocate.
pub const MAX_SURFACE_SIZE: u32 = 16_384;

/// Square RGBA drawing surface.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    size: u32,
    pixels: Vec<u8>,
    clips: Vec<Circle>,
    filter: InterpolationFilter,
}

impl PixelSurface {
    /// Allocate a fully transparent surface of `size` x `size` pixels.
    ///
    /// # Errors
    ///
    /// Returns `SurfaceError::Allocation` for a zero size or a size above
    /// [`MAX_SURFACE_SIZE`].
    pub fn new(size: u32) -> Result<Self, SurfaceError> {
        if size == 0 || size > MAX_SURFACE_SIZE {
            return Err(SurfaceError::Allocation {
                size,
                reason: format!("side must be between 1 and {MAX_SURFACE_SIZE}"),
            });
        }

        let len = (size as usize) * (size as usize) * 4;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|e| SurfaceError::Allocation {
                size,
                reason: e.to_string(),
            })?;
        pixels.resize(len, 0);

        Ok(Self {
            size,
            pixels,
            clips: Vec::new(),
            filter: InterpolationFilter::default(),
        })
    }

    /// Surface for high-resolution export: Lanczos3 sampling.
    pub fn for_export(size: u32) -> Result<Self, SurfaceError> {
        debug!("Allocating {size}x{size} export surface");
        Ok(Self::new(size)?.with_filter(InterpolationFilter::Lanczos3))
    }

    pub fn with_filter(mut self, filter: InterpolationFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn filter(&self) -> InterpolationFilter {
        self.filter
    }

    /// Number of clips currently pushed.
    pub fn clip_depth(&self) -> usize {
        self.clips.len()
    }

    /// Read one pixel as straight RGBA.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = self.index(x, y);
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Raw straight RGBA pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.size as usize) + x as usize) * 4
    }

    /// Coverage of all active clips at a pixel center.
    #[inline]
    fn clip_coverage(&self, center: Point) -> f32 {
        self.clips
            .iter()
            .map(|clip| disc_coverage(clip, center))
            .product()
    }

    /// Pixel index range `[start, end)` touched by the span `[lo, hi)`.
    fn span(&self, lo: f64, hi: f64) -> (u32, u32) {
        let start = lo.floor().max(0.0).min(self.size as f64) as u32;
        let end = hi.ceil().max(0.0).min(self.size as f64) as u32;
        (start, end)
    }

    /// Source-over composite of a premultiplied color at `coverage`.
    fn blend(&mut self, x: u32, y: u32, src: [f32; 4], coverage: f32) {
        if coverage <= 0.0 {
            return;
        }
        let coverage = coverage.min(1.0);
        let idx = self.index(x, y);
        let px = &mut self.pixels[idx..idx + 4];

        let src_a = src[3] * coverage;
        if src_a <= 0.0 {
            return;
        }
        let dst_a = px[3] as f32 / 255.0;
        let keep = 1.0 - src_a;
        let out_a = src_a + dst_a * keep;

        for c in 0..3 {
            let dst_p = px[c] as f32 / 255.0 * dst_a;
            let out_p = src[c] * coverage + dst_p * keep;
            px[c] = (out_p / out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        px[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    fn paint_circle(
        &mut self,
        circle: Circle,
        color: Color,
        coverage: impl Fn(Point) -> f32,
        reach: f64,
    ) {
        let src = color.premultiplied();
        let (x0, x1) = self.span(circle.center.x - reach, circle.center.x + reach);
        let (y0, y1) = self.span(circle.center.y - reach, circle.center.y + reach);

        for y in y0..y1 {
            for x in x0..x1 {
                let center = pixel_center(x, y);
                let cov = coverage(center) * self.clip_coverage(center);
                self.blend(x, y, src, cov);
            }
        }
    }
}

impl DrawingSurface for PixelSurface {
    type Bitmap = DecodedImage;

    fn size(&self) -> u32 {
        self.size
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn fill_circle(&mut self, circle: Circle, color: Color) {
        self.paint_circle(circle, color, |p| disc_coverage(&circle, p), circle.radius + 1.0);
    }

    fn stroke_circle(&mut self, circle: Circle, stroke: StrokeStyle) {
        let half = stroke.width / 2.0;
        self.paint_circle(
            circle,
            stroke.color,
            |p| ring_coverage(&circle, half, p),
            circle.radius + half + 1.0,
        );
    }

    fn draw_image_region(&mut self, bitmap: &DecodedImage, src: Rect, dst: Rect) {
        if src.is_empty() || dst.is_empty() || bitmap.is_empty() {
            return;
        }

        let bounds = SampleBounds::for_region(bitmap, src.x, src.y, src.width, src.height);
        let scale_x = src.width / dst.width;
        let scale_y = src.height / dst.height;
        let (x0, x1) = self.span(dst.x, dst.right());
        let (y0, y1) = self.span(dst.y, dst.bottom());

        for y in y0..y1 {
            let cov_y = span_overlap(y as f64, dst.y, dst.bottom());
            for x in x0..x1 {
                let center = pixel_center(x, y);
                let cov = (span_overlap(x as f64, dst.x, dst.right()) * cov_y) as f32
                    * self.clip_coverage(center);
                if cov <= 0.0 {
                    continue;
                }

                // Map the destination pixel center into source pixel-index space
                let sx = src.x + (center.x - dst.x) * scale_x - 0.5;
                let sy = src.y + (center.y - dst.y) * scale_y - 0.5;
                let color = sample(bitmap, sx, sy, bounds, self.filter);
                self.blend(x, y, color, cov);
            }
        }
    }

    fn push_circle_clip(&mut self, circle: Circle) {
        self.clips.push(circle);
    }

    fn pop_clip(&mut self) {
        self.clips.pop();
    }

    fn serialize_png(&self) -> Result<Vec<u8>, SurfaceError> {
        Ok(encode_png(&self.pixels, self.size, self.size)?)
    }
}

#[inline]
fn pixel_center(x: u32, y: u32) -> Point {
    Point::new(x as f64 + 0.5, y as f64 + 0.5)
}

/// Fraction of the pixel span `[p, p + 1)` inside `[lo, hi)`.
#[inline]
fn span_overlap(p: f64, lo: f64, hi: f64) -> f64 {
    ((p + 1.0).min(hi) - p.max(lo)).clamp(0.0, 1.0)
}

/// Coverage of a filled disc, ramping over one pixel at the edge.
#[inline]
fn disc_coverage(circle: &Circle, p: Point) -> f32 {
    (circle.radius - circle.distance_to(p) + 0.5).clamp(0.0, 1.0) as f32
}

/// Coverage of a ring of half-width `half` centered on the circle.
#[inline]
fn ring_coverage(circle: &Circle, half: f64, p: Point) -> f32 {
    let d = (circle.distance_to(p) - circle.radius).abs();
    (half - d + 0.5).clamp(0.0, 1.0) as f32
}

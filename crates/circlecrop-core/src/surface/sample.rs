//! Bitmap sampling with bilinear and Lanczos3 interpolation.
//!
//! Sampling uses inverse mapping: for each destination pixel the surface
//! computes a fractional source coordinate and interpolates the pixels
//! around it. Interpolation happens on premultiplied values so transparent
//! neighbours do not bleed their color into the result.
//!
//! Coordinates outside the sampled region are clamped to its edge, which
//! matches how canvas `drawImage` treats the border of a source rectangle.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

/// Interpolation filter for drawing bitmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationFilter {
    /// Fast bilinear interpolation - good for preview rendering.
    #[default]
    Bilinear,
    /// High-quality Lanczos3 interpolation - good for export.
    Lanczos3,
}

/// Inclusive pixel bounds that sampling is clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SampleBounds {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl SampleBounds {
    /// Bounds covering the pixels touched by `[x, x + w) x [y, y + h)`,
    /// intersected with the image.
    pub fn for_region(image: &DecodedImage, x: f64, y: f64, w: f64, h: f64) -> Self {
        let last_x = image.width as i64 - 1;
        let last_y = image.height as i64 - 1;
        let min_x = (x.floor() as i64).clamp(0, last_x);
        let min_y = (y.floor() as i64).clamp(0, last_y);
        let max_x = ((x + w).ceil() as i64 - 1).clamp(min_x, last_x);
        let max_y = ((y + h).ceil() as i64 - 1).clamp(min_y, last_y);
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[inline]
    fn clamp(&self, px: i64, py: i64) -> (usize, usize) {
        (
            px.clamp(self.min_x, self.max_x) as usize,
            py.clamp(self.min_y, self.max_y) as usize,
        )
    }
}

/// Sample `image` at pixel-index coordinates `(x, y)`.
///
/// Returns premultiplied RGBA in 0.0..=1.0.
pub(crate) fn sample(
    image: &DecodedImage,
    x: f64,
    y: f64,
    bounds: SampleBounds,
    filter: InterpolationFilter,
) -> [f32; 4] {
    match filter {
        InterpolationFilter::Bilinear => sample_bilinear(image, x, y, bounds),
        InterpolationFilter::Lanczos3 => sample_lanczos3(image, x, y, bounds),
    }
}

/// Get a pixel as premultiplied `[f64; 4]` in 0.0..=1.0.
#[inline]
fn get_premultiplied(image: &DecodedImage, px: usize, py: usize) -> [f64; 4] {
    let idx = (py * image.width as usize + px) * 4;
    let a = image.pixels[idx + 3] as f64 / 255.0;
    [
        image.pixels[idx] as f64 / 255.0 * a,
        image.pixels[idx + 1] as f64 / 255.0 * a,
        image.pixels[idx + 2] as f64 / 255.0 * a,
        a,
    ]
}

/// Clamp an accumulated premultiplied value into a valid pixel.
#[inline]
fn finish(sum: [f64; 4]) -> [f32; 4] {
    let a = sum[3].clamp(0.0, 1.0);
    [
        sum[0].clamp(0.0, a) as f32,
        sum[1].clamp(0.0, a) as f32,
        sum[2].clamp(0.0, a) as f32,
        a as f32,
    ]
}

/// Bilinear interpolation over the 4 nearest pixels.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64, bounds: SampleBounds) -> [f32; 4] {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let (ax, ay) = bounds.clamp(x0, y0);
    let (bx, by) = bounds.clamp(x0 + 1, y0 + 1);

    let p00 = get_premultiplied(image, ax, ay);
    let p10 = get_premultiplied(image, bx, ay);
    let p01 = get_premultiplied(image, ax, by);
    let p11 = get_premultiplied(image, bx, by);

    let mut sum = [0.0f64; 4];
    for i in 0..4 {
        sum[i] = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
    }
    finish(sum)
}

/// Lanczos3 interpolation over a 6x6 neighbourhood.
fn sample_lanczos3(image: &DecodedImage, x: f64, y: f64, bounds: SampleBounds) -> [f32; 4] {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        let wy = lanczos_weight(y - (y0 + ky) as f64, 3.0);
        if wy == 0.0 {
            continue;
        }
        for kx in -2..=3 {
            let wx = lanczos_weight(x - (x0 + kx) as f64, 3.0);
            let weight = wx * wy;
            if weight == 0.0 {
                continue;
            }

            let (px, py) = bounds.clamp(x0 + kx, y0 + ky);
            let pixel = get_premultiplied(image, px, py);
            for i in 0..4 {
                sum[i] += pixel[i] * weight;
            }
            weight_sum += weight;
        }
    }

    if weight_sum.abs() < f64::EPSILON {
        return sample_bilinear(image, x, y, bounds);
    }
    for v in &mut sum {
        *v /= weight_sum;
    }
    finish(sum)
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;
    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}

//! Crop geometry shared by the preview and export paths.
//!
//! # Coordinate System
//!
//! - Surface coordinates are in pixels of the square drawing surface
//! - Origin is the top-left corner, y grows downwards
//! - The crop circle is always inscribed in the surface
//!
//! The source bitmap is first reduced to its centered square ("crop base"),
//! which is then scaled by the view's zoom and translated by its pan offset.
//! Export re-derives the same layout at a larger resolution by scaling the
//! draw size and the offset by `export_size / preview_size`.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::view::ViewState;

/// A 2D point or vector in surface pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square with its top-left corner at `origin`.
    pub fn square(origin: Point, side: f64) -> Self {
        Self::new(origin.x, origin.y, side, side)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Circle given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    /// The circle inscribed in a square surface of side `size`.
    pub fn inscribed(size: f64) -> Self {
        let radius = size / 2.0;
        Self {
            center: Point::new(radius, radius),
            radius,
        }
    }

    /// Distance from the center to `p`.
    #[inline]
    pub fn distance_to(&self, p: Point) -> f64 {
        let d = p - self.center;
        (d.x * d.x + d.y * d.y).sqrt()
    }
}

/// Layout of the bitmap on a square drawing surface.
///
/// Derived on every draw, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    /// Side length of the square drawing surface.
    pub square_size: f64,
    /// Radius of the crop circle (half the square size).
    pub radius: f64,
    /// Side of the centered square taken from the bitmap.
    pub crop_base: f64,
    /// Side of the crop base once drawn on the surface.
    pub draw_size: f64,
    /// Top-left of the crop base inside the bitmap.
    pub source_origin: Point,
    /// Top-left of the drawn crop base on the surface.
    pub dest_origin: Point,
}

impl CanvasGeometry {
    /// Geometry for drawing at the preview resolution.
    pub fn preview(bitmap: (u32, u32), square_size: f64, view: &ViewState) -> Self {
        Self::scaled(bitmap, square_size, view, 1.0)
    }

    /// Geometry for a surface whose resolution differs from the preview.
    ///
    /// Both the draw size and the pan offset are multiplied by
    /// `scale_factor` before the destination origin is computed, so the
    /// framing matches the preview at any resolution.
    pub fn scaled(
        bitmap: (u32, u32),
        square_size: f64,
        view: &ViewState,
        scale_factor: f64,
    ) -> Self {
        let (width, height) = (bitmap.0 as f64, bitmap.1 as f64);
        let radius = square_size / 2.0;
        let crop_base = width.min(height);
        let draw_size = crop_base * view.scale() * scale_factor;
        let offset = view.offset() * scale_factor;

        Self {
            square_size,
            radius,
            crop_base,
            draw_size,
            source_origin: Point::new((width - crop_base) / 2.0, (height - crop_base) / 2.0),
            dest_origin: Point::new(
                radius - draw_size / 2.0 + offset.x,
                radius - draw_size / 2.0 + offset.y,
            ),
        }
    }

    /// Region of the bitmap that gets drawn.
    pub fn source_rect(&self) -> Rect {
        Rect::square(self.source_origin, self.crop_base)
    }

    /// Region of the surface the crop base is drawn into.
    pub fn dest_rect(&self) -> Rect {
        Rect::square(self.dest_origin, self.draw_size)
    }

    /// The crop circle for this surface.
    pub fn circle(&self) -> Circle {
        Circle::inscribed(self.square_size)
    }
}

/// Side length of the exported square.
///
/// Follows the source's native resolution (its shorter edge), bounded below
/// for quality and above for memory use.
pub fn export_size(bitmap: (u32, u32), min_size: u32, max_size: u32) -> u32 {
    bitmap.0.min(bitmap.1).clamp(min_size, max_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(scale: f64, x: f64, y: f64) -> ViewState {
        let mut view = ViewState::default();
        view.set_scale_unchecked(scale);
        view.set_offset(Point::new(x, y));
        view
    }

    #[test]
    fn test_preview_geometry_landscape() {
        let geo = CanvasGeometry::preview((800, 600), 320.0, &ViewState::default());

        assert_eq!(geo.radius, 160.0);
        assert_eq!(geo.crop_base, 600.0);
        assert_eq!(geo.draw_size, 600.0);
        assert_eq!(geo.source_origin, Point::new(100.0, 0.0));
        assert_eq!(geo.dest_origin, Point::new(160.0 - 300.0, 160.0 - 300.0));
    }

    #[test]
    fn test_preview_geometry_portrait_centers_vertically() {
        let geo = CanvasGeometry::preview((300, 500), 320.0, &ViewState::default());
        assert_eq!(geo.crop_base, 300.0);
        assert_eq!(geo.source_origin, Point::new(0.0, 100.0));
    }

    #[test]
    fn test_odd_difference_gives_half_pixel_origin() {
        let geo = CanvasGeometry::preview((101, 100), 320.0, &ViewState::default());
        assert_eq!(geo.source_origin, Point::new(0.5, 0.0));
    }

    #[test]
    fn test_preview_geometry_with_zoom_and_pan() {
        let geo = CanvasGeometry::preview((400, 400), 320.0, &view(0.5, 10.0, -20.0));

        assert_eq!(geo.draw_size, 200.0);
        assert_eq!(geo.dest_origin, Point::new(160.0 - 100.0 + 10.0, 160.0 - 100.0 - 20.0));
        assert_eq!(geo.dest_rect(), Rect::new(70.0, 40.0, 200.0, 200.0));
        assert_eq!(geo.source_rect(), Rect::new(0.0, 0.0, 400.0, 400.0));
    }

    #[test]
    fn test_scaled_geometry_doubles_everything() {
        let v = view(1.5, 12.0, 7.0);
        let preview = CanvasGeometry::preview((1000, 700), 320.0, &v);
        let export = CanvasGeometry::scaled((1000, 700), 640.0, &v, 2.0);

        assert_eq!(export.draw_size, preview.draw_size * 2.0);
        assert_eq!(export.dest_origin, preview.dest_origin * 2.0);
        // Source region does not depend on the surface resolution
        assert_eq!(export.source_rect(), preview.source_rect());
    }

    #[test]
    fn test_circle_inscribed() {
        let circle = Circle::inscribed(320.0);
        assert_eq!(circle.center, Point::new(160.0, 160.0));
        assert_eq!(circle.radius, 160.0);
        assert_eq!(circle.distance_to(Point::new(160.0, 0.0)), 160.0);
        assert!(circle.distance_to(Point::ORIGIN) > circle.radius);
    }

    #[test]
    fn test_export_size_clamps() {
        assert_eq!(export_size((100, 300), 512, 4096), 512);
        assert_eq!(export_size((1920, 1080), 512, 4096), 1080);
        assert_eq!(export_size((9000, 6000), 512, 4096), 4096);
        assert_eq!(export_size((512, 512), 512, 4096), 512);
    }

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(3.0, 4.0);
        let b = Point::new(1.0, -2.0);
        assert_eq!(a + b, Point::new(4.0, 2.0));
        assert_eq!(a - b, Point::new(2.0, 6.0));
        assert_eq!(a * 0.5, Point::new(1.5, 2.0));
    }

    #[test]
    fn test_rect_helpers() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert!(!r.is_empty());
        assert!(Rect::new(0.0, 0.0, 0.0, 5.0).is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

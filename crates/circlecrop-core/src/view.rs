//! Zoom and pan state of the crop view.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Bounds and step for the zoom factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    /// Smallest allowed scale.
    pub min: f64,
    /// Largest allowed scale.
    pub max: f64,
    /// Scale change per wheel notch.
    pub step: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 2.0,
            step: 0.1,
        }
    }
}

impl ZoomLimits {
    #[inline]
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }

    /// Scale change for a wheel event. Scrolling up (negative delta) zooms in.
    pub fn wheel_delta(&self, delta_y: f64) -> f64 {
        if delta_y > 0.0 {
            -self.step
        } else if delta_y < 0.0 {
            self.step
        } else {
            0.0
        }
    }
}

/// Current zoom factor and pan offset.
///
/// The offset is unbounded: the image may be dragged partly or
/// entirely out of the circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    scale: f64,
    offset: Point,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Point::ORIGIN,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Zoom level as a whole percentage, for display next to the slider.
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    /// Back to `scale = 1`, `offset = (0, 0)`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Set the scale, clamped to `limits`. Returns true if it changed.
    ///
    /// Non-finite values are ignored.
    pub fn set_scale(&mut self, scale: f64, limits: &ZoomLimits) -> bool {
        if !scale.is_finite() {
            return false;
        }
        let clamped = limits.clamp(scale);
        let changed = clamped != self.scale;
        self.scale = clamped;
        changed
    }

    /// Add `delta` to the scale, clamped to `limits`. Returns true if it changed.
    pub fn zoom_by(&mut self, delta: f64, limits: &ZoomLimits) -> bool {
        self.set_scale(self.scale + delta, limits)
    }

    /// Set the pan offset. Returns true if it changed.
    pub fn set_offset(&mut self, offset: Point) -> bool {
        let changed = offset != self.offset;
        self.offset = offset;
        changed
    }

    #[cfg(test)]
    pub(crate) fn set_scale_unchecked(&mut self, scale: f64) {
        self.scale = scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view() {
        let view = ViewState::new();
        assert_eq!(view.scale(), 1.0);
        assert_eq!(view.offset(), Point::ORIGIN);
        assert_eq!(view.zoom_percent(), 100);
    }

    #[test]
    fn test_zoom_in_at_max_stays_at_max() {
        let limits = ZoomLimits::default();
        let mut view = ViewState::new();
        view.set_scale(2.0, &limits);

        assert!(!view.zoom_by(limits.step, &limits));
        assert_eq!(view.scale(), 2.0);
    }

    #[test]
    fn test_zoom_out_at_min_stays_at_min() {
        let limits = ZoomLimits::default();
        let mut view = ViewState::new();
        view.set_scale(0.5, &limits);

        assert!(!view.zoom_by(-limits.step, &limits));
        assert_eq!(view.scale(), 0.5);
    }

    #[test]
    fn test_repeated_zoom_in_reaches_exact_max() {
        let limits = ZoomLimits::default();
        let mut view = ViewState::new();
        for _ in 0..15 {
            view.zoom_by(limits.step, &limits);
        }
        assert_eq!(view.scale(), 2.0);
        assert_eq!(view.zoom_percent(), 200);
    }

    #[test]
    fn test_set_scale_clamps() {
        let limits = ZoomLimits::default();
        let mut view = ViewState::new();

        assert!(view.set_scale(5.0, &limits));
        assert_eq!(view.scale(), 2.0);
        assert!(view.set_scale(0.01, &limits));
        assert_eq!(view.scale(), 0.5);
    }

    #[test]
    fn test_set_scale_ignores_nan() {
        let limits = ZoomLimits::default();
        let mut view = ViewState::new();
        assert!(!view.set_scale(f64::NAN, &limits));
        assert_eq!(view.scale(), 1.0);
    }

    #[test]
    fn test_wheel_direction() {
        let limits = ZoomLimits::default();
        assert_eq!(limits.wheel_delta(-120.0), 0.1);
        assert_eq!(limits.wheel_delta(120.0), -0.1);
        assert_eq!(limits.wheel_delta(0.0), 0.0);
    }

    #[test]
    fn test_reset() {
        let limits = ZoomLimits::default();
        let mut view = ViewState::new();
        view.set_scale(1.7, &limits);
        view.set_offset(Point::new(-40.0, 12.5));

        view.reset();
        assert_eq!(view, ViewState::default());
    }

    #[test]
    fn test_offset_is_unclamped() {
        let mut view = ViewState::new();
        assert!(view.set_offset(Point::new(-1.0e6, 1.0e6)));
        assert_eq!(view.offset(), Point::new(-1.0e6, 1.0e6));
        assert!(!view.set_offset(Point::new(-1.0e6, 1.0e6)));
    }

    #[test]
    fn test_zoom_percent_rounds() {
        let limits = ZoomLimits::default();
        let mut view = ViewState::new();
        view.set_scale(1.234, &limits);
        assert_eq!(view.zoom_percent(), 123);
        view.set_scale(0.555, &limits);
        assert_eq!(view.zoom_percent(), 56);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

//! Tool configuration.
//!
//! Every field has a default matching the stock tool, and deserialization
//! fills in missing fields, so hosts only pass what they want to change.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::surface::{Color, StrokeStyle};
use crate::view::ZoomLimits;

/// Errors found by [`CropConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Preview size must be non-zero")]
    ZeroPreviewSize,

    #[error("Invalid zoom range: min ({min}) must be positive and not above max ({max})")]
    InvalidZoomRange { min: f64, max: f64 },

    #[error("Zoom step must be positive, got {0}")]
    InvalidZoomStep(f64),

    #[error("Invalid export size range: min ({min}) must be non-zero and not above max ({max})")]
    InvalidExportRange { min: u32, max: u32 },
}

/// Colors and line widths of the preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewStyle {
    /// Outline drawn over a loaded image to mark the crop circle.
    pub outline: StrokeStyle,
    /// Fill of the empty-state circle.
    pub placeholder_fill: Color,
    /// Outline of the empty-state circle.
    pub placeholder_outline: StrokeStyle,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            outline: StrokeStyle {
                color: Color::rgba(255, 255, 255, 0.9),
                width: 2.0,
            },
            placeholder_fill: Color::rgba(128, 128, 128, 0.1),
            placeholder_outline: StrokeStyle {
                color: Color::rgba(128, 128, 128, 0.3),
                width: 2.0,
            },
        }
    }
}

/// Bounds for the exported square's side length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportLimits {
    pub min_size: u32,
    pub max_size: u32,
}

impl Default for ExportLimits {
    fn default() -> Self {
        Self {
            min_size: 512,
            max_size: 4096,
        }
    }
}

/// Configuration for a crop session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Side length of the square preview canvas, in canvas pixels.
    pub preview_size: u32,
    /// Zoom bounds and wheel step.
    pub zoom: ZoomLimits,
    /// Export resolution bounds.
    pub export: ExportLimits,
    /// Preview appearance.
    pub style: PreviewStyle,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            preview_size: 320,
            zoom: ZoomLimits::default(),
            export: ExportLimits::default(),
            style: PreviewStyle::default(),
        }
    }
}

impl CropConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that all bounds are consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preview_size == 0 {
            return Err(ConfigError::ZeroPreviewSize);
        }

        let ZoomLimits { min, max, step } = self.zoom;
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(ConfigError::InvalidZoomRange { min, max });
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(ConfigError::InvalidZoomStep(step));
        }

        let ExportLimits { min_size, max_size } = self.export;
        if min_size == 0 || min_size > max_size {
            return Err(ConfigError::InvalidExportRange {
                min: min_size,
                max: max_size,
            });
        }

        Ok(())
    }
}

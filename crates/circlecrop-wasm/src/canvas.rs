//! `DrawingSurface` over an HTML canvas 2D context.

use std::f64::consts::TAU;

use circlecrop_core::surface::{BitmapSource, Color, DrawingSurface, StrokeStyle, SurfaceError};
use circlecrop_core::{encode_png, Circle, Rect};
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, ImageSmoothingQuality,
};

use crate::resource::js_error_message;

/// A decoded `<img>` element.
#[derive(Debug, Clone)]
pub struct HtmlBitmap(HtmlImageElement);

impl HtmlBitmap {
    pub fn new(image: HtmlImageElement) -> Self {
        Self(image)
    }

    pub fn element(&self) -> &HtmlImageElement {
        &self.0
    }
}

impl BitmapSource for HtmlBitmap {
    fn dimensions(&self) -> (u32, u32) {
        (self.0.natural_width(), self.0.natural_height())
    }
}

/// Square canvas with its 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Draw into an existing canvas element.
    pub fn attach(canvas: HtmlCanvasElement) -> Result<Self, SurfaceError> {
        let size = canvas.width();
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| allocation_error(size, js_error_message(&e)))?
            .ok_or_else(|| allocation_error(size, "2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| allocation_error(size, "unexpected context type".to_string()))?;
        ctx.set_image_smoothing_enabled(true);
        Ok(Self { canvas, ctx })
    }

    /// Create a detached `size` x `size` canvas.
    pub fn create(document: &Document, size: u32) -> Result<Self, SurfaceError> {
        let canvas = document
            .create_element("canvas")
            .map_err(|e| allocation_error(size, js_error_message(&e)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| allocation_error(size, "not a canvas element".to_string()))?;
        canvas.set_width(size);
        canvas.set_height(size);
        Self::attach(canvas)
    }

    /// Create a detached export canvas that resamples at the highest quality.
    pub fn for_export(document: &Document, size: u32) -> Result<Self, SurfaceError> {
        let surface = Self::create(document, size)?;
        surface.ctx.set_image_smoothing_quality(ImageSmoothingQuality::High);
        Ok(surface)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn trace_circle(&self, circle: Circle) -> bool {
        self.ctx.begin_path();
        match self
            .ctx
            .arc(circle.center.x, circle.center.y, circle.radius.max(0.0), 0.0, TAU)
        {
            Ok(()) => true,
            Err(e) => {
                warn!("Cannot trace circle: {}", js_error_message(&e));
                false
            }
        }
    }
}

fn allocation_error(size: u32, reason: String) -> SurfaceError {
    SurfaceError::Allocation { size, reason }
}

impl DrawingSurface for CanvasSurface {
    type Bitmap = HtmlBitmap;

    fn size(&self) -> u32 {
        self.canvas.width()
    }

    fn clear(&mut self) {
        let size = self.size() as f64;
        self.ctx.clear_rect(0.0, 0.0, size, size);
    }

    fn fill_circle(&mut self, circle: Circle, color: Color) {
        if self.trace_circle(circle) {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill();
        }
    }

    fn stroke_circle(&mut self, circle: Circle, stroke: StrokeStyle) {
        if self.trace_circle(circle) {
            self.ctx.set_stroke_style_str(&stroke.color.to_css());
            self.ctx.set_line_width(stroke.width);
            self.ctx.stroke();
        }
    }

    fn draw_image_region(&mut self, bitmap: &HtmlBitmap, src: Rect, dst: Rect) {
        if src.is_empty() || dst.is_empty() {
            return;
        }
        let result = self
            .ctx
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                bitmap.element(),
                src.x,
                src.y,
                src.width,
                src.height,
                dst.x,
                dst.y,
                dst.width,
                dst.height,
            );
        if let Err(e) = result {
            warn!("drawImage failed: {}", js_error_message(&e));
        }
    }

    fn push_circle_clip(&mut self, circle: Circle) {
        self.ctx.save();
        if self.trace_circle(circle) {
            self.ctx.clip();
        }
    }

    fn pop_clip(&mut self) {
        self.ctx.restore();
    }

    fn serialize_png(&self) -> Result<Vec<u8>, SurfaceError> {
        let size = self.size();
        let data = self
            .ctx
            .get_image_data(0.0, 0.0, size as f64, size as f64)
            .map_err(|e| SurfaceError::Readback(js_error_message(&e)))?;
        Ok(encode_png(&data.data().0, size, size)?)
    }
}

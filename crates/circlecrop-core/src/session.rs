//! A crop session: one loaded image, its view, and the drag state.
//!
//! The session is the single owner of mutable tool state. Hosts feed it
//! load completions and input events and redraw whenever it says so.

use crate::config::{ConfigError, CropConfig};
use crate::geometry::Point;
use crate::input::{InputEvent, InputResponse, PointerTracker};
use crate::loader::{ImageLoader, LoadError, LoadOutcome, LoadTicket, ResourceHost};
use crate::render::{export_crop, render_preview, CropError, ExportArtifact};
use crate::surface::{BitmapSource, DrawingSurface, SurfaceError};
use crate::view::ViewState;

/// State of the interactive crop tool.
pub struct CropSession<H: ResourceHost, B> {
    config: CropConfig,
    loader: ImageLoader<H, B>,
    view: ViewState,
    pointer: PointerTracker,
}

impl<H: ResourceHost, B: BitmapSource> CropSession<H, B> {
    /// Create an empty session.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found in `config`.
    pub fn new(config: CropConfig, host: H) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            loader: ImageLoader::new(host),
            view: ViewState::new(),
            pointer: PointerTracker::new(),
        })
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn scale(&self) -> f64 {
        self.view.scale()
    }

    pub fn offset(&self) -> Point {
        self.view.offset()
    }

    pub fn zoom_percent(&self) -> u32 {
        self.view.zoom_percent()
    }

    pub fn has_image(&self) -> bool {
        self.loader.has_image()
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.is_dragging()
    }

    /// Bitmap currently shown, if any.
    pub fn current_image(&self) -> Option<&B> {
        self.loader.bitmap()
    }

    pub fn loader(&self) -> &ImageLoader<H, B> {
        &self.loader
    }

    /// Start loading `file`. See [`ImageLoader::begin_load`].
    pub fn begin_load(&mut self, file: &H::File) -> Result<LoadTicket<H::Url>, LoadError> {
        self.loader.begin_load(file)
    }

    /// Finish a load. A newly installed image starts from the default view.
    pub fn complete_load(&mut self, ticket: LoadTicket<H::Url>, bitmap: B) -> LoadOutcome {
        let outcome = self.loader.complete_load(ticket, bitmap);
        if outcome == LoadOutcome::Installed {
            self.view.reset();
            self.pointer.release();
        }
        outcome
    }

    /// Abandon a load whose decode failed. See [`ImageLoader::fail_load`].
    pub fn fail_load(
        &mut self,
        ticket: LoadTicket<H::Url>,
        reason: impl Into<String>,
    ) -> Option<LoadError> {
        self.loader.fail_load(ticket, reason)
    }

    /// Apply an input event to the view.
    pub fn handle_input(&mut self, event: InputEvent) -> InputResponse {
        match event {
            InputEvent::Press(pos) => {
                let started = self.pointer.press(pos, self.view.offset(), self.has_image());
                if started {
                    InputResponse::consumed(false)
                } else {
                    InputResponse::IGNORED
                }
            }
            InputEvent::Move(pos) => match self.pointer.drag_to(pos) {
                Some(offset) => InputResponse::consumed(self.view.set_offset(offset)),
                None => InputResponse::IGNORED,
            },
            InputEvent::Release => {
                self.pointer.release();
                InputResponse::IGNORED
            }
            InputEvent::Wheel { delta_y } => {
                if !self.has_image() {
                    return InputResponse::IGNORED;
                }
                let delta = self.config.zoom.wheel_delta(delta_y);
                InputResponse::consumed(self.view.zoom_by(delta, &self.config.zoom))
            }
        }
    }

    /// Set the zoom from the slider. Returns true if a redraw is needed.
    ///
    /// The slider is inactive until an image is loaded.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        if !self.has_image() {
            return false;
        }
        self.view.set_scale(scale, &self.config.zoom)
    }

    /// Redraw the preview surface.
    pub fn render_preview<S>(&self, surface: &mut S)
    where
        S: DrawingSurface<Bitmap = B>,
    {
        render_preview(surface, self.current_image(), &self.view, &self.config.style);
    }

    /// Export the current crop framed as on a preview of `preview_size`
    /// pixels. See [`export_crop`].
    pub fn export<S, F>(
        &self,
        preview_size: u32,
        allocate: F,
        iso_timestamp: &str,
    ) -> Result<ExportArtifact, CropError>
    where
        S: DrawingSurface<Bitmap = B>,
        F: FnOnce(u32) -> Result<S, SurfaceError>,
    {
        export_crop(
            self.current_image(),
            &self.view,
            preview_size,
            self.config.export,
            allocate,
            iso_timestamp,
        )
    }

    /// Drop the current image, cancel in-flight loads and reset the view.
    pub fn discard(&mut self) {
        self.loader.discard();
        self.view.reset();
        self.pointer.release();
    }
}

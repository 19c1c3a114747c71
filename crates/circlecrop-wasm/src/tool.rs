//! The interactive crop tool bound to a canvas element.
//!
//! # Usage
//!
//! ```typescript
//! import init, { CircleCropTool } from '@circlecrop/wasm';
//!
//! await init();
//! const tool = new CircleCropTool(canvas);
//! tool.bind_file_input(fileInput);
//! tool.set_on_zoom_change((percent) => { label.textContent = `${percent}%`; });
//! slider.oninput = () => tool.set_scale(Number(slider.value));
//! downloadButton.onclick = () => tool.export_crop();
//! // On unmount
//! tool.destroy();
//! ```
//!
//! Mouse and touch drags pan the image, the wheel zooms. All state lives in
//! one `CropSession` shared by the event listeners through `Rc<RefCell<_>>`.

use std::cell::RefCell;
use std::rc::Rc;

use circlecrop_core::{
    CropSession, DrawingSurface, ExportArtifact, InputEvent, LoadOutcome, LoadTicket, Point,
    ACCEPTED_MEDIA_TYPES,
};
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Blob, BlobPropertyBag, Document, Event, EventTarget, File,
    HtmlAnchorElement, HtmlCanvasElement, HtmlImageElement, HtmlInputElement, MouseEvent,
    TouchEvent, Url, WheelEvent, Window,
};

use crate::canvas::{CanvasSurface, HtmlBitmap};
use crate::config::parse_config;
use crate::export::current_timestamp;
use crate::resource::{js_error_message, BlobUrl, BlobUrlHost};

/// Canvas events that drive panning and zooming.
const POINTER_EVENTS: [&str; 9] = [
    "mousedown",
    "mousemove",
    "mouseup",
    "mouseleave",
    "touchstart",
    "touchmove",
    "touchend",
    "touchcancel",
    "wheel",
];

const DECODE_FAILED_REASON: &str = "the browser could not decode the file";

type Session = CropSession<BlobUrlHost, HtmlBitmap>;

struct ToolState {
    session: Session,
    preview: CanvasSurface,
    window: Window,
    document: Document,
    on_zoom_change: Option<js_sys::Function>,
}

impl ToolState {
    fn redraw(&mut self) {
        self.session.render_preview(&mut self.preview);
    }

    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            warn!("Cannot show alert \"{}\": {}", message, js_error_message(&e));
        }
    }
}

type SharedState = Rc<RefCell<ToolState>>;

/// A registered DOM listener, removed on teardown.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn detach(&self) {
        let result = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
        if let Err(e) = result {
            warn!("Cannot remove {} listener: {}", self.kind, js_error_message(&e));
        }
    }
}

/// Circle crop tool attached to a preview canvas.
#[wasm_bindgen]
pub struct CircleCropTool {
    state: SharedState,
    canvas: HtmlCanvasElement,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl CircleCropTool {
    /// Attach to `canvas`. `config` is an optional partial `CropConfig`.
    ///
    /// The canvas is resized to the configured preview size and shows the
    /// empty placeholder until an image is loaded.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: JsValue) -> Result<CircleCropTool, JsValue> {
        let config = parse_config(config)?;
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document available"))?;

        canvas.set_width(config.preview_size);
        canvas.set_height(config.preview_size);
        let preview = CanvasSurface::attach(canvas.clone())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let session = CropSession::new(config, BlobUrlHost)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let state = Rc::new(RefCell::new(ToolState {
            session,
            preview,
            window,
            document,
            on_zoom_change: None,
        }));
        state.borrow_mut().redraw();

        let mut tool = CircleCropTool {
            state,
            canvas,
            listeners: Vec::new(),
        };
        for kind in POINTER_EVENTS {
            tool.listen_pointer(kind)?;
        }
        debug!("Crop tool attached");
        Ok(tool)
    }

    /// Load an image file. Non-image files are rejected with an alert.
    ///
    /// Decoding happens in the background; the preview updates when it
    /// completes. If another file is loaded meanwhile, only the newest one
    /// is shown.
    pub fn load_file(&self, file: File) -> Result<(), JsValue> {
        start_load(&self.state, &file)
    }

    /// Load whatever file `input` selects from now on.
    pub fn bind_file_input(&mut self, input: HtmlInputElement) -> Result<(), JsValue> {
        input.set_accept(ACCEPTED_MEDIA_TYPES);
        let state = Rc::clone(&self.state);
        let source = input.clone();
        self.listen(input.into(), "change", true, move |_event: Event| {
            let Some(file) = source.files().and_then(|files| files.get(0)) else {
                return;
            };
            // The user has already been alerted
            if let Err(e) = start_load(&state, &file) {
                debug!("Load not started: {}", js_error_message(&e));
            }
        })
    }

    /// Render the circular crop at export resolution and download it as PNG.
    ///
    /// Returns the download file name. Alerts and fails when no image is
    /// loaded.
    pub fn export_crop(&self) -> Result<String, JsValue> {
        let st = self.state.borrow();
        let document = st.document.clone();
        let result = st.session.export(
            st.preview.size(),
            |size| CanvasSurface::for_export(&document, size),
            &current_timestamp(),
        );

        match result {
            Ok(artifact) => {
                download(&document, &artifact)?;
                debug!("Exported {} ({} bytes)", artifact.file_name, artifact.bytes.len());
                Ok(artifact.file_name)
            }
            Err(e) => {
                st.alert(&e.to_string());
                Err(JsValue::from_str(&e.to_string()))
            }
        }
    }

    /// Set the zoom factor (e.g. from a slider). Clamped to the configured
    /// bounds.
    pub fn set_scale(&self, scale: f64) {
        let changed = {
            let mut st = self.state.borrow_mut();
            let changed = st.session.set_scale(scale);
            if changed {
                st.redraw();
            }
            changed
        };
        if changed {
            notify_zoom_change(&self.state);
        }
    }

    /// Register a callback receiving the zoom percentage after each change.
    pub fn set_on_zoom_change(&self, callback: Option<js_sys::Function>) {
        self.state.borrow_mut().on_zoom_change = callback;
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.state.borrow().session.scale()
    }

    #[wasm_bindgen(getter)]
    pub fn zoom_percent(&self) -> u32 {
        self.state.borrow().session.zoom_percent()
    }

    /// Horizontal pan offset in preview pixels.
    #[wasm_bindgen(getter)]
    pub fn offset_x(&self) -> f64 {
        self.state.borrow().session.offset().x
    }

    /// Vertical pan offset in preview pixels.
    #[wasm_bindgen(getter)]
    pub fn offset_y(&self) -> f64 {
        self.state.borrow().session.offset().y
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.state.borrow().session.has_image()
    }

    /// Redraw the preview.
    pub fn redraw(&self) {
        self.state.borrow_mut().redraw();
    }

    /// Remove all listeners and release the loaded image.
    pub fn destroy(&mut self) {
        self.teardown();
    }
}

impl CircleCropTool {
    fn listen(
        &mut self,
        target: EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::wrap(Box::new(handler));
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        self.listeners.push(Listener {
            target,
            kind,
            callback,
        });
        Ok(())
    }

    fn listen_pointer(&mut self, kind: &'static str) -> Result<(), JsValue> {
        let state = Rc::clone(&self.state);
        let canvas = self.canvas.clone();
        let target: EventTarget = self.canvas.clone().into();
        // Wheel and touch listeners must be able to cancel page scrolling
        let passive = !matches!(kind, "wheel" | "touchstart" | "touchmove");
        self.listen(target, kind, passive, move |event: Event| {
            dispatch(&state, &canvas, kind, &event);
        })
    }

    fn teardown(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        if let Ok(mut st) = self.state.try_borrow_mut() {
            st.session.discard();
            st.redraw();
        }
    }
}

impl Drop for CircleCropTool {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn start_load(state: &SharedState, file: &File) -> Result<(), JsValue> {
    let ticket = {
        let mut st = state.borrow_mut();
        match st.session.begin_load(file) {
            Ok(ticket) => ticket,
            Err(e) => {
                st.alert(&e.to_string());
                return Err(JsValue::from_str(&e.to_string()));
            }
        }
    };

    let image = match HtmlImageElement::new() {
        Ok(image) => image,
        Err(e) => {
            let reason = js_error_message(&e);
            state.borrow_mut().session.fail_load(ticket, reason.as_str());
            return Err(JsValue::from_str(&reason));
        }
    };

    let src = ticket.url().as_str().to_owned();
    let shared = Rc::clone(state);
    let element = image.clone();
    // One handler for both outcomes; only one of load / error fires
    let on_settled = Closure::once_into_js(move |event: Event| {
        finish_load(&shared, ticket, element, &event);
    });
    image.set_onload(Some(on_settled.unchecked_ref()));
    image.set_onerror(Some(on_settled.unchecked_ref()));
    image.set_src(&src);
    Ok(())
}

fn finish_load(
    state: &SharedState,
    ticket: LoadTicket<BlobUrl>,
    image: HtmlImageElement,
    event: &Event,
) {
    let installed = {
        let mut st = state.borrow_mut();
        if event.type_() == "load" {
            let outcome = st.session.complete_load(ticket, HtmlBitmap::new(image));
            if outcome == LoadOutcome::Installed {
                st.redraw();
            }
            outcome == LoadOutcome::Installed
        } else {
            // Failures of superseded loads are not reported
            if let Some(err) = st.session.fail_load(ticket, DECODE_FAILED_REASON) {
                st.alert(&err.to_string());
            }
            false
        }
    };
    if installed {
        notify_zoom_change(state);
    }
}

fn dispatch(state: &SharedState, canvas: &HtmlCanvasElement, kind: &str, event: &Event) {
    let Some(input) = translate(kind, event, canvas) else {
        return;
    };

    let response = {
        let mut st = state.borrow_mut();
        let response = st.session.handle_input(input);
        if response.redraw {
            st.redraw();
        }
        response
    };

    if response.consumed {
        event.prevent_default();
    }
    if response.redraw && matches!(input, InputEvent::Wheel { .. }) {
        notify_zoom_change(state);
    }
}

/// Call the zoom callback outside of any state borrow so it may call back
/// into the tool.
fn notify_zoom_change(state: &SharedState) {
    let (callback, percent) = {
        let st = state.borrow();
        (st.on_zoom_change.clone(), st.session.zoom_percent())
    };
    if let Some(callback) = callback {
        if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from(percent)) {
            warn!("Zoom callback failed: {}", js_error_message(&e));
        }
    }
}

fn translate(kind: &str, event: &Event, canvas: &HtmlCanvasElement) -> Option<InputEvent> {
    match kind {
        "mousedown" => mouse_point(event, canvas).map(InputEvent::Press),
        "mousemove" => mouse_point(event, canvas).map(InputEvent::Move),
        "touchstart" => touch_point(event, canvas).map(InputEvent::Press),
        "touchmove" => touch_point(event, canvas).map(InputEvent::Move),
        "mouseup" | "mouseleave" | "touchend" | "touchcancel" => Some(InputEvent::Release),
        "wheel" => event
            .dyn_ref::<WheelEvent>()
            .map(|wheel| InputEvent::Wheel {
                delta_y: wheel.delta_y(),
            }),
        _ => None,
    }
}

fn mouse_point(event: &Event, canvas: &HtmlCanvasElement) -> Option<Point> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some(canvas_point(canvas, mouse.client_x() as f64, mouse.client_y() as f64))
}

/// Position of the first touch point.
fn touch_point(event: &Event, canvas: &HtmlCanvasElement) -> Option<Point> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some(canvas_point(canvas, touch.client_x() as f64, touch.client_y() as f64))
}

fn canvas_point(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> Point {
    let rect = canvas.get_bounding_client_rect();
    client_to_canvas(
        Point::new(client_x, client_y),
        Point::new(rect.left(), rect.top()),
        (rect.width(), rect.height()),
        (canvas.width() as f64, canvas.height() as f64),
    )
}

/// Map client (CSS pixel) coordinates into canvas pixels for a canvas whose
/// bounding box starts at `origin` with CSS size `css_size`.
fn client_to_canvas(
    client: Point,
    origin: Point,
    css_size: (f64, f64),
    canvas_size: (f64, f64),
) -> Point {
    let ratio = |canvas: f64, css: f64| if css > 0.0 { canvas / css } else { 1.0 };
    Point::new(
        (client.x - origin.x) * ratio(canvas_size.0, css_size.0),
        (client.y - origin.y) * ratio(canvas_size.1, css_size.1),
    )
}

/// Offer `artifact` as a file download.
fn download(document: &Document, artifact: &ExportArtifact) -> Result<(), JsValue> {
    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(artifact.bytes.as_slice()));
    let options = BlobPropertyBag::new();
    options.set_type(artifact.media_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;

    let url = Url::create_object_url_with_blob(&blob)?;
    let anchor = document.create_element("a")?.dyn_into::<HtmlAnchorElement>()?;
    anchor.set_href(&url);
    anchor.set_download(&artifact.file_name);
    anchor.click();
    Url::revoke_object_url(&url)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_to_canvas_same_size() {
        let p = client_to_canvas(
            Point::new(110.0, 60.0),
            Point::new(10.0, 20.0),
            (320.0, 320.0),
            (320.0, 320.0),
        );
        assert_eq!(p, Point::new(100.0, 40.0));
    }

    #[test]
    fn test_client_to_canvas_scales_css_pixels() {
        // 320px canvas displayed at 256 CSS pixels
        let p = client_to_canvas(
            Point::new(128.0, 256.0),
            Point::ORIGIN,
            (256.0, 256.0),
            (320.0, 320.0),
        );
        assert_eq!(p, Point::new(160.0, 320.0));
    }

    #[test]
    fn test_client_to_canvas_hidden_canvas() {
        let p = client_to_canvas(Point::new(5.0, 7.0), Point::ORIGIN, (0.0, 0.0), (320.0, 320.0));
        assert_eq!(p, Point::new(5.0, 7.0));
    }

    #[test]
    fn test_listened_events_cover_mouse_touch_and_wheel() {
        for kind in ["mousedown", "mouseleave", "touchstart", "touchend", "wheel"] {
            assert!(POINTER_EVENTS.contains(&kind), "{kind} is not listened to");
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;
    use web_sys::WheelEventInit;

    wasm_bindgen_test_configure!(run_in_browser);

    fn canvas() -> HtmlCanvasElement {
        let document = web_sys::window().unwrap().document().unwrap();
        document.create_element("canvas").unwrap().dyn_into().unwrap()
    }

    #[wasm_bindgen_test]
    fn test_new_sizes_canvas() {
        let canvas = canvas();
        let tool = CircleCropTool::new(canvas.clone(), JsValue::UNDEFINED).unwrap();
        assert_eq!(canvas.width(), 320);
        assert_eq!(canvas.height(), 320);
        assert!(!tool.has_image());
        assert_eq!(tool.zoom_percent(), 100);
    }

    #[wasm_bindgen_test]
    fn test_invalid_config_rejected() {
        let config = js_sys::JSON::parse(r#"{"preview_size": 0}"#).unwrap();
        assert!(CircleCropTool::new(canvas(), config).is_err());
    }

    #[wasm_bindgen_test]
    fn test_set_scale_ignored_without_image() {
        let tool = CircleCropTool::new(canvas(), JsValue::UNDEFINED).unwrap();
        tool.set_scale(1.5);
        assert_eq!(tool.scale(), 1.0);
        assert_eq!(tool.zoom_percent(), 100);
    }

    #[wasm_bindgen_test]
    fn test_wheel_without_image_is_not_cancelled() {
        let canvas = canvas();
        let _tool = CircleCropTool::new(canvas.clone(), JsValue::UNDEFINED).unwrap();
        let init = WheelEventInit::new();
        init.set_delta_y(-100.0);
        init.set_cancelable(true);
        let event = WheelEvent::new_with_event_init_dict("wheel", &init).unwrap();
        assert!(canvas.dispatch_event(&event).unwrap());
    }

    #[wasm_bindgen_test]
    fn test_destroy_is_idempotent() {
        let mut tool = CircleCropTool::new(canvas(), JsValue::UNDEFINED).unwrap();
        tool.destroy();
        tool.destroy();
        assert!(!tool.has_image());
    }
}

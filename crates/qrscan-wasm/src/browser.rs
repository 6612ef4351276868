//! Browser image source and canvas surface.
//!
//! Files are loaded through object URLs into `<img>` elements; the element's
//! `onload`/`onerror` callbacks settle a single `Promise` that the normalizer
//! awaits. Rasterization goes through a reused `<canvas>`.

use js_sys::Promise;
use qrscan_core::{FilterType, ImageSource, NormalizeError, RasterSurface, SourceImage};
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, File, HtmlCanvasElement, HtmlImageElement, Url};

use crate::types::js_error_message;

/// An object URL created for a file; revoked by [`BrowserImageSource::release`].
#[derive(Debug)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A fully loaded `<img>` element.
#[derive(Debug)]
pub struct LoadedImage(HtmlImageElement);

impl SourceImage for LoadedImage {
    fn natural_dimensions(&self) -> (u32, u32) {
        (self.0.natural_width(), self.0.natural_height())
    }
}

/// Loads `File`s with the browser's own image decoders.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserImageSource;

impl ImageSource for BrowserImageSource {
    type Blob = File;
    type Handle = ObjectUrl;
    type Image = LoadedImage;

    fn acquire(&self, blob: &File) -> Result<ObjectUrl, NormalizeError> {
        Url::create_object_url_with_blob(blob)
            .map(ObjectUrl)
            .map_err(|e| {
                warn!(error = %js_error_message(&e), "could not create object URL");
                NormalizeError::Load
            })
    }

    async fn load(&self, handle: &ObjectUrl) -> Result<LoadedImage, NormalizeError> {
        let image = HtmlImageElement::new().map_err(|_| NormalizeError::Load)?;

        let settled = Promise::new(&mut |resolve, reject| {
            image.set_onload(Some(&resolve));
            image.set_onerror(Some(&reject));
        });
        image.set_src(handle.as_str());

        let result = JsFuture::from(settled).await;
        image.set_onload(None);
        image.set_onerror(None);

        result
            .map(|_| LoadedImage(image))
            .map_err(|_| NormalizeError::Load)
    }

    fn release(&self, handle: &ObjectUrl) {
        if let Err(e) = Url::revoke_object_url(handle.as_str()) {
            warn!(error = %js_error_message(&e), "could not revoke object URL");
        }
    }
}

/// Offscreen `<canvas>` used as the raster surface.
///
/// The canvas only knows smoothed or unsmoothed scaling: `Nearest` turns
/// image smoothing off, any other filter leaves it to the browser.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    smoothing: bool,
}

impl CanvasSurface {
    /// Wrap a canvas, acquiring its 2D context.
    pub fn new(canvas: HtmlCanvasElement, filter: FilterType) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2D canvas context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            canvas,
            context,
            smoothing: filter != FilterType::Nearest,
        })
    }

    /// Whether draws are smoothed.
    pub fn smoothing(&self) -> bool {
        self.smoothing
    }
}

impl RasterSurface<LoadedImage> for CanvasSurface {
    fn draw(&mut self, image: &LoadedImage, width: u32, height: u32) -> Result<(), String> {
        // Resizing resets the context state, smoothing included.
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.context.set_image_smoothing_enabled(self.smoothing);
        self.context
            .draw_image_with_html_image_element_and_dw_and_dh(
                &image.0,
                0.0,
                0.0,
                width as f64,
                height as f64,
            )
            .map_err(|e| js_error_message(&e))
    }

    fn read_rgba(&self) -> Result<Vec<u8>, String> {
        let data = self
            .context
            .get_image_data(
                0.0,
                0.0,
                self.canvas.width() as f64,
                self.canvas.height() as f64,
            )
            .map_err(|e| js_error_message(&e))?;
        Ok(data.data().0)
    }
}

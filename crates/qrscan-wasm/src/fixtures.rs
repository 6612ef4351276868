//! Browser fixtures for the wasm tests.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsCast;
use web_sys::{File, FilePropertyBag, HtmlCanvasElement};

/// A detached element of the given tag.
pub(crate) fn element<T: JsCast>(tag: &str) -> T {
    web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .create_element(tag)
        .unwrap()
        .dyn_into::<T>()
        .unwrap()
}

pub(crate) fn canvas() -> HtmlCanvasElement {
    element("canvas")
}

/// A `File` holding `bytes` with a declared MIME type.
pub(crate) fn file(bytes: &[u8], name: &str, mime_type: &str) -> File {
    let parts = Array::of1(&Uint8Array::from(bytes));
    let options = FilePropertyBag::new();
    options.set_type(mime_type);
    File::new_with_u8_array_sequence_and_options(&parts, name, &options).unwrap()
}

fn png(page: image::GrayImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(page)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub(crate) fn blank_png(side: u32) -> Vec<u8> {
    png(image::GrayImage::from_pixel(side, side, Luma([255])))
}

/// A QR symbol centered on a white square page.
pub(crate) fn qr_png(payload: &str, side: u32) -> Vec<u8> {
    let symbol = qrcode::QrCode::new(payload.as_bytes())
        .unwrap()
        .render::<Luma<u8>>()
        .min_dimensions(side / 2, side / 2)
        .build();
    let mut page = image::GrayImage::from_pixel(side, side, Luma([255]));
    let offset = side.saturating_sub(symbol.width()) / 2;
    image::imageops::overlay(&mut page, &symbol, offset as i64, offset as i64);
    png(page)
}

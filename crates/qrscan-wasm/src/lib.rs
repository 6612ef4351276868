//! QR Scan WASM - WebAssembly bindings for the QR scan pipeline
//!
//! This crate runs the qrscan-core pipeline in a browser page, using the
//! browser's own image decoders and a `<canvas>` for rasterization.
//!
//! # Module Structure
//!
//! - `browser` - Object-URL image source and canvas raster surface
//! - `dom` - File input and drop zone adapter targets
//! - `scanner` - The `QrScanner` class
//! - `types` - Conversions between JavaScript values and core types
//!
//! # Usage
//!
//! ```typescript
//! import init, { QrScanner } from '@qrscan/wasm';
//!
//! await init();
//!
//! const scanner = new QrScanner(document.createElement('canvas'), renderView);
//! scanner.attach(fileInput, container);
//! ```

use wasm_bindgen::prelude::*;

mod browser;
mod dom;
mod scanner;
mod types;

#[cfg(all(test, target_arch = "wasm32"))]
mod fixtures;

pub use browser::{BrowserImageSource, CanvasSurface, LoadedImage, ObjectUrl};
pub use dom::{DropTarget, InputPicker, DRAG_ACTIVE_CLASS};
pub use scanner::QrScanner;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

//! QR Scan Core - image ingestion pipeline for QR scanning
//!
//! This crate takes a user-supplied image file, validates it, normalizes it
//! into a bounded RGBA raster, and hands the raster to a QR decoder. The
//! result drives a small state machine that a UI renders.
//!
//! # Module Structure
//!
//! - `validate` - MIME type and size checks
//! - `normalize` - Asynchronous loading, downscaling and pixel readback
//! - `decoder` - The decoder seam and the `rqrr` implementation
//! - `context` - Scan state, subscribers and the loading guard
//! - `orchestrator` - Single-flight sequencing of a scan
//! - `ui` - Pure rendering of scan state and output sanitization
//! - `input` - File picker and drag-and-drop adapters
//!
//! # Usage
//!
//! ```ignore
//! use qrscan_core::{
//!     MemoryImageSource, PixelSurface, RqrrDecoder, ScanConfig, ScanOrchestrator, ScanRequest,
//! };
//!
//! let config = ScanConfig::default();
//! let surface = PixelSurface::new(config.filter);
//! let scanner = ScanOrchestrator::new(config, MemoryImageSource::new(), surface, RqrrDecoder);
//!
//! let bytes = std::fs::read("code.png").unwrap();
//! let outcome = pollster::block_on(scanner.scan(ScanRequest::from_bytes(bytes, "image/png")));
//! ```

pub mod config;
pub mod context;
pub mod decoder;
pub mod input;
pub mod normalize;
pub mod orchestrator;
pub mod types;
pub mod ui;
pub mod validate;

pub use config::{FilterType, ScanConfig};
pub use context::{LoadingGuard, ScanBusy, ScanContext};
pub use decoder::{DecodedSymbol, QrDecoder, RqrrDecoder};
pub use input::{DropZone, DropZoneAdapter, EventDisposition, FilePicker, FilePickerAdapter};
pub use normalize::{
    ImageNormalizer, ImageSource, MemoryImageSource, NormalizeError, PixelSurface, RasterSurface,
    SourceImage,
};
pub use orchestrator::{ScanEntry, ScanOrchestrator};
pub use types::{NormalizedRaster, ScanOutcome, ScanRequest, ScanState};
pub use ui::{render, sanitize, Presenter, RenderInstruction, UiStateMachine, View};
pub use validate::{FileValidator, ValidationError};

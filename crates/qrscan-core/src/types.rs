//! Core types shared by every stage of a scan.

use serde::{Deserialize, Serialize};

/// Message shown when a valid raster carries no recognizable symbol.
pub const NOT_FOUND_MESSAGE: &str = "No QR code found in this image";

/// Message shown when the platform could not decode the image.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load image";

/// A file handed to the pipeline by an input adapter.
///
/// `B` is the blob type of the platform: raw bytes natively, a browser `File`
/// in the WASM bindings. The request is never mutated after creation.
#[derive(Debug, Clone)]
pub struct ScanRequest<B = Vec<u8>> {
    /// The file contents (or a platform handle to them).
    pub source: B,
    /// MIME type reported by the platform, e.g. `image/png`.
    pub declared_mime_type: String,
    /// Size of the file in bytes.
    pub byte_size: u64,
}

impl<B> ScanRequest<B> {
    pub fn new(source: B, declared_mime_type: impl Into<String>, byte_size: u64) -> Self {
        Self {
            source,
            declared_mime_type: declared_mime_type.into(),
            byte_size,
        }
    }
}

impl ScanRequest<Vec<u8>> {
    /// Create a request from in-memory bytes, taking the size from the buffer.
    pub fn from_bytes(bytes: Vec<u8>, declared_mime_type: impl Into<String>) -> Self {
        let byte_size = bytes.len() as u64;
        Self::new(bytes, declared_mime_type, byte_size)
    }
}

/// RGBA pixels read back from the raster surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRaster {
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length is width * height * 4.
    pub pixels: Vec<u8>,
}

impl NormalizedRaster {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Expected buffer length for the given dimensions.
    pub fn expected_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 4
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Terminal result of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanOutcome {
    /// The decoder recognized a symbol.
    Success { payload: String },
    /// The raster was valid but held no symbol.
    NotFound,
    /// Validation, rasterization or the decoder failed.
    ProcessingError { reason: String },
    /// The image could not be decoded by the platform.
    LoadError,
}

impl ScanOutcome {
    /// Whether the scan produced a payload.
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Success { .. })
    }

    /// Human-readable failure reason, `None` on success.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            ScanOutcome::Success { .. } => None,
            ScanOutcome::NotFound => Some(NOT_FOUND_MESSAGE),
            ScanOutcome::ProcessingError { reason } => Some(reason),
            ScanOutcome::LoadError => Some(LOAD_ERROR_MESSAGE),
        }
    }
}

/// Lifecycle of the scan context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanState {
    /// Nothing scanned yet, or the last scan was abandoned.
    #[default]
    Idle,
    /// A scan is in flight; input is disabled.
    Loading,
    /// The last scan finished with this outcome.
    Settled(ScanOutcome),
}

impl ScanState {
    /// True while a scan is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, ScanState::Loading)
    }

    /// Input surfaces are enabled in every state except Loading.
    pub fn input_enabled(&self) -> bool {
        !self.is_loading()
    }
}

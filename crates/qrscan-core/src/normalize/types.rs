//! Seams and errors for image normalization.

use std::future::Future;

use thiserror::Error;

/// Why an accepted file could not be turned into a raster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The platform could not decode the image (malformed data, unsupported codec).
    #[error("Failed to load image")]
    Load,

    /// Drawing onto the surface or reading pixels back failed.
    #[error("Error processing image: {0}")]
    Processing(String),
}

/// A decoded image whose natural size is known.
pub trait SourceImage {
    /// Width and height before any scaling.
    fn natural_dimensions(&self) -> (u32, u32);
}

/// Platform image loading.
///
/// Loading goes through a transient handle (an object URL in a browser).
/// [`ImageSource::release`] must be called exactly once per acquired handle;
/// the normalizer does this through a scoped guard.
pub trait ImageSource {
    /// The file type this source reads from.
    type Blob;
    /// Revocable reference to a blob's bytes.
    type Handle;
    /// Loaded image, ready to be drawn.
    type Image: SourceImage;

    /// Obtain a transient handle for the blob.
    fn acquire(&self, blob: &Self::Blob) -> Result<Self::Handle, NormalizeError>;

    /// Decode the image behind a handle. Resolves once the platform reports
    /// success or failure.
    fn load(&self, handle: &Self::Handle)
        -> impl Future<Output = Result<Self::Image, NormalizeError>>;

    /// Give the handle back to the platform.
    fn release(&self, handle: &Self::Handle);
}

/// Offscreen raster that images are drawn onto and read back from.
///
/// The surface is reused between scans; `draw` resizes it every time.
pub trait RasterSurface<I> {
    /// Resize the surface to `width` x `height` and draw `image` scaled to fill it.
    fn draw(&mut self, image: &I, width: u32, height: u32) -> Result<(), String>;

    /// Read back the full surface as RGBA bytes.
    fn read_rgba(&self) -> Result<Vec<u8>, String>;
}

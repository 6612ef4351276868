//! Image normalization for the scan pipeline.
//!
//! This module turns an accepted file into a bounded RGBA raster:
//! - Acquire a transient handle to the file and load it asynchronously
//! - Release the handle as soon as loading settles
//! - Fit the natural size within the maximum edge (downscale only)
//! - Draw onto the reused raster surface and read the pixels back
//!
//! # Architecture
//!
//! Platform specifics sit behind two traits. [`ImageSource`] owns handles and
//! loading; [`RasterSurface`] owns drawing and readback. The native pair is
//! [`MemoryImageSource`] + [`PixelSurface`]; the WASM bindings supply an
//! object-URL/`<img>` source and a `<canvas>` surface.

mod fit;
mod handle;
mod memory;
mod surface;
mod types;

use std::cell::RefCell;

use tracing::debug;

use crate::types::NormalizedRaster;
use handle::HandleGuard;

pub use fit::fit_dimensions;
pub use memory::{LocalHandle, MemoryImageSource};
pub use surface::PixelSurface;
pub use types::{ImageSource, NormalizeError, RasterSurface, SourceImage};

/// Loads images and produces bounded RGBA rasters.
pub struct ImageNormalizer<S, R> {
    source: S,
    surface: RefCell<R>,
    max_dimension: u32,
}

impl<S, R> ImageNormalizer<S, R>
where
    S: ImageSource,
    R: RasterSurface<S::Image>,
{
    pub fn new(source: S, surface: R, max_dimension: u32) -> Self {
        Self {
            source,
            surface: RefCell::new(surface),
            max_dimension,
        }
    }

    /// The image source, for inspecting platform state.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Maximum raster edge.
    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Load `blob` and read it back as a raster no larger than the maximum edge.
    ///
    /// # Errors
    ///
    /// Returns `NormalizeError::Load` if the image cannot be decoded.
    /// Returns `NormalizeError::Processing` if drawing or readback fails.
    pub async fn normalize(&self, blob: &S::Blob) -> Result<NormalizedRaster, NormalizeError> {
        let handle = self.source.acquire(blob)?;
        let loaded = {
            let guard = HandleGuard::new(&self.source, handle);
            self.source.load(guard.handle()).await
        };
        let image = loaded?;

        let (natural_width, natural_height) = image.natural_dimensions();
        let (width, height) = fit_dimensions(natural_width, natural_height, self.max_dimension);
        if (width, height) != (natural_width, natural_height) {
            debug!(
                natural_width,
                natural_height,
                width,
                height,
                "downscaling image to fit raster"
            );
        }

        let mut surface = self
            .surface
            .try_borrow_mut()
            .map_err(|_| NormalizeError::Processing("raster surface is in use".to_string()))?;
        surface
            .draw(&image, width, height)
            .map_err(NormalizeError::Processing)?;
        let pixels = surface.read_rgba().map_err(NormalizeError::Processing)?;

        let expected = NormalizedRaster::expected_len(width, height);
        if pixels.len() != expected {
            return Err(NormalizeError::Processing(format!(
                "expected {} bytes of pixel data, got {}",
                expected,
                pixels.len()
            )));
        }

        Ok(NormalizedRaster::new(width, height, pixels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterType;
    use image::{DynamicImage, ImageFormat};
    use std::cell::Cell;
    use std::future::Future;
    use std::io::Cursor;
    use std::pin::pin;
    use std::task::{Context, Waker};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([255, 255, 255]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn native(max_dimension: u32) -> ImageNormalizer<MemoryImageSource, PixelSurface> {
        ImageNormalizer::new(
            MemoryImageSource::new(),
            PixelSurface::new(FilterType::Nearest),
            max_dimension,
        )
    }

    /// Source whose images report a fixed size without any pixel data.
    #[derive(Default)]
    struct StubSource {
        acquired: Cell<usize>,
        released: Cell<usize>,
        hang: bool,
    }

    struct StubImage(u32, u32);

    impl SourceImage for StubImage {
        fn natural_dimensions(&self) -> (u32, u32) {
            (self.0, self.1)
        }
    }

    impl ImageSource for StubSource {
        type Blob = Option<(u32, u32)>;
        type Handle = Option<(u32, u32)>;
        type Image = StubImage;

        fn acquire(&self, blob: &Self::Blob) -> Result<Self::Handle, NormalizeError> {
            self.acquired.set(self.acquired.get() + 1);
            Ok(*blob)
        }

        async fn load(&self, handle: &Self::Handle) -> Result<StubImage, NormalizeError> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            handle
                .map(|(w, h)| StubImage(w, h))
                .ok_or(NormalizeError::Load)
        }

        fn release(&self, _handle: &Self::Handle) {
            self.released.set(self.released.get() + 1);
        }
    }

    /// Surface that fills with a constant and can be told to fail readback.
    #[derive(Default)]
    struct StubSurface {
        size: (u32, u32),
        tainted: bool,
    }

    impl RasterSurface<StubImage> for StubSurface {
        fn draw(&mut self, _image: &StubImage, width: u32, height: u32) -> Result<(), String> {
            self.size = (width, height);
            Ok(())
        }

        fn read_rgba(&self) -> Result<Vec<u8>, String> {
            if self.tainted {
                return Err("The canvas has been tainted by cross-origin data.".to_string());
            }
            if self.size.0 == 0 || self.size.1 == 0 {
                return Err("The source width is 0.".to_string());
            }
            Ok(vec![0u8; self.size.0 as usize * self.size.1 as usize * 4])
        }
    }

    #[test]
    fn test_small_image_keeps_natural_size() {
        let normalizer = native(2048);
        let raster = pollster::block_on(normalizer.normalize(&png(300, 200))).unwrap();

        assert_eq!((raster.width, raster.height), (300, 200));
        assert_eq!(raster.pixels.len(), 300 * 200 * 4);
        assert_eq!(&raster.pixels[0..4], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let normalizer = native(64);
        let raster = pollster::block_on(normalizer.normalize(&png(200, 100))).unwrap();

        assert_eq!((raster.width, raster.height), (64, 32));
        assert_eq!(raster.pixels.len(), 64 * 32 * 4);
    }

    #[test]
    fn test_handle_released_after_success() {
        let normalizer = native(2048);
        pollster::block_on(normalizer.normalize(&png(10, 10))).unwrap();
        assert_eq!(normalizer.source().live_handles(), 0);
    }

    #[test]
    fn test_load_failure_releases_handle() {
        let normalizer = native(2048);
        let result = pollster::block_on(normalizer.normalize(&b"not an image".to_vec()));

        assert_eq!(result.unwrap_err(), NormalizeError::Load);
        assert_eq!(normalizer.source().live_handles(), 0);
    }

    #[test]
    fn test_large_stub_dimensions() {
        let normalizer = ImageNormalizer::new(StubSource::default(), StubSurface::default(), 2048);
        let raster = pollster::block_on(normalizer.normalize(&Some((4000, 3000)))).unwrap();

        assert_eq!((raster.width, raster.height), (2048, 1536));
        assert_eq!(normalizer.source().acquired.get(), 1);
        assert_eq!(normalizer.source().released.get(), 1);
    }

    #[test]
    fn test_zero_sized_image_is_processing_error() {
        let normalizer = ImageNormalizer::new(StubSource::default(), StubSurface::default(), 2048);
        let result = pollster::block_on(normalizer.normalize(&Some((0, 0))));

        assert_eq!(
            result.unwrap_err(),
            NormalizeError::Processing("The source width is 0.".to_string())
        );
    }

    #[test]
    fn test_readback_failure_is_processing_error() {
        let surface = StubSurface {
            tainted: true,
            ..Default::default()
        };
        let normalizer = ImageNormalizer::new(StubSource::default(), surface, 2048);
        let err = pollster::block_on(normalizer.normalize(&Some((10, 10)))).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error processing image: The canvas has been tainted by cross-origin data."
        );
        assert_eq!(normalizer.source().released.get(), 1);
    }

    #[test]
    fn test_stub_load_failure_releases_once() {
        let normalizer = ImageNormalizer::new(StubSource::default(), StubSurface::default(), 2048);
        let result = pollster::block_on(normalizer.normalize(&None));

        assert_eq!(result.unwrap_err(), NormalizeError::Load);
        assert_eq!(normalizer.source().acquired.get(), 1);
        assert_eq!(normalizer.source().released.get(), 1);
    }

    #[test]
    fn test_dropped_load_releases_handle() {
        let source = StubSource {
            hang: true,
            ..Default::default()
        };
        let normalizer = ImageNormalizer::new(source, StubSurface::default(), 2048);

        {
            let blob = Some((10, 10));
            let mut future = pin!(normalizer.normalize(&blob));
            let mut cx = Context::from_waker(Waker::noop());
            assert!(future.as_mut().poll(&mut cx).is_pending());
            assert_eq!(normalizer.source().released.get(), 0);
        }

        assert_eq!(normalizer.source().released.get(), 1);
    }
}

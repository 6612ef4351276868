//! Native offscreen raster surface.

use image::{imageops, DynamicImage, RgbaImage};

use super::RasterSurface;
use crate::config::FilterType;

/// RGBA pixel buffer that images are scaled onto.
///
/// Mirrors a reused `<canvas>`: each draw replaces the contents and the size,
/// so nothing but the allocation survives from one scan to the next.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    filter: FilterType,
    buffer: RgbaImage,
}

impl PixelSurface {
    pub fn new(filter: FilterType) -> Self {
        Self {
            filter,
            buffer: RgbaImage::new(0, 0),
        }
    }

    /// Current surface size.
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }
}

impl Default for PixelSurface {
    fn default() -> Self {
        Self::new(FilterType::default())
    }
}

impl RasterSurface<DynamicImage> for PixelSurface {
    fn draw(&mut self, image: &DynamicImage, width: u32, height: u32) -> Result<(), String> {
        if width == 0 || height == 0 {
            return Err(format!(
                "surface size {}x{} has no pixels to draw into",
                width, height
            ));
        }

        let rgba = image.to_rgba8();
        self.buffer = if rgba.dimensions() == (width, height) {
            rgba
        } else {
            imageops::resize(&rgba, width, height, self.filter.to_image_filter())
        };
        Ok(())
    }

    fn read_rgba(&self) -> Result<Vec<u8>, String> {
        let (width, height) = self.buffer.dimensions();
        if width == 0 || height == 0 {
            return Err("surface is empty".to_string());
        }
        Ok(self.buffer.as_raw().clone())
    }
}

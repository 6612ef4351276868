//! Native image source: decodes in-memory bytes with the `image` crate.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Cursor;
use std::rc::Rc;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};
use tracing::debug;

use super::{ImageSource, NormalizeError, SourceImage};

/// Transient reference to bytes registered with a [`MemoryImageSource`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct LocalHandle(u64);

/// Image source for byte buffers.
///
/// Acquiring a handle registers a copy of the bytes in a handle table, the
/// native counterpart of a browser object URL. Released handles drop their
/// bytes; [`MemoryImageSource::live_handles`] reports how many are outstanding.
///
/// The container format is sniffed from the bytes, not taken from the declared
/// MIME type, and the EXIF orientation tag is applied after decoding.
#[derive(Debug, Default)]
pub struct MemoryImageSource {
    next_id: Cell<u64>,
    live: RefCell<HashMap<u64, Rc<[u8]>>>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles ever acquired.
    pub fn handles_issued(&self) -> u64 {
        self.next_id.get()
    }

    /// Number of handles acquired but not yet released.
    pub fn live_handles(&self) -> usize {
        self.live.borrow().len()
    }
}

impl ImageSource for MemoryImageSource {
    type Blob = Vec<u8>;
    type Handle = LocalHandle;
    type Image = DynamicImage;

    fn acquire(&self, blob: &Vec<u8>) -> Result<LocalHandle, NormalizeError> {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        self.live.borrow_mut().insert(id, Rc::from(blob.as_slice()));
        Ok(LocalHandle(id))
    }

    async fn load(&self, handle: &LocalHandle) -> Result<DynamicImage, NormalizeError> {
        let bytes = self
            .live
            .borrow()
            .get(&handle.0)
            .cloned()
            .ok_or(NormalizeError::Load)?;

        decode_oriented(&bytes)
    }

    fn release(&self, handle: &LocalHandle) {
        self.live.borrow_mut().remove(&handle.0);
    }
}

impl SourceImage for DynamicImage {
    fn natural_dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

/// Decode any supported container and apply its EXIF orientation.
fn decode_oriented(bytes: &[u8]) -> Result<DynamicImage, NormalizeError> {
    let tag = exif_orientation(bytes);

    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| {
            debug!(error = %e, "could not sniff image format");
            NormalizeError::Load
        })?
        .decode()
        .map_err(|e| {
            debug!(error = %e, "image decode failed");
            NormalizeError::Load
        })?;

    if tag != 1 {
        debug!(tag, "applying EXIF orientation");
    }
    Ok(upright(img, tag))
}

/// The EXIF orientation tag (1-8) of a container; 1 when there is none.
fn exif_orientation(bytes: &[u8]) -> u32 {
    Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .unwrap_or(1)
}

/// Turn a decoded image upright for an orientation tag, the way a browser
/// honours `image-orientation: from-image`. Unknown tags are left alone.
fn upright(img: DynamicImage, tag: u32) -> DynamicImage {
    match tag {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        // Mirrored across the main diagonal
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        // Mirrored across the anti-diagonal
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([200, 100, 50]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_load_png() {
        let source = MemoryImageSource::new();
        let handle = source.acquire(&encode(30, 20, ImageFormat::Png)).unwrap();

        let img = pollster::block_on(source.load(&handle)).unwrap();
        assert_eq!(img.natural_dimensions(), (30, 20));

        source.release(&handle);
        assert_eq!(source.live_handles(), 0);
    }

    #[test]
    fn test_load_jpeg() {
        let source = MemoryImageSource::new();
        let handle = source.acquire(&encode(16, 8, ImageFormat::Jpeg)).unwrap();

        let img = pollster::block_on(source.load(&handle)).unwrap();
        assert_eq!(img.natural_dimensions(), (16, 8));
        source.release(&handle);
    }

    #[test]
    fn test_load_garbage_is_load_error() {
        let source = MemoryImageSource::new();
        let handle = source.acquire(&vec![0x00, 0x01, 0x02, 0x03]).unwrap();

        let result = pollster::block_on(source.load(&handle));
        assert_eq!(result.unwrap_err(), NormalizeError::Load);
    }

    #[test]
    fn test_load_released_handle_fails() {
        let source = MemoryImageSource::new();
        let handle = source.acquire(&encode(4, 4, ImageFormat::Png)).unwrap();
        source.release(&handle);

        let result = pollster::block_on(source.load(&handle));
        assert_eq!(result.unwrap_err(), NormalizeError::Load);
    }

    /// Red then green, left to right.
    fn red_green() -> DynamicImage {
        let pixels = vec![255, 0, 0, 255, 0, 255, 0, 255];
        DynamicImage::ImageRgba8(image::RgbaImage::from_raw(2, 1, pixels).unwrap())
    }

    #[test]
    fn test_missing_exif_is_upright() {
        assert_eq!(exif_orientation(&encode(4, 4, ImageFormat::Png)), 1);
        assert_eq!(exif_orientation(&[0x00, 0x01, 0x02]), 1);
        assert_eq!(exif_orientation(&[]), 1);
    }

    #[test]
    fn test_upright_rotation_swaps_dimensions() {
        let img = upright(red_green(), 6);
        assert_eq!(img.natural_dimensions(), (1, 2));
        let img = upright(red_green(), 8);
        assert_eq!(img.natural_dimensions(), (1, 2));
    }

    #[test]
    fn test_upright_mirrors() {
        let mirrored = upright(red_green(), 2).into_rgba8();
        assert_eq!(mirrored.get_pixel(0, 0).0, [0, 255, 0, 255]);

        // Transpose keeps red first; transverse puts green first.
        let transposed = upright(red_green(), 5).into_rgba8();
        assert_eq!(transposed.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(transposed.get_pixel(0, 1).0, [0, 255, 0, 255]);
        let transversed = upright(red_green(), 7).into_rgba8();
        assert_eq!(transversed.get_pixel(0, 0).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_unknown_tag_is_identity() {
        for tag in [0, 1, 9, 255] {
            let same = upright(red_green(), tag).into_rgba8();
            assert_eq!(same.get_pixel(0, 0).0, [255, 0, 0, 255]);
        }
    }

    #[test]
    fn test_handles_are_tracked() {
        let source = MemoryImageSource::new();
        let a = source.acquire(&vec![1]).unwrap();
        let b = source.acquire(&vec![2]).unwrap();
        assert_ne!(a, b);
        assert_eq!(source.handles_issued(), 2);
        assert_eq!(source.live_handles(), 2);

        source.release(&a);
        assert_eq!(source.live_handles(), 1);
        source.release(&b);
        assert_eq!(source.live_handles(), 0);
    }
}

//! QR symbol recognition.
//!
//! The pipeline only depends on [`QrDecoder`]. [`RqrrDecoder`] is the default
//! implementation; tests and hosts can pass any closure with the same shape.

use rqrr::PreparedImage;

/// A recognized symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    /// The decoded text.
    pub payload: String,
}

impl DecodedSymbol {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

/// Finds a QR symbol in an RGBA raster.
pub trait QrDecoder {
    /// `pixels` holds exactly `width * height * 4` interleaved RGBA bytes.
    /// Returns `None` when no symbol is found.
    fn decode(&self, pixels: &[u8], width: u32, height: u32) -> Option<DecodedSymbol>;
}

impl<F> QrDecoder for F
where
    F: Fn(&[u8], u32, u32) -> Option<DecodedSymbol>,
{
    fn decode(&self, pixels: &[u8], width: u32, height: u32) -> Option<DecodedSymbol> {
        self(pixels, width, height)
    }
}

/// Decoder backed by the `rqrr` crate.
///
/// Converts the raster to luma, then returns the first detected grid that
/// decodes cleanly.
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl QrDecoder for RqrrDecoder {
    fn decode(&self, pixels: &[u8], width: u32, height: u32) -> Option<DecodedSymbol> {
        let (w, h) = (width as usize, height as usize);
        if w == 0 || h == 0 || pixels.len() < w * h * 4 {
            return None;
        }

        let grey = rgba_to_luma(pixels, w, h);
        let mut prepared = PreparedImage::prepare_from_greyscale(w, h, |x, y| grey[y * w + x]);

        prepared
            .detect_grids()
            .iter()
            .find_map(|grid| grid.decode().ok())
            .map(|(_, content)| DecodedSymbol::new(content))
    }
}

/// BT.601 luma, with transparent pixels composited onto white.
fn rgba_to_luma(pixels: &[u8], width: usize, height: usize) -> Vec<u8> {
    pixels
        .chunks_exact(4)
        .take(width * height)
        .map(|px| {
            let luma = (299 * px[0] as u32 + 587 * px[1] as u32 + 114 * px[2] as u32) / 1000;
            let alpha = px[3] as u32;
            ((luma * alpha + 255 * (255 - alpha)) / 255) as u8
        })
        .collect()
}

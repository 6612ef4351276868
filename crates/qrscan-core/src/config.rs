//! Scan configuration.

use serde::{Deserialize, Serialize};

/// Longest raster edge handed to the decoder.
pub const DEFAULT_MAX_DIMENSION: u32 = 2048;

/// Largest accepted upload (10 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// MIME types accepted by default.
pub const DEFAULT_ACCEPTED_MIME_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Filter type used when downscaling onto the raster surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (what a 2D canvas does by default).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Limits and tuning for a scan pipeline.
///
/// Missing fields take their defaults when deserialized, so a host can pass a
/// partial object (for example `{ "max_dimension": 1024 }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Declared MIME types that pass validation (exact match).
    pub accepted_mime_types: Vec<String>,
    /// Files strictly larger than this many bytes are rejected.
    pub max_file_bytes: u64,
    /// Neither raster edge may exceed this.
    pub max_dimension: u32,
    /// Interpolation used when the image has to be scaled down. A browser
    /// canvas can only honour `Nearest` (smoothing off) versus the rest.
    pub filter: FilterType,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            accepted_mime_types: DEFAULT_ACCEPTED_MIME_TYPES
                .iter()
                .map(|mime| mime.to_string())
                .collect(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
            filter: FilterType::default(),
        }
    }
}

impl ScanConfig {
    /// Create a config with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a declared MIME type is in the accepted set.
    pub fn accepts(&self, mime_type: &str) -> bool {
        self.accepted_mime_types.iter().any(|m| m == mime_type)
    }
}

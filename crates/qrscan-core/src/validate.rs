//! Metadata checks run before any image work.

use thiserror::Error;

use crate::config::ScanConfig;
use crate::types::ScanRequest;

/// Why a file was rejected before loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The declared MIME type is not in the accepted set.
    #[error("Please select a valid image file ({accepted})")]
    InvalidType {
        /// Human-readable list of accepted formats, e.g. "JPEG, PNG, GIF, or WebP".
        accepted: String,
    },

    /// The file exceeds the size ceiling.
    #[error("File size must be less than {limit}")]
    TooLarge {
        /// Human-readable limit, e.g. "10MB".
        limit: String,
    },
}

/// Rejects unsupported or oversized files.
#[derive(Debug, Clone)]
pub struct FileValidator {
    config: ScanConfig,
}

impl FileValidator {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Check a request's declared type, then its size.
    ///
    /// Performs no I/O; the blob is never touched.
    pub fn validate<B>(&self, request: &ScanRequest<B>) -> Result<(), ValidationError> {
        if !self.config.accepts(&request.declared_mime_type) {
            return Err(ValidationError::InvalidType {
                accepted: describe_formats(&self.config.accepted_mime_types),
            });
        }

        if request.byte_size > self.config.max_file_bytes {
            return Err(ValidationError::TooLarge {
                limit: describe_size(self.config.max_file_bytes),
            });
        }

        Ok(())
    }
}

/// Short label for a MIME type ("image/jpeg" -> "JPEG").
fn format_label(mime_type: &str) -> String {
    match mime_type {
        "image/jpeg" => "JPEG".to_string(),
        "image/png" => "PNG".to_string(),
        "image/gif" => "GIF".to_string(),
        "image/webp" => "WebP".to_string(),
        other => other
            .strip_prefix("image/")
            .unwrap_or(other)
            .to_uppercase(),
    }
}

/// Join format labels as an English list: "A", "A or B", "A, B, or C".
fn describe_formats(mime_types: &[String]) -> String {
    let labels: Vec<String> = mime_types.iter().map(|m| format_label(m)).collect();
    match labels.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} or {}", first, second),
        [rest @ .., last] => format!("{}, or {}", rest.join(", "), last),
    }
}

/// Render a byte ceiling the way users read it ("10MB", "512KB", "100 bytes").
fn describe_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}

//! Conversions between JavaScript values and core types.

use qrscan_core::ScanRequest;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{File, FileList};

/// Best-effort message from a thrown JavaScript value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| "unknown error".to_string())
}

/// `File.size` is a double; anything that is not a finite positive number is 0.
pub(crate) fn byte_size(size: f64) -> u64 {
    if size.is_finite() && size > 0.0 {
        size as u64
    } else {
        0
    }
}

/// Build a scan request from a browser file.
pub(crate) fn request_from_file(file: File) -> ScanRequest<File> {
    let declared_mime_type = file.type_();
    let size = byte_size(file.size());
    ScanRequest::new(file, declared_mime_type, size)
}

/// Requests for every file in a list, in order. A missing list is empty.
pub(crate) fn requests_from_list(files: Option<FileList>) -> Vec<ScanRequest<File>> {
    let Some(files) = files else {
        return Vec::new();
    };
    (0..files.length())
        .filter_map(|index| files.get(index))
        .map(request_from_file)
        .collect()
}

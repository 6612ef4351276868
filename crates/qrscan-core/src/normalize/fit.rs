//! Bounded raster dimensions.

/// Calculate raster dimensions that fit within `max_edge` while preserving aspect ratio.
///
/// Images that already fit are returned unchanged; nothing is ever scaled up.
/// Otherwise the longer edge becomes exactly `max_edge` and the shorter edge is
/// scaled by the same ratio and truncated, the way a canvas truncates a
/// fractional width or height. The shorter edge never drops below 1.
pub fn fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    if width <= max_edge && height <= max_edge {
        return (width, height);
    }

    let max_edge = max_edge.max(1);

    if width >= height {
        // Landscape or square: constrain by width
        let new_height = (height as u64 * max_edge as u64 / width as u64) as u32;
        (max_edge, new_height.max(1))
    } else {
        // Portrait: constrain by height
        let new_width = (width as u64 * max_edge as u64 / height as u64) as u32;
        (new_width.max(1), max_edge)
    }
}

/// Uniform scale factor applied by [`fit_dimensions`]; never above 1.
#[cfg(test)]
fn fit_ratio(width: u32, height: u32, max_edge: u32) -> f64 {
    if width == 0 || height == 0 || (width <= max_edge && height <= max_edge) {
        return 1.0;
    }
    (max_edge as f64 / width as f64).min(max_edge as f64 / height as f64)
}

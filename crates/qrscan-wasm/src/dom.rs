//! DOM elements as input adapter targets.

use qrscan_core::{DropZone, FilePicker};
use tracing::warn;
use web_sys::{HtmlElement, HtmlInputElement};

use crate::types::js_error_message;

/// Class toggled on the drop zone while a drag hovers over it.
pub const DRAG_ACTIVE_CLASS: &str = "drag-over";

/// An `<input type="file">`.
#[derive(Debug, Clone)]
pub struct InputPicker(pub HtmlInputElement);

impl FilePicker for InputPicker {
    fn clear_selection(&self) {
        self.0.set_value("");
    }
}

/// The element files are dropped onto.
#[derive(Debug, Clone)]
pub struct DropTarget(pub HtmlElement);

impl DropZone for DropTarget {
    fn set_drag_active(&self, active: bool) {
        if let Err(e) = self
            .0
            .class_list()
            .toggle_with_force(DRAG_ACTIVE_CLASS, active)
        {
            warn!(error = %js_error_message(&e), "could not toggle drag indicator");
        }
    }
}

//! File picker and drag-and-drop entry points.
//!
//! Both adapters end up in [`FilePickerAdapter::on_change`], which hands the
//! first file to a [`ScanEntry`]. The drop zone never talks to the
//! orchestrator directly.

use crate::context::ScanBusy;
use crate::orchestrator::ScanEntry;
use crate::types::{ScanOutcome, ScanRequest};

/// The platform file input.
pub trait FilePicker {
    /// Reset the selection so picking the same file again fires a change.
    fn clear_selection(&self);
}

/// The platform drop target.
pub trait DropZone {
    /// Toggle the "drag active" visual indicator.
    fn set_drag_active(&self, active: bool);
}

/// What the host should do with the platform event after the adapter ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Suppress the browser default (navigating to the dropped file).
    PreventDefault,
    /// Let the event continue normally.
    Default,
}

/// Result of a file event that carried at least one file.
pub type Submission = Result<ScanOutcome, ScanBusy>;

/// Adapter for file-picker change events.
#[derive(Debug)]
pub struct FilePickerAdapter<P> {
    picker: P,
}

impl<P: FilePicker> FilePickerAdapter<P> {
    pub fn new(picker: P) -> Self {
        Self { picker }
    }

    pub fn picker(&self) -> &P {
        &self.picker
    }

    /// Scan the first selected file.
    ///
    /// Returns `None` without touching the picker when the event carried no
    /// files. Otherwise the selection is cleared once the scan settles.
    pub async fn on_change<E, I>(&self, entry: &E, files: I) -> Option<Submission>
    where
        E: ScanEntry,
        I: IntoIterator<Item = ScanRequest<E::Blob>>,
    {
        let request = files.into_iter().next()?;
        let submission = entry.submit(request).await;
        self.picker.clear_selection();
        Some(submission)
    }
}

/// Adapter for drag-and-drop events on the drop zone.
#[derive(Debug)]
pub struct DropZoneAdapter<Z> {
    zone: Z,
}

impl<Z: DropZone> DropZoneAdapter<Z> {
    pub fn new(zone: Z) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> &Z {
        &self.zone
    }

    /// A drag is hovering over the zone.
    pub fn on_drag_over(&self) -> EventDisposition {
        self.zone.set_drag_active(true);
        EventDisposition::PreventDefault
    }

    /// The drag left the zone.
    pub fn on_drag_leave(&self) -> EventDisposition {
        self.zone.set_drag_active(false);
        EventDisposition::Default
    }

    /// Files were dropped: clear the indicator and route the first file
    /// through the picker's change path.
    ///
    /// The host must prevent the browser default before awaiting; dropping
    /// always resolves to [`EventDisposition::PreventDefault`].
    pub async fn on_drop<P, E, I>(
        &self,
        picker: &FilePickerAdapter<P>,
        entry: &E,
        files: I,
    ) -> Option<Submission>
    where
        P: FilePicker,
        E: ScanEntry,
        I: IntoIterator<Item = ScanRequest<E::Blob>>,
    {
        self.zone.set_drag_active(false);
        picker.on_change(entry, files).await
    }

    /// Disposition for drop events.
    pub fn drop_disposition(&self) -> EventDisposition {
        EventDisposition::PreventDefault
    }
}

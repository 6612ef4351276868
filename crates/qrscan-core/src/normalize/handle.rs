//! Scoped release of transient image handles.

use super::ImageSource;

/// Owns an acquired handle and gives it back to its source when dropped.
///
/// Dropping covers every exit path: a successful load, a failed load, and a
/// load future that is dropped before it resolves.
pub(crate) struct HandleGuard<'a, S: ImageSource> {
    source: &'a S,
    handle: S::Handle,
}

impl<'a, S: ImageSource> HandleGuard<'a, S> {
    pub(crate) fn new(source: &'a S, handle: S::Handle) -> Self {
        Self { source, handle }
    }

    pub(crate) fn handle(&self) -> &S::Handle {
        &self.handle
    }
}

impl<S: ImageSource> Drop for HandleGuard<'_, S> {
    fn drop(&mut self) {
        self.source.release(&self.handle);
    }
}

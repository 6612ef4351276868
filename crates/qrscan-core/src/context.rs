//! Scan state shared between the orchestrator and its observers.

use std::cell::RefCell;
use std::fmt;

use thiserror::Error;

use crate::types::{ScanOutcome, ScanState};

/// Returned when a scan is requested while another is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("A scan is already in progress")]
pub struct ScanBusy;

type Subscriber = Box<dyn Fn(&ScanState)>;

/// Owner of the single [`ScanState`].
///
/// Every transition notifies subscribers in registration order. Subscribers
/// may read the context while being notified but must not subscribe.
#[derive(Default)]
pub struct ScanContext {
    state: RefCell<ScanState>,
    subscribers: RefCell<Vec<Subscriber>>,
}

impl ScanContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ScanState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Whether input surfaces should accept new files.
    pub fn input_enabled(&self) -> bool {
        self.state.borrow().input_enabled()
    }

    /// Register a callback for every future transition.
    pub fn subscribe(&self, subscriber: impl Fn(&ScanState) + 'static) {
        self.subscribers.borrow_mut().push(Box::new(subscriber));
    }

    /// Enter Loading.
    ///
    /// The returned guard restores a non-loading state when it goes away:
    /// [`LoadingGuard::settle`] records an outcome, dropping it unsettled
    /// (early return, panic, cancelled future) goes back to Idle.
    pub fn begin(&self) -> Result<LoadingGuard<'_>, ScanBusy> {
        if self.is_loading() {
            return Err(ScanBusy);
        }
        self.transition(ScanState::Loading);
        Ok(LoadingGuard {
            context: self,
            settled: false,
        })
    }

    fn transition(&self, next: ScanState) {
        *self.state.borrow_mut() = next.clone();
        for subscriber in self.subscribers.borrow().iter() {
            subscriber(&next);
        }
    }
}

impl fmt::Debug for ScanContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanContext")
            .field("state", &*self.state.borrow())
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

/// Proof that the context is Loading; see [`ScanContext::begin`].
#[must_use = "dropping the guard immediately ends the scan"]
pub struct LoadingGuard<'a> {
    context: &'a ScanContext,
    settled: bool,
}

impl LoadingGuard<'_> {
    /// Leave Loading with a terminal outcome.
    pub fn settle(mut self, outcome: ScanOutcome) {
        self.settled = true;
        self.context.transition(ScanState::Settled(outcome));
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.context.transition(ScanState::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn recorder(context: &ScanContext) -> Rc<RefCell<Vec<ScanState>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        context.subscribe(move |state| sink.borrow_mut().push(state.clone()));
        seen
    }

    #[test]
    fn test_starts_idle() {
        let context = ScanContext::new();
        assert_eq!(context.state(), ScanState::Idle);
        assert!(context.input_enabled());
    }

    #[test]
    fn test_begin_and_settle() {
        let context = ScanContext::new();
        let seen = recorder(&context);

        let guard = context.begin().unwrap();
        assert!(context.is_loading());
        assert!(!context.input_enabled());

        guard.settle(ScanOutcome::NotFound);
        assert_eq!(context.state(), ScanState::Settled(ScanOutcome::NotFound));
        assert!(context.input_enabled());

        assert_eq!(
            *seen.borrow(),
            vec![
                ScanState::Loading,
                ScanState::Settled(ScanOutcome::NotFound)
            ]
        );
    }

    #[test]
    fn test_second_begin_is_busy() {
        let context = ScanContext::new();
        let _guard = context.begin().unwrap();

        assert_eq!(context.begin().err(), Some(ScanBusy));
        assert!(context.is_loading());
    }

    #[test]
    fn test_unsettled_guard_returns_to_idle() {
        let context = ScanContext::new();
        drop(context.begin().unwrap());

        assert_eq!(context.state(), ScanState::Idle);
        assert!(context.input_enabled());
    }

    #[test]
    fn test_panic_inside_scan_returns_to_idle() {
        let context = ScanContext::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = context.begin().unwrap();
            panic!("decoder exploded");
        }));

        assert!(result.is_err());
        assert_eq!(context.state(), ScanState::Idle);
    }

    #[test]
    fn test_subscriber_can_read_state() {
        let context = Rc::new(ScanContext::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (observer, sink) = (Rc::downgrade(&context), Rc::clone(&seen));
        context.subscribe(move |_| {
            if let Some(context) = observer.upgrade() {
                sink.borrow_mut().push(context.input_enabled());
            }
        });

        context.begin().unwrap().settle(ScanOutcome::LoadError);
        assert_eq!(*seen.borrow(), vec![false, true]);
    }

    #[test]
    fn test_can_scan_again_after_settling() {
        let context = ScanContext::new();
        context.begin().unwrap().settle(ScanOutcome::LoadError);
        assert!(context.begin().is_ok());
    }
}

//! Loading and last-error bookkeeping shared by the domain services.
//!
//! Several operations may be in flight at once, so "loading" is a counter
//! rather than a flag. [`InFlight`] decrements it on drop, which clears the
//! flag on every exit path including early returns and cancelled futures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::DomainError;

#[derive(Debug, Default)]
pub(crate) struct OperationStatus {
    in_flight: AtomicUsize,
    last_error: Mutex<Option<DomainError>>,
}

impl OperationStatus {
    /// Mark an operation as started and clear the previous error.
    pub(crate) fn begin(&self) -> InFlight<'_> {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlight { status: self }
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub(crate) fn last_error(&self) -> Option<DomainError> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remember `result`'s error, if any, and pass the result through.
    pub(crate) fn record<T>(&self, result: Result<T, DomainError>) -> Result<T, DomainError> {
        if let Err(err) = &result {
            *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(err.clone());
        }
        result
    }
}

/// Guard returned by [`OperationStatus::begin`].
#[derive(Debug)]
pub(crate) struct InFlight<'a> {
    status: &'a OperationStatus,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.status.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

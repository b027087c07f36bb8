//! Process-wide "last error" slot.
//!
//! Every failing engine operation returns a [`BatchError`] and also records
//! its message here, for callers that poll instead of inspecting results.
//! The slot is last-write-wins and is never cleared by a successful
//! operation; use [`clear_last_error`] to reset it.

use std::sync::{Mutex, PoisonError};

use crate::error::BatchError;

static LAST_ERROR: Mutex<Option<String>> = Mutex::new(None);

/// Records `error` as the most recent failure and hands it back.
pub(crate) fn report(error: BatchError) -> BatchError {
    crate::trace::failure(&error);
    let mut slot = LAST_ERROR.lock().unwrap_or_else(PoisonError::into_inner);
    *slot = Some(error.to_string());
    error
}

/// Returns the description of the most recent failure, if any was recorded.
pub fn last_error() -> Option<String> {
    LAST_ERROR
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Forgets the recorded failure.
pub fn clear_last_error() {
    *LAST_ERROR.lock().unwrap_or_else(PoisonError::into_inner) = None;
}

/// Extension for recording the error side of a result in the global slot.
pub(crate) trait ReportExt<T> {
    fn reported(self) -> Result<T, BatchError>;
}

impl<T> ReportExt<T> for Result<T, BatchError> {
    fn reported(self) -> Result<T, BatchError> {
        self.map_err(report)
    }
}

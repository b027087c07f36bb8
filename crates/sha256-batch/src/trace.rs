//! Engine tracing: allocation, dispatch, batch runs and failures.
//!
//! Each hook compiles to nothing unless the `tracing` feature is enabled.

#[cfg(feature = "tracing")]
use tracing::{debug, trace, warn};

use crate::dispatcher::Backend;
use crate::error::BatchError;

/// Trace a job array allocation.
#[cfg(feature = "tracing")]
#[inline]
pub fn allocated(count: usize, capacity: usize) {
    debug!(
        target: "sha256_batch::alloc",
        count = count,
        capacity = capacity,
        "allocated {} jobs of {} bytes",
        count,
        capacity
    );
}

/// Trace a job array allocation - no-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn allocated(_count: usize, _capacity: usize) {}

/// Trace a job array release.
#[cfg(feature = "tracing")]
#[inline]
pub fn released(count: usize) {
    debug!(target: "sha256_batch::alloc", count = count, "released {} jobs", count);
}

/// Trace a job array release - no-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn released(_count: usize) {}

/// Trace backend selection.
#[cfg(feature = "tracing")]
#[inline]
pub fn backend_selected(backend: Backend, source: &'static str) {
    debug!(
        target: "sha256_batch::dispatch",
        backend = backend.name(),
        lanes = backend.lanes(),
        source = source,
        "selected {} backend ({} lanes) from {}",
        backend,
        backend.lanes(),
        source
    );
}

/// Trace backend selection - no-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn backend_selected(_backend: Backend, _source: &'static str) {}

/// Trace an unusable backend override from the environment.
#[cfg(feature = "tracing")]
#[inline]
pub fn override_ignored(value: &str, reason: &str) {
    warn!(
        target: "sha256_batch::dispatch",
        value = value,
        "ignoring backend override {:?}: {}",
        value,
        reason
    );
}

/// Trace an unusable backend override - no-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn override_ignored(_value: &str, _reason: &str) {}

/// Trace a completed lane group.
#[cfg(feature = "tracing")]
#[inline]
pub fn group_done(first_job: usize, lanes_used: usize, steps: usize) {
    trace!(
        target: "sha256_batch::run",
        first_job = first_job,
        lanes_used = lanes_used,
        steps = steps,
        "group at job {} ran {} steps over {} lanes",
        first_job,
        steps,
        lanes_used
    );
}

/// Trace a completed lane group - no-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn group_done(_first_job: usize, _lanes_used: usize, _steps: usize) {}

/// Trace a completed batch run.
#[cfg(feature = "tracing")]
#[inline]
pub fn batch_done(backend: Backend, jobs: usize, bytes: usize) {
    debug!(
        target: "sha256_batch::run",
        backend = backend.name(),
        jobs = jobs,
        bytes = bytes,
        "hashed {} jobs ({} bytes) with {}",
        jobs,
        bytes,
        backend
    );
}

/// Trace a completed batch run - no-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn batch_done(_backend: Backend, _jobs: usize, _bytes: usize) {}

/// Trace an engine failure as it is recorded.
#[cfg(feature = "tracing")]
#[inline]
pub fn failure(error: &BatchError) {
    warn!(
        target: "sha256_batch::error",
        kind = ?error.kind(),
        "{}",
        error
    );
}

/// Trace an engine failure - no-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn failure(_error: &BatchError) {}

//! Job-array lifecycle entry points.
//!
//! These free functions mirror the engine's calling sequence: initialise once,
//! allocate a job array, fill each job, run the batch, copy digests out, free
//! the array. Every fallible call returns a [`BatchError`] and records its
//! message in the [`last_error`] slot.
//!
//! ```
//! use sha256_batch::engine;
//!
//! engine::initialize();
//! let mut jobs = engine::allocate_jobs(2, 64)?;
//! engine::init_job(&mut jobs, 0, b"abc")?;
//! engine::init_job(&mut jobs, 1, b"")?;
//! engine::run_batch(&mut jobs, 2)?;
//!
//! let mut digest = [0u8; 32];
//! engine::copy_digest(&jobs, 0, &mut digest)?;
//! assert_eq!(digest[..4], [0xba, 0x78, 0x16, 0xbf]);
//! engine::free_jobs(Some(jobs));
//! # Ok::<(), sha256_batch::BatchError>(())
//! ```

use crate::Digest;
use crate::dispatcher::{self, Backend};
use crate::error::BatchError;
use crate::job::JobArray;

pub use crate::last_error::{clear_last_error, last_error};

/// One-time engine setup: selects the process-wide backend.
///
/// Idempotent; every call after the first returns the backend chosen by the
/// first. Running a batch without calling this first initialises lazily.
pub fn initialize() -> Backend {
    dispatcher::global().backend()
}

/// Allocates `count` jobs with `capacity`-byte buffers.
pub fn allocate_jobs(count: usize, capacity: usize) -> Result<JobArray, BatchError> {
    JobArray::allocate(count, capacity)
}

/// Releases a job array. `None` is a no-op.
pub fn free_jobs(jobs: Option<JobArray>) {
    drop(jobs);
}

/// Copies `data` into job `index`.
pub fn init_job(jobs: &mut JobArray, index: usize, data: &[u8]) -> Result<(), BatchError> {
    jobs.init(index, data)
}

/// Hashes jobs `0..count` on the global backend.
pub fn run_batch(jobs: &mut JobArray, count: usize) -> Result<(), BatchError> {
    dispatcher::global().run_batch(jobs, count)
}

/// Copies the digest of job `index` into `dest`.
pub fn copy_digest(jobs: &JobArray, index: usize, dest: &mut Digest) -> Result<(), BatchError> {
    jobs.copy_digest(index, dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_is_idempotent() {
        let first = initialize();
        assert_eq!(initialize(), first);
        assert!(first.is_supported());
    }

    #[test]
    fn free_none_is_noop() {
        free_jobs(None);
    }

    #[test]
    fn lifecycle_round_trip() {
        initialize();
        let mut jobs = allocate_jobs(3, 16).expect("allocate");
        init_job(&mut jobs, 0, b"abc").expect("init");
        run_batch(&mut jobs, 3).expect("run");

        let mut first = [0u8; 32];
        copy_digest(&jobs, 0, &mut first).expect("copy");
        free_jobs(Some(jobs));

        let mut again = allocate_jobs(3, 16).expect("reallocate");
        init_job(&mut again, 2, b"abc").expect("init");
        run_batch(&mut again, 3).expect("run");
        let mut second = [0u8; 32];
        copy_digest(&again, 2, &mut second).expect("copy");
        assert_eq!(first, second);
    }
}

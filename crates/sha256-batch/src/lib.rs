//! Multi-buffer SHA-256 hashing.
//!
//! This crate computes the SHA-256 digests of many independent buffers by
//! advancing several of them in lockstep across parallel compression lanes.
//! Buffers of different lengths finish on different steps; finished lanes
//! are masked so their state stays fixed while the rest of the group runs on.
//! Results are bit-identical to hashing each buffer on its own.
//!
//! # Example
//!
//! ```
//! use sha256_batch::{digest, digest_batch};
//!
//! // Single hash
//! let hash = digest(b"hello world");
//!
//! // Batch hash (uses lane parallelism when available)
//! let inputs = [b"input1".as_slice(), b"input2", b"input3"];
//! let hashes = digest_batch(&inputs)?;
//! assert_eq!(hashes.len(), 3);
//! # Ok::<(), sha256_batch::BatchError>(())
//! ```
//!
//! Callers that manage fixed-capacity job buffers themselves use
//! [`JobArray`] directly or the [`engine`] entry points.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]

pub mod compress;
pub mod constants;
mod dispatcher;
pub mod engine;
mod error;
mod job;
mod last_error;
mod padding;
mod scheduler;
mod store;
mod trace;

#[cfg(feature = "rayon")]
#[cfg_attr(docsrs, doc(cfg(feature = "rayon")))]
mod rayon_support;

pub use dispatcher::{BACKEND_ENV, Backend, Dispatcher, ParseBackendError, global};
pub use error::{BatchError, ErrorKind};
pub use job::{Job, JobArray};
pub use last_error::{clear_last_error, last_error};

#[cfg(feature = "rayon")]
pub use rayon_support::{ParallelSha256, digest_files};

/// SHA-256 digest type (32 bytes / 256 bits).
pub type Digest = [u8; 32];

/// Compute SHA-256 digests for multiple inputs in parallel lanes.
///
/// Returns digests in the same order as inputs.
pub fn digest_batch<T: AsRef<[u8]>>(inputs: &[T]) -> Result<Vec<Digest>, BatchError> {
    dispatcher::global().digest_batch(inputs)
}

/// Compute the SHA-256 digest for a single input.
pub fn digest(input: &[u8]) -> Digest {
    dispatcher::global().digest(input)
}

/// Get the currently active backend.
///
/// Useful for logging or diagnostics.
pub fn active_backend() -> Backend {
    dispatcher::global().backend()
}

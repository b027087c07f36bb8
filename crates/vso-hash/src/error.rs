//! Error type for VSO hashing.

use std::io;

use sha256_batch::BatchError;

use crate::PAGE_SIZE;

/// Errors raised while computing page digests or a VSO hash.
#[derive(Debug, thiserror::Error)]
pub enum VsoError {
    /// The batch engine rejected an operation.
    #[error("batch engine error: {0}")]
    Engine(#[from] BatchError),

    /// Reading the input failed.
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    /// A hasher needs at least one job slot.
    #[error("parallelism must be at least 1")]
    ZeroParallelism,

    /// More inputs than the hasher has job slots.
    #[error("provided byte slices exceed max number of jobs (max {max}, got {got})")]
    TooManyInputs {
        /// Job slots available.
        max: usize,
        /// Inputs supplied.
        got: usize,
    },

    /// An input larger than one page.
    #[error("provided byte slice exceeds max page size of {PAGE_SIZE} bytes (was {len})")]
    PageTooLarge {
        /// Length of the offending input.
        len: usize,
    },
}

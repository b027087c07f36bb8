//! Errors surfaced by the front-end.

use std::io;
use std::path::PathBuf;

use sha256_batch::BatchError;
use vso_hash::VsoError;

/// Failure while hashing one input or writing results.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// An input file could not be opened or read.
    #[error("{}: {source}", path.display())]
    Read {
        /// Input path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Standard input could not be read.
    #[error("-: {0}")]
    Stdin(#[source] io::Error),

    /// `-` was given more than once.
    #[error("standard input ('-') may only be given once")]
    StdinRepeated,

    /// Writing results failed.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),

    /// The batch engine failed.
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// The VSO hasher failed.
    #[error(transparent)]
    Vso(#[from] VsoError),
}

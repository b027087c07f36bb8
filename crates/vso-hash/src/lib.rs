//! VSO content identifiers computed with the batch SHA-256 engine.
//!
//! Input is split into 64 KiB pages whose SHA-256 digests are computed
//! several at a time through [`sha256_batch`]. Every 32 page digests form a
//! 2 MiB block hashed over their concatenation, and block digests are chained
//! behind a fixed seed. The identifier is the final chained digest followed by
//! a zero byte.
//!
//! # Example
//!
//! ```
//! let id = vso_hash::sum(b"hello").unwrap();
//! assert_eq!(id.len(), vso_hash::SIZE);
//! assert_eq!(id[32], 0);
//! ```

#![deny(missing_docs)]

mod chain;
mod error;
mod hasher;
mod trace;

pub use error::VsoError;
pub use hasher::Hasher;

/// Bytes per page.
pub const PAGE_SIZE: usize = 64 * 1024;

/// Bytes per block.
pub const BLOCK_SIZE: usize = 2 * 1024 * 1024;

/// Pages per block.
pub const PAGES_PER_BLOCK: usize = BLOCK_SIZE / PAGE_SIZE;

/// Length of a content identifier in bytes.
pub const SIZE: usize = 33;

/// Seed prepended to the first block digest.
pub const SEED: &[u8] = b"VSO Content Identifier Seed";

/// Page slots used by [`sum`].
const DEFAULT_PARALLELISM: usize = 8;

/// Computes the identifier of `data` in one call.
pub fn sum(data: &[u8]) -> Result<[u8; SIZE], VsoError> {
    let parallelism = data.len().div_ceil(PAGE_SIZE).clamp(1, DEFAULT_PARALLELISM);
    Hasher::new(parallelism)?.hash(data)
}

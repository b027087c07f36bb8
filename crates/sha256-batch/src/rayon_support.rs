//! Rayon integration for batch SHA-256 hashing.
//!
//! Rayon is only used to gather inputs (collecting a parallel iterator or
//! reading files concurrently); the hashing itself is still one batch run on
//! the global dispatcher.

use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::Path;

use crate::{BatchError, Digest, digest_batch};

/// Extension trait for batch SHA-256 hashing of parallel iterators.
///
/// # Example
///
/// ```
/// use rayon::prelude::*;
/// use sha256_batch::ParallelSha256;
///
/// let data: Vec<Vec<u8>> = vec![
///     b"hello".to_vec(),
///     b"world".to_vec(),
///     b"test".to_vec(),
/// ];
///
/// let digests = data.par_iter().sha256_digest()?;
/// assert_eq!(digests.len(), 3);
/// # Ok::<(), sha256_batch::BatchError>(())
/// ```
pub trait ParallelSha256<T> {
    /// Collect the items and hash them as one batch, preserving order.
    fn sha256_digest(self) -> Result<Vec<Digest>, BatchError>;
}

impl<I, T> ParallelSha256<T> for I
where
    I: IndexedParallelIterator<Item = T>,
    T: AsRef<[u8]> + Send,
{
    fn sha256_digest(self) -> Result<Vec<Digest>, BatchError> {
        let items: Vec<T> = self.collect();
        digest_batch(&items)
    }
}

/// Compute SHA-256 digests for multiple files.
///
/// Files are read in parallel on rayon's thread pool, then every file that
/// was read successfully is hashed in a single batch. Results keep the order
/// of `paths`.
///
/// # Example
///
/// ```no_run
/// use sha256_batch::digest_files;
///
/// let paths = ["file1.txt", "file2.txt", "file3.txt"];
/// let results = digest_files(&paths);
///
/// for (path, result) in paths.iter().zip(results.iter()) {
///     match result {
///         Ok(digest) => println!("{}: {:02x?}", path, digest),
///         Err(e) => println!("{}: error - {}", path, e),
///     }
/// }
/// ```
pub fn digest_files<P: AsRef<Path> + Sync>(paths: &[P]) -> Vec<io::Result<Digest>> {
    let contents: Vec<io::Result<Vec<u8>>> =
        paths.par_iter().map(|path| fs::read(path.as_ref())).collect();

    let readable: Vec<&[u8]> = contents
        .iter()
        .filter_map(|content| content.as_ref().ok().map(Vec::as_slice))
        .collect();

    let mut digests = match digest_batch(&readable) {
        Ok(digests) => digests.into_iter(),
        Err(err) => {
            let message = err.to_string();
            return contents
                .iter()
                .map(|_| Err(io::Error::other(message.clone())))
                .collect();
        }
    };

    contents
        .into_iter()
        .map(|content| match content {
            Ok(_) => digests
                .next()
                .ok_or_else(|| io::Error::other("batch returned too few digests")),
            Err(err) => Err(err),
        })
        .collect()
}

//! Paged hasher driving the batch engine.

use std::io::{self, Read};

use sha256_batch::{Digest, Dispatcher, JobArray, global};

use crate::chain::Aggregator;
use crate::error::VsoError;
use crate::{PAGE_SIZE, SIZE, trace};

/// Computes VSO content identifiers, hashing up to `parallelism` pages per
/// engine batch.
///
/// The hasher owns its job array, so one instance serves one thread at a
/// time; it can be reused for any number of inputs.
#[derive(Debug)]
pub struct Hasher {
    jobs: JobArray,
    dispatcher: Dispatcher,
    page: Vec<u8>,
}

impl Hasher {
    /// Creates a hasher with `parallelism` page slots on the global backend.
    pub fn new(parallelism: usize) -> Result<Self, VsoError> {
        Self::with_dispatcher(parallelism, *global())
    }

    /// Creates a hasher that runs its batches on `dispatcher`.
    pub fn with_dispatcher(parallelism: usize, dispatcher: Dispatcher) -> Result<Self, VsoError> {
        if parallelism == 0 {
            return Err(VsoError::ZeroParallelism);
        }
        let jobs = JobArray::allocate(parallelism, PAGE_SIZE)?;
        Ok(Self {
            jobs,
            dispatcher,
            page: vec![0u8; PAGE_SIZE],
        })
    }

    /// Number of pages hashed per batch.
    pub fn parallelism(&self) -> usize {
        self.jobs.len()
    }

    /// Backend the hasher runs on.
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Hashes each input as one engine batch and returns plain SHA-256
    /// digests in input order.
    ///
    /// Every input must fit in one page and there may be at most
    /// [`parallelism`](Self::parallelism) of them.
    pub fn sha256_sums<T: AsRef<[u8]>>(&mut self, inputs: &[T]) -> Result<Vec<Digest>, VsoError> {
        if inputs.len() > self.jobs.len() {
            return Err(VsoError::TooManyInputs {
                max: self.jobs.len(),
                got: inputs.len(),
            });
        }
        if let Some(oversized) = inputs.iter().find(|input| input.as_ref().len() > PAGE_SIZE) {
            return Err(VsoError::PageTooLarge {
                len: oversized.as_ref().len(),
            });
        }

        for (index, input) in inputs.iter().enumerate() {
            self.jobs.init(index, input.as_ref())?;
        }
        self.run(inputs.len())
    }

    /// Reads `reader` to the end and returns its 33-byte identifier.
    pub fn hash<R: Read>(&mut self, mut reader: R) -> Result<[u8; SIZE], VsoError> {
        let mut aggregator = Aggregator::new();
        let mut eof = false;

        while !eof {
            let mut count = 0;
            while count < self.jobs.len() {
                let len = read_page(&mut reader, &mut self.page)?;
                if len > 0 {
                    self.jobs.init(count, &self.page[..len])?;
                    count += 1;
                }
                if len < PAGE_SIZE {
                    eof = true;
                    break;
                }
            }

            for page in self.run(count)? {
                aggregator.push_page(&page);
            }
        }

        trace::hashed(aggregator.page_count());
        Ok(aggregator.finish())
    }

    fn run(&mut self, count: usize) -> Result<Vec<Digest>, VsoError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        self.dispatcher.run_batch(&mut self.jobs, count)?;
        trace::batch(count);
        (0..count)
            .map(|index| self.jobs.digest(index).map_err(VsoError::from))
            .collect()
    }
}

/// Fills `page` from `reader`, stopping early only at end of input.
fn read_page<R: Read>(reader: &mut R, page: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < page.len() {
        match reader.read(&mut page[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Trickle<'a> {
        data: &'a [u8],
        interrupted: bool,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.interrupted = false;
            let n = buf.len().min(self.data.len()).min(1000);
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn read_page_fills_across_short_reads() {
        let data = vec![7u8; PAGE_SIZE + 10];
        let mut reader = Trickle {
            data: &data,
            interrupted: false,
        };
        let mut page = vec![0u8; PAGE_SIZE];
        assert_eq!(read_page(&mut reader, &mut page).unwrap(), PAGE_SIZE);
        assert_eq!(read_page(&mut reader, &mut page).unwrap(), 10);
        assert_eq!(read_page(&mut reader, &mut page).unwrap(), 0);
    }

    #[test]
    fn zero_parallelism_rejected() {
        assert!(matches!(Hasher::new(0), Err(VsoError::ZeroParallelism)));
    }

    #[test]
    fn sums_match_single_digests() {
        let mut hasher = Hasher::new(3).unwrap();
        let inputs: [&[u8]; 3] = [b"abc", b"", &[0u8; 64]];
        let sums = hasher.sha256_sums(&inputs).unwrap();
        for (sum, input) in sums.iter().zip(inputs) {
            assert_eq!(*sum, sha256_batch::digest(input));
        }
    }

    #[test]
    fn short_reader_matches_slice() {
        let data: Vec<u8> = (0..3 * PAGE_SIZE + 17).map(|i| (i % 251) as u8).collect();
        let mut hasher = Hasher::new(2).unwrap();
        let from_slice = hasher.hash(data.as_slice()).unwrap();
        let from_trickle = hasher
            .hash(Trickle {
                data: &data,
                interrupted: false,
            })
            .unwrap();
        assert_eq!(from_slice, from_trickle);
    }
}

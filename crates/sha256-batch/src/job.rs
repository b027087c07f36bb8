//! Job arrays: fixed-capacity buffers paired with digest slots.
//!
//! A [`JobArray`] is allocated once with a single capacity shared by every
//! job, filled through [`JobArray::init`], hashed in place by a batch run and
//! then read back digest by digest. All jobs live in one arena and are freed
//! together when the array is dropped.

use std::fmt;

use crate::Digest;
use crate::error::BatchError;
use crate::last_error::ReportExt;
use crate::store::BufferStore;

#[derive(Clone, Copy, Debug, Default)]
struct JobSlot {
    len: usize,
    digest: Option<Digest>,
}

/// Borrowed view of one job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Job<'a> {
    index: usize,
    data: &'a [u8],
    digest: Option<&'a Digest>,
}

impl<'a> Job<'a> {
    /// Position of the job in its array.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The job's logical content (the first `len` bytes of its buffer).
    #[must_use]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The digest written by the last successful batch run, if still current.
    #[must_use]
    pub const fn digest(&self) -> Option<&'a Digest> {
        self.digest
    }
}

/// An owned batch of jobs sharing one buffer capacity.
#[derive(Clone)]
pub struct JobArray {
    store: BufferStore,
    slots: Vec<JobSlot>,
}

impl fmt::Debug for JobArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobArray")
            .field("len", &self.slots.len())
            .field("capacity", &self.store.capacity())
            .finish_non_exhaustive()
    }
}

impl JobArray {
    /// Allocates `count` jobs, each able to hold `capacity` bytes.
    ///
    /// Zero jobs or zero capacity are valid, empty allocations. Failures are
    /// also recorded in the process-wide last-error slot.
    pub fn allocate(count: usize, capacity: usize) -> Result<Self, BatchError> {
        Self::try_allocate(count, capacity).reported()
    }

    fn try_allocate(count: usize, capacity: usize) -> Result<Self, BatchError> {
        let store = BufferStore::allocate(count, capacity)?;

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(count)
            .map_err(|_| BatchError::AllocationFailed { count, capacity })?;
        slots.resize(count, JobSlot::default());

        crate::trace::allocated(count, capacity);
        Ok(Self { store, slots })
    }

    /// Number of jobs in the array.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Reports whether the array holds no jobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Per-job buffer capacity fixed at allocation.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Replaces the content of job `index` with `data`.
    ///
    /// Data longer than [`capacity`](Self::capacity) is rejected and the job
    /// keeps its previous content, length and digest. On success the job's
    /// digest becomes unavailable until the next batch run.
    pub fn init(&mut self, index: usize, data: &[u8]) -> Result<(), BatchError> {
        self.try_init(index, data).reported()
    }

    fn try_init(&mut self, index: usize, data: &[u8]) -> Result<(), BatchError> {
        self.check_index(index)?;
        let capacity = self.capacity();
        if data.len() > capacity {
            return Err(BatchError::CapacityExceeded {
                index,
                len: data.len(),
                capacity,
            });
        }

        self.store.slot_mut(index)[..data.len()].copy_from_slice(data);
        self.slots[index] = JobSlot {
            len: data.len(),
            digest: None,
        };
        Ok(())
    }

    /// Returns a view of job `index`.
    #[must_use]
    pub fn job(&self, index: usize) -> Option<Job<'_>> {
        let slot = self.slots.get(index)?;
        Some(Job {
            index,
            data: &self.store.slot(index)[..slot.len],
            digest: slot.digest.as_ref(),
        })
    }

    /// Iterates over every job in index order.
    pub fn jobs(&self) -> impl Iterator<Item = Job<'_>> + '_ {
        (0..self.len()).filter_map(|index| self.job(index))
    }

    /// Returns the digest of job `index`.
    pub fn digest(&self, index: usize) -> Result<Digest, BatchError> {
        self.try_digest(index).reported()
    }

    fn try_digest(&self, index: usize) -> Result<Digest, BatchError> {
        self.check_index(index)?;
        self.slots[index]
            .digest
            .ok_or(BatchError::DigestUnavailable { index })
    }

    /// Copies the digest of job `index` into `dest`.
    pub fn copy_digest(&self, index: usize, dest: &mut Digest) -> Result<(), BatchError> {
        *dest = self.digest(index)?;
        Ok(())
    }

    /// Logical contents of the first `count` jobs.
    pub(crate) fn messages(&self, count: usize) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.slots[..count]
            .iter()
            .enumerate()
            .map(|(index, slot)| &self.store.slot(index)[..slot.len])
    }

    /// Stores the digests of a completed run over the first `digests.len()` jobs.
    pub(crate) fn commit(&mut self, digests: &[Digest]) {
        for (slot, digest) in self.slots.iter_mut().zip(digests) {
            slot.digest = Some(*digest);
        }
    }

    fn check_index(&self, index: usize) -> Result<(), BatchError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(BatchError::IndexOutOfRange {
                index,
                count: self.len(),
            })
        }
    }
}

impl Drop for JobArray {
    fn drop(&mut self) {
        crate::trace::released(self.slots.len());
    }
}

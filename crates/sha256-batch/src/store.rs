//! Contiguous byte arena backing every job buffer of one batch.

use crate::error::BatchError;

/// `count` fixed-capacity buffers laid out back to back in one allocation.
#[derive(Clone, Debug)]
pub(crate) struct BufferStore {
    capacity: usize,
    bytes: Vec<u8>,
}

impl BufferStore {
    /// Reserves `count × capacity` zeroed bytes.
    ///
    /// Overflow of the total size and allocator refusal both surface as
    /// [`BatchError::AllocationFailed`] rather than aborting the process.
    pub(crate) fn allocate(count: usize, capacity: usize) -> Result<Self, BatchError> {
        let failed = || BatchError::AllocationFailed { count, capacity };
        let total = count.checked_mul(capacity).ok_or_else(failed)?;

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(total).map_err(|_| failed())?;
        bytes.resize(total, 0);

        Ok(Self { capacity, bytes })
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The whole buffer of slot `index`. Caller bounds-checks `index`.
    pub(crate) fn slot(&self, index: usize) -> &[u8] {
        let start = index * self.capacity;
        &self.bytes[start..start + self.capacity]
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut [u8] {
        let start = index * self.capacity;
        &mut self.bytes[start..start + self.capacity]
    }
}

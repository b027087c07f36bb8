//! Error types for batch hashing operations.

use crate::dispatcher::Backend;

/// Broad category of a [`BatchError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Out of memory while allocating a job array.
    Allocation,
    /// Initialisation data exceeded the fixed per-job capacity.
    LengthViolation,
    /// An index, count or backend request the engine cannot honour.
    InvalidArgument,
    /// Scratch allocation failed while a batch was running.
    Internal,
}

/// Errors reported by the batch engine.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BatchError {
    /// The job array or its buffer store could not be allocated.
    #[error("failed to allocate {count} jobs of {capacity} bytes")]
    AllocationFailed {
        /// Requested number of jobs.
        count: usize,
        /// Requested per-job buffer capacity.
        capacity: usize,
    },

    /// Initialisation data does not fit in the job's buffer.
    #[error("job {index}: {len} bytes exceed the per-job capacity of {capacity} bytes")]
    CapacityExceeded {
        /// Index of the job being initialised.
        index: usize,
        /// Length of the rejected data.
        len: usize,
        /// Capacity fixed at allocation time.
        capacity: usize,
    },

    /// A job index outside the array.
    #[error("job index {index} out of range for {count} jobs")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of jobs in the array.
        count: usize,
    },

    /// A batch run asked for more jobs than the array holds.
    #[error("cannot run {count} jobs: only {available} allocated")]
    InvalidCount {
        /// Requested job count.
        count: usize,
        /// Number of jobs in the array.
        available: usize,
    },

    /// The job has not been hashed since it was last initialised.
    #[error("job {index} has no digest; run the batch first")]
    DigestUnavailable {
        /// Index of the job.
        index: usize,
    },

    /// The requested backend cannot run on this CPU.
    #[error("backend {backend} is not supported on this CPU")]
    UnsupportedBackend {
        /// Backend that was requested.
        backend: Backend,
    },

    /// Scheduling scratch space could not be reserved.
    #[error("failed to reserve scheduling scratch for {lanes} lanes")]
    ScratchAllocation {
        /// Number of lane cursors that were requested.
        lanes: usize,
    },
}

impl BatchError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AllocationFailed { .. } => ErrorKind::Allocation,
            Self::CapacityExceeded { .. } => ErrorKind::LengthViolation,
            Self::IndexOutOfRange { .. }
            | Self::InvalidCount { .. }
            | Self::DigestUnavailable { .. }
            | Self::UnsupportedBackend { .. } => ErrorKind::InvalidArgument,
            Self::ScratchAllocation { .. } => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_error_mentions_sizes() {
        let error = BatchError::CapacityExceeded {
            index: 2,
            len: 65,
            capacity: 64,
        };
        let display = error.to_string();
        assert!(display.contains("65"));
        assert!(display.contains("64"));
        assert!(display.contains("job 2"));
        assert_eq!(error.kind(), ErrorKind::LengthViolation);
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            BatchError::AllocationFailed {
                count: 1,
                capacity: usize::MAX
            }
            .kind(),
            ErrorKind::Allocation
        );
        assert_eq!(
            BatchError::IndexOutOfRange { index: 3, count: 3 }.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            BatchError::ScratchAllocation { lanes: 8 }.kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            BatchError::UnsupportedBackend {
                backend: Backend::Avx2
            }
            .kind(),
            ErrorKind::InvalidArgument
        );
    }
}

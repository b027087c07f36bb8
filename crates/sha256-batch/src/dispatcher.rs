//! Runtime CPU detection and backend dispatch.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::BatchError;
use crate::job::JobArray;
use crate::last_error::ReportExt;
use crate::{Digest, scheduler};

/// Environment variable that overrides backend detection.
///
/// Accepts `avx2`, `portable`, `scalar` or `auto`.
pub const BACKEND_ENV: &str = "SHA256_BATCH_BACKEND";

/// Available compression backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// AVX2 with 8 parallel lanes.
    Avx2,
    /// Plain Rust structure-of-arrays kernel with 4 parallel lanes.
    Portable,
    /// Scalar fallback (1 lane).
    Scalar,
}

impl Backend {
    /// Every backend, fastest first.
    pub const ALL: [Self; 3] = [Self::Avx2, Self::Portable, Self::Scalar];

    /// Number of parallel lanes for this backend.
    pub const fn lanes(self) -> usize {
        match self {
            Self::Avx2 => 8,
            Self::Portable => scheduler::PORTABLE_LANES,
            Self::Scalar => 1,
        }
    }

    /// Lower-case name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Avx2 => "avx2",
            Self::Portable => "portable",
            Self::Scalar => "scalar",
        }
    }

    /// Reports whether this backend can run on the current CPU.
    pub fn is_supported(self) -> bool {
        match self {
            #[cfg(target_arch = "x86_64")]
            Self::Avx2 => is_x86_feature_detected!("avx2"),
            #[cfg(not(target_arch = "x86_64"))]
            Self::Avx2 => false,
            Self::Portable | Self::Scalar => true,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown backend name.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown backend {name:?} (expected avx2, portable or scalar)")]
pub struct ParseBackendError {
    name: String,
}

impl FromStr for Backend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|backend| backend.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseBackendError { name: s.to_owned() })
    }
}

/// Dispatcher that runs batches on one selected backend.
///
/// Each dispatcher is independent; threads that want isolated engines can
/// each build their own instead of sharing [`global`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatcher {
    backend: Backend,
}

impl Dispatcher {
    /// Detect CPU features and select the best available backend.
    pub fn detect() -> Self {
        let backend = Self::detect_backend();
        crate::trace::backend_selected(backend, "detection");
        Self { backend }
    }

    /// Select a backend from [`BACKEND_ENV`], falling back to detection.
    ///
    /// Unknown or unsupported values are ignored rather than treated as fatal.
    pub fn from_env() -> Self {
        match std::env::var(BACKEND_ENV) {
            Ok(value) => Self::from_override(&value),
            Err(_) => Self::detect(),
        }
    }

    fn from_override(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("auto") || value.trim().is_empty() {
            return Self::detect();
        }
        match value.parse::<Backend>() {
            Ok(backend) if backend.is_supported() => {
                crate::trace::backend_selected(backend, BACKEND_ENV);
                Self { backend }
            }
            Ok(_) => {
                crate::trace::override_ignored(value, "not supported on this CPU");
                Self::detect()
            }
            Err(err) => {
                crate::trace::override_ignored(value, &err.to_string());
                Self::detect()
            }
        }
    }

    /// Use `backend` explicitly.
    ///
    /// Fails with [`BatchError::UnsupportedBackend`] when the CPU lacks the
    /// required instructions.
    pub fn with_backend(backend: Backend) -> Result<Self, BatchError> {
        if backend.is_supported() {
            crate::trace::backend_selected(backend, "caller");
            Ok(Self { backend })
        } else {
            Err(BatchError::UnsupportedBackend { backend }).reported()
        }
    }

    fn detect_backend() -> Backend {
        Backend::ALL
            .into_iter()
            .find(|backend| backend.is_supported())
            .unwrap_or(Backend::Scalar)
    }

    /// Get the selected backend.
    pub const fn backend(&self) -> Backend {
        self.backend
    }

    /// Hashes the first `count` jobs of `jobs` in place.
    ///
    /// On failure no digest is written and the error is also recorded in the
    /// last-error slot.
    pub fn run_batch(&self, jobs: &mut JobArray, count: usize) -> Result<(), BatchError> {
        if count > jobs.len() {
            return Err(BatchError::InvalidCount {
                count,
                available: jobs.len(),
            })
            .reported();
        }

        let digests = scheduler::run(self.backend, jobs.messages(count)).reported()?;
        jobs.commit(&digests);
        Ok(())
    }

    /// Compute SHA-256 digests for multiple inputs.
    ///
    /// Returns digests in the same order as the inputs.
    pub fn digest_batch<T: AsRef<[u8]>>(&self, inputs: &[T]) -> Result<Vec<Digest>, BatchError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        scheduler::run(self.backend, inputs.iter().map(AsRef::as_ref)).reported()
    }

    /// Compute the SHA-256 digest of a single input.
    pub fn digest(&self, input: &[u8]) -> Digest {
        scheduler::digest_one(input)
    }
}

/// Global dispatcher instance, initialized on first use.
pub fn global() -> &'static Dispatcher {
    static DISPATCHER: OnceLock<Dispatcher> = OnceLock::new();
    DISPATCHER.get_or_init(Dispatcher::from_env)
}

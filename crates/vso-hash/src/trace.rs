//! Hasher tracing hooks; no-ops unless the `tracing` feature is enabled.

/// Trace one batch of page digests.
#[cfg(feature = "tracing")]
#[inline]
pub fn batch(pages: usize) {
    tracing::trace!(target: "vso_hash", pages = pages, "hashed {} pages", pages);
}

/// Trace one batch of page digests - no-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub const fn batch(_pages: usize) {}

/// Trace a completed content identifier.
#[cfg(feature = "tracing")]
#[inline]
pub fn hashed(pages: u64) {
    tracing::debug!(target: "vso_hash", pages = pages, "content hash over {} pages", pages);
}

/// Trace a completed content identifier - no-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub const fn hashed(_pages: u64) {}

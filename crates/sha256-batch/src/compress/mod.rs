//! SHA-256 compression backends.
//!
//! Every backend implements the same FIPS 180-4 block transform. They differ
//! only in how many independent chaining values they advance per call:
//!
//! - **scalar**: one state, one block
//! - **portable**: `N` lanes in a structure-of-arrays layout, plain Rust
//! - **avx2**: 8 lanes in 256-bit YMM registers (x86_64, runtime-detected)
//!
//! Multi-lane backends take a per-lane active mask. An inactive lane still
//! flows through the round arithmetic but its chaining value is not updated,
//! which is how the scheduler lets short messages finish early while longer
//! ones keep going.

pub mod portable;
pub mod scalar;

#[cfg(target_arch = "x86_64")]
#[allow(unsafe_code)]
pub mod avx2;

/// Chaining values for `N` lanes: `state[word][lane]`.
pub type LaneState<const N: usize> = [[u32; N]; 8];

/// Broadcasts one chaining value to every lane.
pub fn splat<const N: usize>(state: &[u32; 8]) -> LaneState<N> {
    std::array::from_fn(|word| [state[word]; N])
}

/// Reads the chaining value of `lane` back out of a lane state.
pub fn extract<const N: usize>(state: &LaneState<N>, lane: usize) -> [u32; 8] {
    std::array::from_fn(|word| state[word][lane])
}

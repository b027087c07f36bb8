//! Lane-group scheduling.
//!
//! Messages are split into groups of `N` lanes, where `N` is the width of the
//! selected compression backend. Every lane owns a [`BlockCursor`] that counts
//! its padded blocks down to zero. A group keeps stepping until every lane is
//! exhausted; on each step only the lanes that still had a block are marked
//! active, so lanes that finish early keep their chaining value fixed while
//! the rest of the group catches up. A trailing partial group simply leaves
//! its missing lanes idle.

use crate::Digest;
use crate::compress::{self, LaneState, portable, scalar};
use crate::constants::{BLOCK_LEN, DIGEST_LEN, H0};
use crate::dispatcher::Backend;
use crate::error::BatchError;
use crate::padding::BlockCursor;

/// Lane width of the portable backend.
pub(crate) const PORTABLE_LANES: usize = 4;

/// Hashes every message with `backend`, returning digests in input order.
///
/// Scratch space for the lane cursors and the output is reserved up front; if
/// either reservation fails nothing is hashed.
pub(crate) fn run<'a, I>(backend: Backend, messages: I) -> Result<Vec<Digest>, BatchError>
where
    I: ExactSizeIterator<Item = &'a [u8]>,
{
    let count = messages.len();
    let scratch_failed = |_| BatchError::ScratchAllocation { lanes: count };

    let mut cursors = Vec::new();
    cursors.try_reserve_exact(count).map_err(scratch_failed)?;
    let mut digests = Vec::new();
    digests.try_reserve_exact(count).map_err(scratch_failed)?;

    let mut bytes = 0usize;
    cursors.extend(messages.map(|message| {
        bytes = bytes.saturating_add(message.len());
        BlockCursor::new(message)
    }));

    dispatch(backend, &mut cursors, &mut digests);

    crate::trace::batch_done(backend, count, bytes);
    Ok(digests)
}

#[allow(unsafe_code)]
fn dispatch(backend: Backend, cursors: &mut [BlockCursor<'_>], digests: &mut Vec<Digest>) {
    match backend {
        #[cfg(target_arch = "x86_64")]
        Backend::Avx2 => {
            hash_groups::<{ compress::avx2::LANES }, _>(cursors, digests, |state, blocks, active| {
                // SAFETY: a Dispatcher only carries Avx2 after runtime detection succeeded.
                unsafe { compress::avx2::compress_x8(state, blocks, active) }
            });
        }
        #[cfg(not(target_arch = "x86_64"))]
        Backend::Avx2 => {
            hash_groups::<PORTABLE_LANES, _>(cursors, digests, portable::compress_lanes);
        }
        Backend::Portable => {
            hash_groups::<PORTABLE_LANES, _>(cursors, digests, portable::compress_lanes);
        }
        Backend::Scalar => {
            hash_groups::<1, _>(cursors, digests, |state, blocks, _active| {
                let mut single = compress::extract(state, 0);
                scalar::compress_block(&mut single, &blocks[0]);
                *state = compress::splat(&single);
            });
        }
    }
}

/// Drives every lane group of width `N` to completion.
///
/// `compress` is only invoked when at least one lane is active; for `N == 1`
/// that means the single lane is always active when it is called.
fn hash_groups<const N: usize, F>(
    cursors: &mut [BlockCursor<'_>],
    digests: &mut Vec<Digest>,
    mut compress: F,
) where
    F: FnMut(&mut LaneState<N>, &[[u8; BLOCK_LEN]; N], &[bool; N]),
{
    for (group_index, group) in cursors.chunks_mut(N).enumerate() {
        let mut state = compress::splat::<N>(&H0);
        // Inactive lanes keep whatever block they last held; it is never folded in.
        let mut blocks = [[0u8; BLOCK_LEN]; N];
        let mut steps = 0usize;

        loop {
            let mut active = [false; N];
            for (lane, cursor) in group.iter_mut().enumerate() {
                active[lane] = cursor.next_into(&mut blocks[lane]);
            }
            if !active.contains(&true) {
                break;
            }
            compress(&mut state, &blocks, &active);
            steps += 1;
        }

        for lane in 0..group.len() {
            digests.push(encode(&compress::extract(&state, lane)));
        }
        crate::trace::group_done(group_index * N, group.len(), steps);
    }
}

/// Hashes one message with the scalar compressor.
pub(crate) fn digest_one(message: &[u8]) -> Digest {
    let mut cursor = BlockCursor::new(message);
    let mut state = H0;
    let mut block = [0u8; BLOCK_LEN];
    while cursor.next_into(&mut block) {
        scalar::compress_block(&mut state, &block);
    }
    encode(&state)
}

/// Serialises a chaining value as a big-endian digest.
fn encode(state: &[u32; 8]) -> Digest {
    let mut digest = [0u8; DIGEST_LEN];
    for (chunk, word) in digest.chunks_exact_mut(4).zip(state) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn to_hex(bytes: &[u8]) -> String {
        use std::fmt::Write;
        let mut s = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            write!(s, "{b:02x}").unwrap();
        }
        s
    }

    fn backends() -> Vec<Backend> {
        Backend::ALL
            .into_iter()
            .filter(|backend| backend.is_supported())
            .collect()
    }

    fn staggered_inputs() -> Vec<Vec<u8>> {
        // Lengths straddle every padding boundary so neighbouring lanes finish
        // on different steps.
        [0usize, 1, 55, 56, 63, 64, 65, 119, 120, 128, 300, 3, 1000, 57, 0, 191, 192]
            .iter()
            .enumerate()
            .map(|(i, &len)| (0..len).map(|b| (b * 13 + i) as u8).collect())
            .collect()
    }

    #[test]
    fn digest_one_known_answers() {
        assert_eq!(to_hex(&digest_one(b"")), EMPTY);
        assert_eq!(to_hex(&digest_one(b"abc")), ABC);
    }

    #[test]
    fn every_backend_matches_scalar_on_staggered_lengths() {
        let inputs = staggered_inputs();
        let expected: Vec<Digest> = inputs.iter().map(|i| digest_one(i)).collect();

        for backend in backends() {
            let got = run(backend, inputs.iter().map(Vec::as_slice)).expect("run");
            assert_eq!(got, expected, "backend {backend}");
        }
    }

    #[test]
    fn long_lane_next_to_empty_lanes() {
        let mut inputs: Vec<Vec<u8>> = vec![Vec::new(); 8];
        inputs[5] = vec![0x61; 4096];
        let expected: Vec<Digest> = inputs.iter().map(|i| digest_one(i)).collect();

        for backend in backends() {
            let got = run(backend, inputs.iter().map(Vec::as_slice)).expect("run");
            assert_eq!(got, expected, "backend {backend}");
        }
    }

    #[test]
    fn partial_group_results_are_positional() {
        for count in 1..=9 {
            let inputs: Vec<Vec<u8>> = (0..count).map(|i| vec![i as u8; i * 37]).collect();
            for backend in backends() {
                let got = run(backend, inputs.iter().map(Vec::as_slice)).expect("run");
                assert_eq!(got.len(), count);
                for (i, input) in inputs.iter().enumerate() {
                    assert_eq!(got[i], digest_one(input), "backend {backend}, job {i}");
                }
            }
        }
    }

    #[test]
    fn empty_batch_yields_no_digests() {
        for backend in backends() {
            let got = run(backend, std::iter::empty::<&[u8]>()).expect("run");
            assert!(got.is_empty());
        }
    }

    #[test]
    fn encode_is_big_endian() {
        let digest = encode(&[0x0102_0304, 0, 0, 0, 0, 0, 0, 0xa0b0_c0d0]);
        assert_eq!(&digest[..4], &[1, 2, 3, 4]);
        assert_eq!(&digest[28..], &[0xa0, 0xb0, 0xc0, 0xd0]);
    }
}

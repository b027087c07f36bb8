//! AVX2 8-lane SHA-256 compression.
//!
//! Processes 8 independent chaining values simultaneously using 256-bit YMM
//! registers. Message words are transposed so register `w[t]` holds word `t`
//! of every lane's block.
//!
//! # CPU Feature Requirements
//!
//! - **AVX2**: Intel Haswell (2013+), AMD Excavator (2015+) or newer
//! - Must be verified at runtime using `is_x86_feature_detected!("avx2")`
//!
//! # Masking
//!
//! Finished lanes are handled with `_mm256_blendv_epi8`: the updated chaining
//! value is computed for all lanes, then blended with the previous value under
//! the active mask so inactive lanes keep their state bit for bit.

use std::arch::x86_64::*;

use super::LaneState;
use super::scalar::load_word;
use crate::constants::{BLOCK_LEN, K};

/// Number of lanes advanced per call.
pub const LANES: usize = 8;

macro_rules! rotr {
    ($x:expr, $n:literal) => {
        _mm256_or_si256(_mm256_srli_epi32::<$n>($x), _mm256_slli_epi32::<{ 32 - $n }>($x))
    };
}

macro_rules! add {
    ($x:expr, $y:expr) => {
        _mm256_add_epi32($x, $y)
    };
    ($x:expr, $y:expr, $($rest:expr),+) => {
        _mm256_add_epi32($x, add!($y, $($rest),+))
    };
}

macro_rules! xor3 {
    ($x:expr, $y:expr, $z:expr) => {
        _mm256_xor_si256(_mm256_xor_si256($x, $y), $z)
    };
}

/// Loads one row of a lane state into a register.
macro_rules! load_row {
    ($row:expr) => {{
        let r = $row;
        _mm256_setr_epi32(
            r[0] as i32, r[1] as i32, r[2] as i32, r[3] as i32,
            r[4] as i32, r[5] as i32, r[6] as i32, r[7] as i32,
        )
    }};
}

/// Compresses one block per lane for 8 lanes.
///
/// # Safety
///
/// Caller must ensure AVX2 is available (use `is_x86_feature_detected!`).
#[target_feature(enable = "avx2")]
pub unsafe fn compress_x8(
    state: &mut LaneState<LANES>,
    blocks: &[[u8; BLOCK_LEN]; LANES],
    active: &[bool; LANES],
) {
    unsafe {
        let mut w = [_mm256_setzero_si256(); 64];
        for (t, slot) in w.iter_mut().enumerate().take(16) {
            let words: [u32; LANES] = std::array::from_fn(|lane| load_word(&blocks[lane], t));
            *slot = load_row!(words);
        }
        for t in 16..64 {
            let s0 = xor3!(
                rotr!(w[t - 15], 7),
                rotr!(w[t - 15], 18),
                _mm256_srli_epi32::<3>(w[t - 15])
            );
            let s1 = xor3!(
                rotr!(w[t - 2], 17),
                rotr!(w[t - 2], 19),
                _mm256_srli_epi32::<10>(w[t - 2])
            );
            w[t] = add!(s1, w[t - 7], s0, w[t - 16]);
        }

        let initial: [__m256i; 8] = std::array::from_fn(|word| load_row!(state[word]));
        let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = initial;

        for t in 0..64 {
            let big_s1 = xor3!(rotr!(e, 6), rotr!(e, 11), rotr!(e, 25));
            let choose = _mm256_xor_si256(g, _mm256_and_si256(e, _mm256_xor_si256(f, g)));
            let t1 = add!(h, big_s1, choose, _mm256_set1_epi32(K[t] as i32), w[t]);

            let big_s0 = xor3!(rotr!(a, 2), rotr!(a, 13), rotr!(a, 22));
            let majority = _mm256_or_si256(
                _mm256_and_si256(a, b),
                _mm256_and_si256(c, _mm256_or_si256(a, b)),
            );
            let t2 = add!(big_s0, majority);

            h = g;
            g = f;
            f = e;
            e = add!(d, t1);
            d = c;
            c = b;
            b = a;
            a = add!(t1, t2);
        }

        let mask_words: [i32; LANES] =
            std::array::from_fn(|lane| if active[lane] { -1 } else { 0 });
        let mask = load_row!(mask_words);

        let worked = [a, b, c, d, e, f, g, h];
        for (word, row) in state.iter_mut().enumerate() {
            let updated = _mm256_add_epi32(initial[word], worked[word]);
            let blended = _mm256_blendv_epi8(initial[word], updated, mask);
            *row = std::mem::transmute::<__m256i, [u32; LANES]>(blended);
        }
    }
}

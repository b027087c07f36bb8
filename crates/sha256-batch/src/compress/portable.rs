//! Portable lane-parallel compression over a structure-of-arrays state.
//!
//! Word `i` of every lane lives in `state[i]`, so each round touches the same
//! word across all lanes in lockstep. The loops are written so the compiler
//! can keep a whole `[u32; N]` row in one vector register.

use super::LaneState;
use super::scalar::{big_sigma0, big_sigma1, ch, load_word, maj, small_sigma0, small_sigma1};
use crate::constants::{BLOCK_LEN, K};

/// Compresses one block per lane.
///
/// Lanes whose `active` flag is clear run the same arithmetic on their
/// (dummy) block but their chaining value is left exactly as it was.
pub fn compress_lanes<const N: usize>(
    state: &mut LaneState<N>,
    blocks: &[[u8; BLOCK_LEN]; N],
    active: &[bool; N],
) {
    let mut w = [[0u32; N]; 64];
    for t in 0..16 {
        for lane in 0..N {
            w[t][lane] = load_word(&blocks[lane], t);
        }
    }
    for t in 16..64 {
        for lane in 0..N {
            w[t][lane] = small_sigma1(w[t - 2][lane])
                .wrapping_add(w[t - 7][lane])
                .wrapping_add(small_sigma0(w[t - 15][lane]))
                .wrapping_add(w[t - 16][lane]);
        }
    }

    let mut v = *state;
    for t in 0..64 {
        let mut next_a = [0u32; N];
        let mut next_e = [0u32; N];
        for lane in 0..N {
            let [a, b, c, d, e, f, g, h] = [
                v[0][lane], v[1][lane], v[2][lane], v[3][lane], v[4][lane], v[5][lane],
                v[6][lane], v[7][lane],
            ];
            let t1 = h
                .wrapping_add(big_sigma1(e))
                .wrapping_add(ch(e, f, g))
                .wrapping_add(K[t])
                .wrapping_add(w[t][lane]);
            let t2 = big_sigma0(a).wrapping_add(maj(a, b, c));
            next_a[lane] = t1.wrapping_add(t2);
            next_e[lane] = d.wrapping_add(t1);
        }
        v = [next_a, v[0], v[1], v[2], next_e, v[4], v[5], v[6]];
    }

    for (row, worked) in state.iter_mut().zip(v.iter()) {
        for lane in 0..N {
            if active[lane] {
                row[lane] = row[lane].wrapping_add(worked[lane]);
            }
        }
    }
}

//! Message padding and per-lane block cursors.
//!
//! A message of `L` bytes is extended with a single `0x80` byte, zero bytes,
//! and the 64-bit big-endian bit length so the padded length is a multiple of
//! 64 bytes. Full blocks are read straight from the caller's buffer; only the
//! one or two trailing blocks that carry the padding are materialised.

use crate::constants::BLOCK_LEN;

/// Bytes reserved at the end of the final block for the bit-length field.
const LENGTH_FIELD_LEN: usize = 8;

/// Number of 64-byte blocks in the padded form of a `len`-byte message.
#[cfg(test)]
const fn padded_block_count(len: usize) -> usize {
    (len + 1 + LENGTH_FIELD_LEN).div_ceil(BLOCK_LEN)
}

/// Walks the padded block sequence of one message.
///
/// The cursor counts blocks remaining; once it reaches zero the lane owning
/// it is finished and must hold its state.
#[derive(Clone, Debug)]
pub(crate) struct BlockCursor<'a> {
    full: &'a [u8],
    tail: [u8; 2 * BLOCK_LEN],
    tail_blocks: usize,
    position: usize,
    remaining: usize,
}

impl<'a> BlockCursor<'a> {
    /// Prepares the padded block sequence for `message`.
    pub(crate) fn new(message: &'a [u8]) -> Self {
        let full_blocks = message.len() / BLOCK_LEN;
        let (full, rest) = message.split_at(full_blocks * BLOCK_LEN);

        let mut tail = [0u8; 2 * BLOCK_LEN];
        tail[..rest.len()].copy_from_slice(rest);
        tail[rest.len()] = 0x80;

        let tail_blocks = if rest.len() + 1 + LENGTH_FIELD_LEN > BLOCK_LEN {
            2
        } else {
            1
        };
        let tail_len = tail_blocks * BLOCK_LEN;
        let bit_len = (message.len() as u64).wrapping_mul(8);
        tail[tail_len - LENGTH_FIELD_LEN..tail_len].copy_from_slice(&bit_len.to_be_bytes());

        Self {
            full,
            tail,
            tail_blocks,
            position: 0,
            remaining: full_blocks + tail_blocks,
        }
    }

    /// Copies the next padded block into `out` and advances.
    ///
    /// Returns `false` without touching `out` when the message is exhausted.
    pub(crate) fn next_into(&mut self, out: &mut [u8; BLOCK_LEN]) -> bool {
        if self.remaining == 0 {
            return false;
        }

        let full_blocks = self.full.len() / BLOCK_LEN;
        let src = if self.position < full_blocks {
            let start = self.position * BLOCK_LEN;
            &self.full[start..start + BLOCK_LEN]
        } else {
            let start = (self.position - full_blocks) * BLOCK_LEN;
            debug_assert!(self.position - full_blocks < self.tail_blocks);
            &self.tail[start..start + BLOCK_LEN]
        };
        out.copy_from_slice(src);

        self.position += 1;
        self.remaining -= 1;
        true
    }
}

//! Page → block → content aggregation.

use sha256_batch::{Digest, digest};

use crate::{PAGES_PER_BLOCK, SEED, SIZE};

const DIGEST_LEN: usize = 32;

/// Concatenates page digests and hashes every full block of them.
#[derive(Debug)]
pub(crate) struct BlockAggregator {
    pending: Vec<u8>,
}

impl BlockAggregator {
    pub(crate) fn new() -> Self {
        Self {
            pending: Vec::with_capacity(PAGES_PER_BLOCK * DIGEST_LEN),
        }
    }

    /// Adds one page digest; returns the block digest once a block is full.
    pub(crate) fn push(&mut self, page: &Digest) -> Option<Digest> {
        self.pending.extend_from_slice(page);
        if self.pending.len() == PAGES_PER_BLOCK * DIGEST_LEN {
            let block = digest(&self.pending);
            self.pending.clear();
            Some(block)
        } else {
            None
        }
    }

    /// Hashes the trailing partial block, if any pages are pending.
    pub(crate) fn finish(self) -> Option<Digest> {
        (!self.pending.is_empty()).then(|| digest(&self.pending))
    }
}

/// Folds block digests into the final content identifier.
#[derive(Debug)]
pub(crate) struct ContentChain {
    buf: Vec<u8>,
}

impl ContentChain {
    /// Starts the chain with the first block digest.
    pub(crate) fn new(first: &Digest) -> Self {
        let mut buf = Vec::with_capacity(SEED.len() + 2 * DIGEST_LEN + 1);
        buf.extend_from_slice(SEED);
        buf.extend_from_slice(first);
        Self { buf }
    }

    /// Appends a non-final marker, rehashes, and carries `block` forward.
    pub(crate) fn push(&mut self, block: &Digest) {
        self.buf.push(0);
        let rolled = digest(&self.buf);
        self.buf.clear();
        self.buf.extend_from_slice(&rolled);
        self.buf.extend_from_slice(block);
    }

    /// Appends the final marker and produces the 33-byte identifier.
    pub(crate) fn finish(mut self) -> [u8; SIZE] {
        self.buf.push(1);
        let mut out = [0u8; SIZE];
        out[..DIGEST_LEN].copy_from_slice(&digest(&self.buf));
        out
    }
}

/// Collects page digests as they are produced and finishes the chain.
#[derive(Debug)]
pub(crate) struct Aggregator {
    blocks: BlockAggregator,
    chain: Option<ContentChain>,
    page_count: u64,
}

impl Aggregator {
    pub(crate) fn new() -> Self {
        Self {
            blocks: BlockAggregator::new(),
            chain: None,
            page_count: 0,
        }
    }

    pub(crate) fn push_page(&mut self, page: &Digest) {
        self.page_count += 1;
        if let Some(block) = self.blocks.push(page) {
            self.push_block(&block);
        }
    }

    fn push_block(&mut self, block: &Digest) {
        match self.chain.as_mut() {
            Some(chain) => chain.push(block),
            None => self.chain = Some(ContentChain::new(block)),
        }
    }

    pub(crate) const fn page_count(&self) -> u64 {
        self.page_count
    }

    /// Flushes the partial block and returns the content identifier.
    ///
    /// Input with no pages is a single block hashed over an empty page list.
    pub(crate) fn finish(mut self) -> [u8; SIZE] {
        let tail = if self.page_count == 0 {
            Some(digest(&[]))
        } else {
            std::mem::replace(&mut self.blocks, BlockAggregator::new()).finish()
        };
        if let Some(block) = tail {
            self.push_block(&block);
        }
        self.chain
            .unwrap_or_else(|| ContentChain::new(&digest(&[])))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_emitted_every_32_pages() {
        let mut blocks = BlockAggregator::new();
        for i in 0..PAGES_PER_BLOCK - 1 {
            assert!(blocks.push(&[i as u8; 32]).is_none());
        }
        let block = blocks.push(&[0xff; 32]).expect("full block");

        let mut concatenated = Vec::new();
        for i in 0..PAGES_PER_BLOCK - 1 {
            concatenated.extend_from_slice(&[i as u8; 32]);
        }
        concatenated.extend_from_slice(&[0xff; 32]);
        assert_eq!(block, digest(&concatenated));
        assert!(blocks.finish().is_none());
    }

    #[test]
    fn no_pages_is_one_empty_block() {
        let id = Aggregator::new().finish();
        assert_eq!(id, ContentChain::new(&digest(&[])).finish());
    }

    #[test]
    fn aggregator_counts_pages() {
        let mut aggregator = Aggregator::new();
        for _ in 0..PAGES_PER_BLOCK + 1 {
            aggregator.push_page(&[0; 32]);
        }
        assert_eq!(aggregator.page_count(), PAGES_PER_BLOCK as u64 + 1);
    }

    #[test]
    fn partial_block_is_flushed() {
        let mut blocks = BlockAggregator::new();
        assert!(blocks.push(&[3; 32]).is_none());
        assert_eq!(blocks.finish(), Some(digest(&[3; 32])));
    }

    #[test]
    fn chain_single_block_layout() {
        let block = [9u8; 32];
        let id = ContentChain::new(&block).finish();

        let mut expected_input = SEED.to_vec();
        expected_input.extend_from_slice(&block);
        expected_input.push(1);
        assert_eq!(&id[..32], &digest(&expected_input));
        assert_eq!(id[32], 0);
    }

    #[test]
    fn chain_two_blocks_layout() {
        let (first, second) = ([1u8; 32], [2u8; 32]);
        let mut chain = ContentChain::new(&first);
        chain.push(&second);
        let id = chain.finish();

        let mut step = SEED.to_vec();
        step.extend_from_slice(&first);
        step.push(0);
        let mut last = digest(&step).to_vec();
        last.extend_from_slice(&second);
        last.push(1);
        assert_eq!(&id[..32], &digest(&last));
    }
}

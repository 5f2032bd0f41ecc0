// Block index over the base buffer.
//
// The base is cut into fixed-size blocks (the last one may be short). Each
// block's weak hash keys a bucket holding every block with that checksum,
// together with the block's strong hash so the matcher can confirm a
// candidate without rehashing the base.
//
// Blocks are independent, so indexing is a parallel map into a concurrent
// multi-map when the `parallel` feature is on. Buckets are sorted by offset
// once construction finishes; the index is read-only afterwards.

use std::collections::HashMap;

use super::checksum::{StrongHash, strong_hash, weak_hash};

#[cfg(feature = "parallel")]
use dashmap::DashMap;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Bases smaller than this are always indexed on the calling thread.
pub const PARALLEL_THRESHOLD: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One indexed base block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEntry {
    /// Start of the block in the base.
    pub offset: u32,
    /// Block length (equal to the block size except for the last block).
    pub len: u32,
    /// SHA-256 of the block.
    pub strong: StrongHash,
}

impl BlockEntry {
    fn compute(offset: usize, block: &[u8]) -> Self {
        Self {
            offset: offset as u32,
            len: block.len() as u32,
            strong: strong_hash(block),
        }
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Weak hash -> base blocks carrying that hash.
#[derive(Debug, Default)]
pub struct BlockIndex {
    buckets: HashMap<u32, Vec<BlockEntry>>,
    block_size: usize,
    blocks: usize,
}

impl BlockIndex {
    /// Index `base` in blocks of `block_size` bytes.
    ///
    /// `parallel` requests the rayon pool; it is ignored for small bases and
    /// when the crate is built without the `parallel` feature.
    pub fn build(base: &[u8], block_size: usize, parallel: bool) -> Self {
        assert!(block_size > 0, "block size must be non-zero");

        #[cfg(feature = "parallel")]
        {
            if parallel && base.len() >= PARALLEL_THRESHOLD {
                return Self::build_parallel(base, block_size);
            }
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel;

        Self::build_sequential(base, block_size)
    }

    fn build_sequential(base: &[u8], block_size: usize) -> Self {
        let mut buckets: HashMap<u32, Vec<BlockEntry>> = HashMap::new();
        let mut blocks = 0;
        for (i, block) in base.chunks(block_size).enumerate() {
            buckets
                .entry(weak_hash(block))
                .or_default()
                .push(BlockEntry::compute(i * block_size, block));
            blocks += 1;
        }
        Self {
            buckets,
            block_size,
            blocks,
        }
    }

    #[cfg(feature = "parallel")]
    fn build_parallel(base: &[u8], block_size: usize) -> Self {
        let map: DashMap<u32, Vec<BlockEntry>> = DashMap::new();
        base.par_chunks(block_size)
            .enumerate()
            .for_each(|(i, block)| {
                let entry = BlockEntry::compute(i * block_size, block);
                map.entry(weak_hash(block)).or_default().push(entry);
            });

        // Insertion order within a bucket depends on scheduling; sort so
        // lookups see candidates in base order.
        let buckets: HashMap<u32, Vec<BlockEntry>> = map
            .into_iter()
            .map(|(weak, mut entries)| {
                entries.sort_unstable_by_key(|e| e.offset);
                (weak, entries)
            })
            .collect();

        Self {
            buckets,
            block_size,
            blocks: base.len().div_ceil(block_size),
        }
    }

    /// Blocks whose weak hash equals `weak`, in base order.
    #[inline]
    pub fn candidates(&self, weak: u32) -> &[BlockEntry] {
        self.buckets.get(&weak).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Block size the index was built with.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of indexed blocks.
    pub fn block_count(&self) -> usize {
        self.blocks
    }

    /// Number of distinct weak hashes.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the index holds no blocks (empty base).
    pub fn is_empty(&self) -> bool {
        self.blocks == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

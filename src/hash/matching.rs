// Coarse block matching.
//
// Slides a block-sized window over the target:
//   1. Look the window's weak hash up in the base block index
//   2. Confirm each candidate with the strong hash
//   3. On a match, flush pending literal bytes, emit a COPY, jump past it
//   4. Otherwise advance by a single byte and try again
//
// The single-byte step lets out-of-alignment blocks be found eventually.
// A rolling weak hash keeps each step O(1) until a candidate shows up.

use super::checksum::{StrongHash, strong_hash, weak_hash};
use super::rolling::RollingChecksum;
use super::table::BlockIndex;
use crate::delta::command::Command;

// ---------------------------------------------------------------------------
// Block matcher
// ---------------------------------------------------------------------------

/// Block matcher over one base buffer.
pub struct BlockMatcher<'a> {
    base: &'a [u8],
    index: BlockIndex,
}

impl<'a> BlockMatcher<'a> {
    /// Index `base` with the given block size.
    pub fn new(base: &'a [u8], block_size: usize, parallel: bool) -> Self {
        let index = BlockIndex::build(base, block_size, parallel);
        log::debug!(
            "indexed {} base blocks of {} bytes into {} buckets",
            index.block_count(),
            block_size,
            index.bucket_count()
        );
        Self { base, index }
    }

    pub fn block_size(&self) -> usize {
        self.index.block_size()
    }

    /// Produce the coarse command list for `target`.
    ///
    /// COPY commands cover whole confirmed blocks (or a target tail that
    /// matched a base prefix of the same length); everything else is left
    /// in LITERAL commands for the refinement pass.
    pub fn find_matches(&self, target: &[u8]) -> Vec<Command> {
        let mut commands = Vec::new();
        if target.is_empty() {
            return commands;
        }
        if self.index.is_empty() {
            commands.push(Command::literal(target.to_vec()));
            return commands;
        }

        let block_size = self.block_size();
        let mut pos = 0usize;
        let mut literal_start = 0usize;
        let mut size = block_size.min(target.len());
        let mut rolling = RollingChecksum::new(&target[..size]);

        while pos < target.len() {
            let window = &target[pos..pos + size];
            debug_assert_eq!(rolling.digest(), weak_hash(window));

            if let Some(offset) = self.confirm(window, rolling.digest()) {
                if pos > literal_start {
                    commands.push(Command::literal(target[literal_start..pos].to_vec()));
                }
                log::trace!("block match: target {pos} -> base {offset} ({size} bytes)");
                commands.push(Command::copy(offset, size as u32));

                pos += size;
                literal_start = pos;
                if pos < target.len() {
                    size = block_size.min(target.len() - pos);
                    rolling = RollingChecksum::new(&target[pos..pos + size]);
                }
                continue;
            }

            // No match: slide the window one byte.
            let next_size = block_size.min(target.len() - pos - 1);
            if next_size == size {
                rolling.roll(target[pos], target[pos + size]);
            } else {
                rolling.shrink(target[pos]);
            }
            pos += 1;
            size = next_size;
        }

        if literal_start < target.len() {
            commands.push(Command::literal(target[literal_start..].to_vec()));
        }
        commands
    }

    /// First base offset whose bytes equal `window`, confirmed by strong hash.
    fn confirm(&self, window: &[u8], weak: u32) -> Option<u32> {
        let candidates = self.index.candidates(weak);
        if candidates.is_empty() {
            return None;
        }

        let size = window.len();
        let window_strong: StrongHash = strong_hash(window);
        for entry in candidates {
            let start = entry.offset as usize;
            if start + size > self.base.len() {
                continue;
            }
            let equal = if entry.len as usize == size {
                entry.strong == window_strong
            } else {
                strong_hash(&self.base[start..start + size]) == window_strong
            };
            if equal {
                return Some(entry.offset);
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

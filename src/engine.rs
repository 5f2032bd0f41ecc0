// Delta engine: ties block matching, refinement and merging together.
//
// Pipeline for `calculate_delta`:
//   - Identity short-circuit (equal length + equal SHA-256 -> one COPY)
//   - Coarse block matching against a weak/strong hash index of the base
//   - Refinement of the remaining literals with a longest-match index
//   - Merging of adjacent mergeable commands
//
// `apply_delta` replays the result through the patch applier.

use std::time::Instant;

use serde::Serialize;

use crate::delta::apply::{self, ApplyError};
use crate::delta::command::{Command, Delta};
use crate::delta::merge::merge_commands;
use crate::delta::refine::refine;
use crate::hash::checksum::strong_hash;
use crate::hash::config::{DeltaConfig, MAX_INPUT_LEN, MatchBackend};
use crate::hash::matching::BlockMatcher;
use crate::suffix::{SuffixAutomaton, SuffixIndex};

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Summary of one delta computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeltaStats {
    pub base_len: u64,
    pub target_len: u64,
    /// Coarse block size (0 when the identity short-circuit fired).
    pub block_size: usize,
    pub coarse_commands: usize,
    pub refined_commands: usize,
    /// Commands in the final, merged delta.
    pub commands: usize,
    pub copy_bytes: u64,
    pub literal_bytes: u64,
    /// Base and target were identical.
    pub identical: bool,
}

// ---------------------------------------------------------------------------
// High-level API
// ---------------------------------------------------------------------------

/// Compute a delta turning `base` into `target` with the default settings.
pub fn calculate_delta(base: &[u8], target: &[u8]) -> Delta {
    calculate_delta_with_options(base, target, &DeltaConfig::default())
}

/// Compute a delta with custom settings.
pub fn calculate_delta_with_options(base: &[u8], target: &[u8], config: &DeltaConfig) -> Delta {
    calculate_delta_with_stats(base, target, config).0
}

/// Compute a delta and report what each stage produced.
///
/// Panics if either input is longer than [`MAX_INPUT_LEN`].
pub fn calculate_delta_with_stats(
    base: &[u8],
    target: &[u8],
    config: &DeltaConfig,
) -> (Delta, DeltaStats) {
    assert!(
        base.len() <= MAX_INPUT_LEN,
        "base of {} bytes exceeds the {MAX_INPUT_LEN}-byte limit",
        base.len()
    );
    assert!(
        target.len() <= MAX_INPUT_LEN,
        "target of {} bytes exceeds the {MAX_INPUT_LEN}-byte limit",
        target.len()
    );

    let start = Instant::now();
    let mut stats = DeltaStats {
        base_len: base.len() as u64,
        target_len: target.len() as u64,
        ..DeltaStats::default()
    };

    if base.len() == target.len() && strong_hash(base) == strong_hash(target) {
        log::debug!("inputs identical ({} bytes), emitting a single copy", base.len());
        let delta = Delta::from_commands(vec![Command::copy(0, base.len() as u32)]);
        stats.identical = true;
        stats.coarse_commands = 1;
        stats.refined_commands = 1;
        fill_totals(&mut stats, &delta);
        return (delta, stats);
    }

    let block_size = config.block_size(base.len());
    stats.block_size = block_size;
    let matcher = BlockMatcher::new(base, block_size, config.parallel_index);
    let coarse = matcher.find_matches(target);
    stats.coarse_commands = coarse.len();
    log::debug!(
        "coarse pass: {} commands with {block_size}-byte blocks",
        coarse.len()
    );

    let refined = if config.refine && !base.is_empty() && coarse.iter().any(Command::is_literal) {
        match config.backend {
            MatchBackend::SuffixArray => refine(&SuffixIndex::new(base), coarse, config.min_match),
            MatchBackend::SuffixAutomaton => {
                refine(&SuffixAutomaton::new(base), coarse, config.min_match)
            }
        }
    } else {
        coarse
    };
    stats.refined_commands = refined.len();
    log::debug!(
        "refine pass ({}): {} commands",
        config.backend.name(),
        refined.len()
    );

    let delta = Delta::from_commands(merge_commands(refined));
    fill_totals(&mut stats, &delta);
    log::debug!(
        "delta: {} commands, {} copied, {} literal bytes in {:.2?}",
        stats.commands,
        stats.copy_bytes,
        stats.literal_bytes,
        start.elapsed()
    );
    (delta, stats)
}

fn fill_totals(stats: &mut DeltaStats, delta: &Delta) {
    stats.commands = delta.len();
    stats.copy_bytes = delta.copy_bytes();
    stats.literal_bytes = delta.literal_bytes();
}

/// Rebuild the target from `base` and `delta`.
pub fn apply_delta(base: &[u8], delta: &Delta) -> Result<Vec<u8>, ApplyError> {
    apply::apply_delta(base, delta.commands())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

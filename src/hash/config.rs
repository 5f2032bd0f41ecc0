// Delta tuning profiles.
//
// Each profile defines the parameters for the coarse block pass and the
// suffix refinement pass.

/// Refinement keeps a match only if it is strictly longer than this.
pub const MIN_MATCH: usize = 4;

/// Smallest block size on the staircase.
pub const MIN_BLOCK_SIZE: usize = 512;

/// Largest block size on the staircase (64 KiB).
pub const MAX_BLOCK_SIZE: usize = 64 * 1024;

/// Largest base or target buffer accepted by the engine.
///
/// Copy offsets are 32-bit and the longest-match query reports offsets as
/// `i32`, so both buffers must stay below `i32::MAX` bytes.
pub const MAX_INPUT_LEN: usize = i32::MAX as usize;

/// Block size for a base buffer of `len` bytes.
///
/// - < 1 MB   => 512 B
/// - < 10 MB  => 2 KiB
/// - < 100 MB => 8 KiB
/// - otherwise 64 KiB
pub fn block_size_for(len: usize) -> usize {
    if len < 1_000_000 {
        MIN_BLOCK_SIZE
    } else if len < 10_000_000 {
        2 * 1024
    } else if len < 100_000_000 {
        8 * 1024
    } else {
        MAX_BLOCK_SIZE
    }
}

/// Longest-match structure used by the refinement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchBackend {
    /// Suffix array built with SA-IS, queried by binary search.
    #[default]
    SuffixArray,
    /// Suffix automaton over the base, queried by a forward walk.
    SuffixAutomaton,
}

impl MatchBackend {
    pub fn name(self) -> &'static str {
        match self {
            Self::SuffixArray => "suffix-array",
            Self::SuffixAutomaton => "suffix-automaton",
        }
    }
}

/// Delta profile configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaConfig {
    /// Name for display purposes.
    pub name: &'static str,
    /// Fixed block size; `None` picks one from the base length.
    pub block_size: Option<usize>,
    /// Minimum refinement match length (exclusive).
    pub min_match: usize,
    /// Run the suffix refinement pass over coarse literals.
    pub refine: bool,
    /// Index base blocks on the rayon pool (needs the `parallel` feature).
    pub parallel_index: bool,
    /// Longest-match structure for refinement.
    pub backend: MatchBackend,
}

impl DeltaConfig {
    /// Block size used for a base of `base_len` bytes.
    pub fn block_size(&self, base_len: usize) -> usize {
        match self.block_size {
            Some(size) => size.max(1),
            None => block_size_for(base_len),
        }
    }
}

impl Default for DeltaConfig {
    fn default() -> Self {
        DEFAULT
    }
}

/// Delta levels mapping to profiles.
///
/// - Level 0: block matching only
/// - Levels 1+: block matching + suffix refinement
pub fn config_for_level(level: u32) -> DeltaConfig {
    match level {
        0 => FAST,
        _ => DEFAULT,
    }
}

// ---------------------------------------------------------------------------
// Profile definitions
// ---------------------------------------------------------------------------

pub const FAST: DeltaConfig = DeltaConfig {
    name: "fast",
    block_size: None,
    min_match: MIN_MATCH,
    refine: false,
    parallel_index: true,
    backend: MatchBackend::SuffixArray,
};

pub const DEFAULT: DeltaConfig = DeltaConfig {
    name: "default",
    block_size: None,
    min_match: MIN_MATCH,
    refine: true,
    parallel_index: true,
    backend: MatchBackend::SuffixArray,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staircase_boundaries() {
        assert_eq!(block_size_for(0), 512);
        assert_eq!(block_size_for(999_999), 512);
        assert_eq!(block_size_for(1_000_000), 2048);
        assert_eq!(block_size_for(9_999_999), 2048);
        assert_eq!(block_size_for(10_000_000), 8192);
        assert_eq!(block_size_for(99_999_999), 8192);
        assert_eq!(block_size_for(100_000_000), 65536);
        assert_eq!(block_size_for(usize::MAX), MAX_BLOCK_SIZE);
    }

    #[test]
    fn explicit_block_size_wins() {
        let cfg = DeltaConfig {
            block_size: Some(16),
            ..DEFAULT
        };
        assert_eq!(cfg.block_size(50_000_000), 16);

        let zero = DeltaConfig {
            block_size: Some(0),
            ..DEFAULT
        };
        assert_eq!(zero.block_size(10), 1);
    }

    #[test]
    fn level_mapping() {
        assert_eq!(config_for_level(0).name, "fast");
        assert!(!config_for_level(0).refine);
        for level in [1, 5, 9] {
            assert_eq!(config_for_level(level).name, "default");
        }
        assert_eq!(DeltaConfig::default(), DEFAULT);
    }

    #[test]
    fn default_profile_thresholds() {
        for p in [FAST, DEFAULT] {
            assert_eq!(p.min_match, MIN_MATCH, "profile {} has wrong min_match", p.name);
            assert_eq!(p.backend, MatchBackend::SuffixArray);
        }
    }
}

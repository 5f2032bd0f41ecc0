// Longest-match structures over the base buffer.
//
// The refinement pass asks one question of the base: "what is the longest
// prefix of this probe that occurs somewhere in the base, and where?".
// Two structures answer it:
// - `SuffixIndex`: SA-IS suffix array + binary search (default)
// - `SuffixAutomaton`: suffix automaton + forward walk

pub mod automaton;
pub mod index;
pub mod sais;

pub use automaton::SuffixAutomaton;
pub use index::SuffixIndex;

// ---------------------------------------------------------------------------
// Match result
// ---------------------------------------------------------------------------

/// Location and length of a match in the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    /// Start of the match in the base, or -1 when nothing matched.
    pub offset: i32,
    /// Number of matching bytes.
    pub length: u32,
}

impl MatchResult {
    /// No byte of the probe occurs in the base.
    pub const NONE: MatchResult = MatchResult {
        offset: -1,
        length: 0,
    };

    /// Replace `self` with (`offset`, `length`) if it is strictly longer.
    ///
    /// Ties keep the earlier candidate.
    #[inline]
    pub(crate) fn consider(&mut self, offset: usize, length: usize) {
        if length > self.length as usize {
            self.offset = offset as i32;
            self.length = length as u32;
        }
    }
}

// ---------------------------------------------------------------------------
// Longest-match trait
// ---------------------------------------------------------------------------

/// Longest-prefix lookup against an indexed base buffer.
pub trait LongestMatch {
    /// Longest prefix of `probe[probe_start..]` occurring in the base.
    ///
    /// Returns `MatchResult::NONE` when `probe_start` is out of bounds or
    /// no byte matches. Among equally long matches, which offset is
    /// reported is unspecified.
    fn find_longest_match(&self, probe: &[u8], probe_start: usize) -> MatchResult;

    /// Length of the indexed base.
    fn base_len(&self) -> usize;
}

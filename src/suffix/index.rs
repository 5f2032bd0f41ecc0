// Suffix index: longest-match queries over a suffix array.
//
// The suffix array is searched for the insertion point of the probe. Every
// suffix compared on the way is a match candidate. The longest common
// prefix with any suffix is attained next to the insertion point, so the
// two slots around it are checked once the search settles.

use std::cmp::Ordering;

use super::sais;
use super::{LongestMatch, MatchResult};

/// Suffix array over a borrowed base buffer.
pub struct SuffixIndex<'a> {
    data: &'a [u8],
    sa: Vec<u32>,
}

impl<'a> SuffixIndex<'a> {
    /// Build the suffix array of `data` with SA-IS.
    pub fn new(data: &'a [u8]) -> Self {
        let sa = sais::suffix_array(data);
        log::debug!("built suffix array over {} bytes", data.len());
        Self { data, sa }
    }

    /// The raw suffix array (`data.len() + 1` entries, sentinel first).
    pub fn suffix_array(&self) -> &[u32] {
        &self.sa
    }

    /// Compare `probe` with the suffix at `suffix`.
    ///
    /// `Equal` means the whole probe is a prefix of the suffix. A suffix
    /// that runs out first is a proper prefix of the probe and sorts before
    /// it. Also returns the common prefix length.
    #[inline]
    fn compare(&self, probe: &[u8], suffix: usize) -> (Ordering, usize) {
        let text = &self.data[suffix..];
        let lcp = common_prefix_len(probe, text);
        let ord = if lcp == probe.len() {
            Ordering::Equal
        } else if lcp == text.len() {
            Ordering::Greater
        } else {
            probe[lcp].cmp(&text[lcp])
        };
        (ord, lcp)
    }
}

impl LongestMatch for SuffixIndex<'_> {
    fn find_longest_match(&self, probe: &[u8], probe_start: usize) -> MatchResult {
        if probe_start >= probe.len() {
            return MatchResult::NONE;
        }
        let probe = &probe[probe_start..];
        let mut best = MatchResult::NONE;

        let mut lo = 0usize;
        let mut hi = self.sa.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let pos = self.sa[mid] as usize;
            let (ord, lcp) = self.compare(probe, pos);
            best.consider(pos, lcp);
            match ord {
                // The whole probe matched; nothing can be longer.
                Ordering::Equal => return best,
                Ordering::Less => hi = mid,
                Ordering::Greater => lo = mid + 1,
            }
        }

        // `lo` is the insertion point: its neighbours share the longest
        // prefix with the probe.
        for slot in [lo.checked_sub(1), Some(lo)].into_iter().flatten() {
            if let Some(&pos) = self.sa.get(slot) {
                let (_, lcp) = self.compare(probe, pos as usize);
                best.consider(pos as usize, lcp);
            }
        }
        best
    }

    fn base_len(&self) -> usize {
        self.data.len()
    }
}

/// Number of leading bytes `a` and `b` have in common.
#[inline]
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    const CHUNK: usize = 16;
    let max = a.len().min(b.len());
    let mut i = 0;
    while i + CHUNK <= max && a[i..i + CHUNK] == b[i..i + CHUNK] {
        i += CHUNK;
    }
    while i < max && a[i] == b[i] {
        i += 1;
    }
    i
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Longest prefix of `probe` found anywhere in `data`, by brute force.
    fn brute_force_len(data: &[u8], probe: &[u8]) -> usize {
        (0..=data.len())
            .map(|i| common_prefix_len(probe, &data[i..]))
            .max()
            .unwrap_or(0)
    }

    fn check(data: &[u8], probe: &[u8], start: usize) -> MatchResult {
        let index = SuffixIndex::new(data);
        let m = index.find_longest_match(probe, start);
        let expected = brute_force_len(data, &probe[start..]);
        assert_eq!(m.length as usize, expected, "length for probe at {start}");
        if m.length > 0 {
            let off = m.offset as usize;
            let len = m.length as usize;
            assert_eq!(&data[off..off + len], &probe[start..start + len]);
        } else {
            assert_eq!(m, MatchResult::NONE);
        }
        m
    }

    #[test]
    fn exposes_suffix_array() {
        let index = SuffixIndex::new(b"banana");
        assert_eq!(index.suffix_array(), &[6, 5, 3, 1, 0, 4, 2]);
        assert_eq!(index.base_len(), 6);
    }

    #[test]
    fn out_of_bounds_start_is_none() {
        let index = SuffixIndex::new(b"banana");
        assert_eq!(index.find_longest_match(b"ana", 3), MatchResult::NONE);
        assert_eq!(index.find_longest_match(b"", 0), MatchResult::NONE);
    }

    #[test]
    fn no_overlap_is_none() {
        let index = SuffixIndex::new(b"banana");
        assert_eq!(index.find_longest_match(b"xyz", 0), MatchResult::NONE);
    }

    #[test]
    fn empty_base_never_matches() {
        let index = SuffixIndex::new(b"");
        assert_eq!(index.find_longest_match(b"abc", 0), MatchResult::NONE);
    }

    #[test]
    fn full_probe_match() {
        let m = check(b"the quick brown fox", b"quick", 0);
        assert_eq!(m, MatchResult { offset: 4, length: 5 });
    }

    #[test]
    fn partial_match_respects_start() {
        let m = check(b"banana", b"xxnanx", 2);
        assert_eq!(m.length, 3);
        assert_eq!(m.offset, 2);
    }

    #[test]
    fn suffix_shorter_than_probe() {
        // Best match runs off the end of the base.
        let m = check(b"hello world", b"worldwide", 0);
        assert_eq!(m, MatchResult { offset: 6, length: 5 });
    }

    #[test]
    fn longest_match_not_on_search_path() {
        // "ab" at the end of the base, "abb" and "abcd" earlier: the best
        // candidate for "abce" is only found next to the insertion point.
        check(b"abcdabbab", b"abce", 0);
        check(b"abbabcdab", b"abcz", 0);
        check(b"zzabcabdabcde", b"abcdx", 0);
    }

    #[test]
    fn repeated_base() {
        let base = vec![b'a'; 1000];
        let m = check(&base, &[b'a'; 50], 0);
        assert_eq!(m.length, 50);
        let m = check(&base, b"aaab", 0);
        assert_eq!(m.length, 3);
    }

    #[test]
    fn matches_brute_force_on_generated_data() {
        let mut s = 7u64;
        let mut next = || {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((s >> 33) % 4) as u8
        };
        let data: Vec<u8> = (0..500).map(|_| next()).collect();
        let probe: Vec<u8> = (0..200).map(|_| next()).collect();
        for start in 0..probe.len() {
            check(&data, &probe, start);
        }
    }

    #[test]
    fn common_prefix_len_chunked() {
        let a: Vec<u8> = (0..100).collect();
        let mut b = a.clone();
        assert_eq!(common_prefix_len(&a, &b), 100);
        b[37] = 0xFF;
        assert_eq!(common_prefix_len(&a, &b), 37);
        assert_eq!(common_prefix_len(&a[..10], &b), 10);
        assert_eq!(common_prefix_len(&[], &b), 0);
    }
}

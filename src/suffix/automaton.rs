// Suffix automaton over the base buffer.
//
// Built online in O(n) states. Each state records the end position of the
// first occurrence of the strings it represents, so a walk from the root
// that consumes `len` probe bytes and stops in state `s` locates the match
// at `first_end(s) + 1 - len`.
//
// Transitions are stored as small sorted edge lists; most states have very
// few out-edges, which keeps the structure compact for large bases.

use super::{LongestMatch, MatchResult};

const ROOT: u32 = 0;
const NO_LINK: u32 = u32::MAX;

#[derive(Debug, Clone)]
struct State {
    /// Length of the longest string in this state.
    len: u32,
    /// Suffix link.
    link: u32,
    /// End position of the first occurrence.
    first_end: u32,
    /// Out-edges sorted by byte.
    next: Vec<(u8, u32)>,
}

impl State {
    #[inline]
    fn transition(&self, byte: u8) -> Option<u32> {
        self.next
            .binary_search_by_key(&byte, |&(b, _)| b)
            .ok()
            .map(|i| self.next[i].1)
    }

    #[inline]
    fn set_transition(&mut self, byte: u8, target: u32) {
        match self.next.binary_search_by_key(&byte, |&(b, _)| b) {
            Ok(i) => self.next[i].1 = target,
            Err(i) => self.next.insert(i, (byte, target)),
        }
    }
}

/// Suffix automaton of a base buffer.
pub struct SuffixAutomaton {
    states: Vec<State>,
    last: u32,
    base_len: usize,
}

impl SuffixAutomaton {
    /// Build the automaton of `data`.
    pub fn new(data: &[u8]) -> Self {
        assert!(
            data.len() < (u32::MAX / 2) as usize,
            "input of {} bytes is too large for the suffix automaton",
            data.len()
        );

        let mut states = Vec::with_capacity(2 * data.len() + 1);
        states.push(State {
            len: 0,
            link: NO_LINK,
            first_end: 0,
            next: Vec::new(),
        });
        let mut automaton = Self {
            states,
            last: ROOT,
            base_len: data.len(),
        };
        for (pos, &byte) in data.iter().enumerate() {
            automaton.extend(byte, pos as u32);
        }
        log::debug!(
            "built suffix automaton over {} bytes ({} states)",
            data.len(),
            automaton.states.len()
        );
        automaton
    }

    /// Number of states (at most `2n - 1` for n >= 2).
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    fn extend(&mut self, byte: u8, pos: u32) {
        let cur = self.states.len() as u32;
        self.states.push(State {
            len: self.states[self.last as usize].len + 1,
            link: NO_LINK,
            first_end: pos,
            next: Vec::new(),
        });

        // Walk suffix links adding the new edge until a state already has one.
        let mut p = self.last;
        let found = loop {
            if p == NO_LINK {
                break None;
            }
            let state = &mut self.states[p as usize];
            if let Some(q) = state.transition(byte) {
                break Some(q);
            }
            state.set_transition(byte, cur);
            p = state.link;
        };

        match found {
            None => self.states[cur as usize].link = ROOT,
            Some(q) => {
                if self.states[p as usize].len + 1 == self.states[q as usize].len {
                    self.states[cur as usize].link = q;
                } else {
                    let clone = self.states.len() as u32;
                    let mut cloned = self.states[q as usize].clone();
                    cloned.len = self.states[p as usize].len + 1;
                    self.states.push(cloned);

                    while p != NO_LINK && self.states[p as usize].transition(byte) == Some(q) {
                        self.states[p as usize].set_transition(byte, clone);
                        p = self.states[p as usize].link;
                    }
                    self.states[q as usize].link = clone;
                    self.states[cur as usize].link = clone;
                }
            }
        }
        self.last = cur;
    }
}

impl LongestMatch for SuffixAutomaton {
    fn find_longest_match(&self, probe: &[u8], probe_start: usize) -> MatchResult {
        if probe_start >= probe.len() {
            return MatchResult::NONE;
        }

        let mut state = ROOT;
        let mut len = 0usize;
        for &byte in &probe[probe_start..] {
            match self.states[state as usize].transition(byte) {
                Some(next) => {
                    state = next;
                    len += 1;
                }
                None => break,
            }
        }

        if len == 0 {
            return MatchResult::NONE;
        }
        let end = self.states[state as usize].first_end as usize;
        MatchResult {
            offset: (end + 1 - len) as i32,
            length: len as u32,
        }
    }

    fn base_len(&self) -> usize {
        self.base_len
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

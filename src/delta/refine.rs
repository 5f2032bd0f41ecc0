// Match refinement.
//
// Block matching only finds copies aligned to whole blocks. Every literal
// it leaves behind is rescanned here: at each unconsumed position the base
// is asked for the longest match, and any match longer than the threshold
// splits the literal into literal / COPY / literal pieces. Coarse COPY
// commands pass through untouched.

use super::command::Command;
use crate::suffix::LongestMatch;

/// Refine `coarse` against the base indexed by `matcher`.
///
/// Only matches strictly longer than `min_match` bytes become copies.
pub fn refine<M: LongestMatch + ?Sized>(
    matcher: &M,
    coarse: Vec<Command>,
    min_match: usize,
) -> Vec<Command> {
    let mut refined = Vec::with_capacity(coarse.len());
    for cmd in coarse {
        match cmd {
            Command::Literal { data, .. } => refine_literal(matcher, data, min_match, &mut refined),
            copy => refined.push(copy),
        }
    }
    refined
}

fn refine_literal<M: LongestMatch + ?Sized>(
    matcher: &M,
    data: Vec<u8>,
    min_match: usize,
    out: &mut Vec<Command>,
) {
    let mut current = 0usize;
    let mut last = 0usize;
    let mut found = false;

    while current < data.len() {
        let m = matcher.find_longest_match(&data, current);
        let len = m.length as usize;
        if len > min_match {
            debug_assert!(m.offset >= 0);
            debug_assert!(m.offset as usize + len <= matcher.base_len());
            if current > last {
                out.push(Command::literal(data[last..current].to_vec()));
            }
            log::trace!("refined match: literal +{current} -> base {} ({len} bytes)", m.offset);
            out.push(Command::copy(m.offset as u32, m.length));
            current += len;
            last = current;
            found = true;
        } else {
            current += 1;
        }
    }

    if !found {
        // Nothing matched; keep the original allocation.
        out.push(Command::literal(data));
    } else if last < data.len() {
        out.push(Command::literal(data[last..].to_vec()));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Suffix array construction by induced sorting (SA-IS).
//
// The byte buffer is lifted into an integer alphabet: every byte is
// shifted up by one and a sentinel 0 is appended, so the sentinel suffix
// sorts first and every comparison terminates. Construction then:
//   1. Classifies positions as S-type or L-type (right to left)
//   2. Seeds LMS positions at the tails of their character buckets
//   3. Induces L-type suffixes left to right, S-type right to left
//   4. Names LMS substrings; equal substrings share a name
//   5. Recurses on the name string when names are not unique
//   6. Reseeds the sorted LMS suffixes and induces the final order
//
// Linear time and space in the input length. Each level of recursion works
// on at most half the positions of the previous one.

/// Marks an unfilled suffix-array slot.
const EMPTY: u32 = u32::MAX;

/// Number of symbols in the lifted byte alphabet (sentinel + 256 bytes).
pub const BYTE_ALPHABET: usize = 257;

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Suffix array of `data` plus its end sentinel.
///
/// The result has `data.len() + 1` entries; the first is always
/// `data.len()` (the sentinel suffix).
pub fn suffix_array(data: &[u8]) -> Vec<u32> {
    assert!(
        data.len() < EMPTY as usize,
        "input of {} bytes is too large for a 32-bit suffix array",
        data.len()
    );

    let mut text: Vec<u32> = Vec::with_capacity(data.len() + 1);
    text.extend(data.iter().map(|&b| u32::from(b) + 1));
    text.push(0);

    let mut sa = vec![EMPTY; text.len()];
    sais(&text, &mut sa, BYTE_ALPHABET);
    sa
}

/// Suffix array of an integer string over `0..alphabet`.
///
/// `text` must end with a unique 0 sentinel; `sa` must have the same length.
pub fn sais(text: &[u32], sa: &mut [u32], alphabet: usize) {
    let n = text.len();
    assert_eq!(sa.len(), n, "suffix array buffer has wrong length");
    assert!(alphabet > 0, "empty alphabet");
    assert_eq!(text.last(), Some(&0), "text must end with the 0 sentinel");
    debug_assert!(text[..n - 1].iter().all(|&c| c != 0 && (c as usize) < alphabet));

    match n {
        1 => {
            sa[0] = 0;
            return;
        }
        2 => {
            sa[0] = 1;
            sa[1] = 0;
            return;
        }
        _ => {}
    }

    let types = classify(text);
    let counts = bucket_counts(text, alphabet);

    // Seed LMS positions in text order, then induce an approximate order in
    // which every LMS substring is correctly sorted.
    sa.fill(EMPTY);
    let mut tails = bucket_tails(&counts);
    for i in 1..n {
        if types.is_lms(i) {
            let c = text[i] as usize;
            tails[c] -= 1;
            sa[tails[c] as usize] = i as u32;
        }
    }
    induce(text, sa, &types, &counts);

    // Compact sorted LMS positions into the front of `sa`.
    let mut lms_count = 0;
    for i in 0..n {
        let p = sa[i];
        if types.is_lms(p as usize) {
            sa[lms_count] = p;
            lms_count += 1;
        }
    }

    let (names, name_count) = name_lms_substrings(text, &types, &sa[..lms_count]);

    // Reduced string: LMS names in text order. The sentinel is the last LMS
    // position and the only one named 0.
    let lms_positions: Vec<u32> = (1..n).filter(|&i| types.is_lms(i)).map(|i| i as u32).collect();
    debug_assert_eq!(lms_positions.len(), lms_count);
    let reduced: Vec<u32> = lms_positions
        .iter()
        .map(|&p| names[p as usize])
        .collect();
    drop(names);

    let mut reduced_sa = vec![EMPTY; lms_count];
    if name_count < lms_count {
        sais(&reduced, &mut reduced_sa, name_count);
    } else {
        for (i, &name) in reduced.iter().enumerate() {
            reduced_sa[name as usize] = i as u32;
        }
    }

    // Reseed the bucket tails with LMS suffixes in their final order.
    sa.fill(EMPTY);
    let mut tails = bucket_tails(&counts);
    for &r in reduced_sa.iter().rev() {
        let p = lms_positions[r as usize];
        let c = text[p as usize] as usize;
        tails[c] -= 1;
        sa[tails[c] as usize] = p;
    }
    induce(text, sa, &types, &counts);
}

// ---------------------------------------------------------------------------
// Position types
// ---------------------------------------------------------------------------

/// S/L classification of every position.
struct Types {
    is_s: Vec<bool>,
}

impl Types {
    #[inline(always)]
    fn is_s(&self, i: usize) -> bool {
        self.is_s[i]
    }

    /// Leftmost S-type: S-type with an L-type left neighbour.
    #[inline(always)]
    fn is_lms(&self, i: usize) -> bool {
        i > 0 && i < self.is_s.len() && self.is_s[i] && !self.is_s[i - 1]
    }
}

fn classify(text: &[u32]) -> Types {
    let n = text.len();
    let mut is_s = vec![false; n];
    is_s[n - 1] = true;
    for i in (0..n - 1).rev() {
        is_s[i] = text[i] < text[i + 1] || (text[i] == text[i + 1] && is_s[i + 1]);
    }
    Types { is_s }
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

fn bucket_counts(text: &[u32], alphabet: usize) -> Vec<u32> {
    let mut counts = vec![0u32; alphabet];
    for &c in text {
        counts[c as usize] += 1;
    }
    counts
}

/// First slot of every character bucket.
fn bucket_heads(counts: &[u32]) -> Vec<u32> {
    let mut sum = 0;
    counts
        .iter()
        .map(|&c| {
            let head = sum;
            sum += c;
            head
        })
        .collect()
}

/// One past the last slot of every character bucket.
fn bucket_tails(counts: &[u32]) -> Vec<u32> {
    let mut sum = 0;
    counts
        .iter()
        .map(|&c| {
            sum += c;
            sum
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Induced sorting
// ---------------------------------------------------------------------------

/// Induce L-type suffixes left to right, then S-type suffixes right to left.
fn induce(text: &[u32], sa: &mut [u32], types: &Types, counts: &[u32]) {
    let n = text.len();

    let mut heads = bucket_heads(counts);
    for i in 0..n {
        let p = sa[i];
        if p == EMPTY || p == 0 {
            continue;
        }
        let j = p as usize - 1;
        if !types.is_s(j) {
            let c = text[j] as usize;
            sa[heads[c] as usize] = j as u32;
            heads[c] += 1;
        }
    }

    let mut tails = bucket_tails(counts);
    for i in (0..n).rev() {
        let p = sa[i];
        if p == EMPTY || p == 0 {
            continue;
        }
        let j = p as usize - 1;
        if types.is_s(j) {
            let c = text[j] as usize;
            tails[c] -= 1;
            sa[tails[c] as usize] = j as u32;
        }
    }
}

// ---------------------------------------------------------------------------
// LMS naming
// ---------------------------------------------------------------------------

/// Assign names to LMS substrings given in sorted order.
///
/// Returns a position-indexed name table (only LMS slots are meaningful)
/// and the number of distinct names.
fn name_lms_substrings(text: &[u32], types: &Types, sorted_lms: &[u32]) -> (Vec<u32>, usize) {
    let mut names = vec![EMPTY; text.len()];
    let mut name = 0u32;
    let mut prev: Option<usize> = None;
    for &p in sorted_lms {
        let p = p as usize;
        if let Some(q) = prev
            && !lms_substrings_equal(text, types, q, p)
        {
            name += 1;
        }
        names[p] = name;
        prev = Some(p);
    }
    (names, name as usize + 1)
}

/// Whether the LMS substrings starting at `a` and `b` are identical,
/// comparing characters and types up to and including the closing LMS
/// position.
fn lms_substrings_equal(text: &[u32], types: &Types, a: usize, b: usize) -> bool {
    let n = text.len();
    if a == n - 1 || b == n - 1 {
        return a == b;
    }
    let mut i = 0;
    loop {
        let (x, y) = (a + i, b + i);
        if x >= n || y >= n {
            return false;
        }
        if text[x] != text[y] || types.is_s(x) != types.is_s(y) {
            return false;
        }
        if i > 0 {
            let (end_x, end_y) = (types.is_lms(x), types.is_lms(y));
            if end_x || end_y {
                return end_x && end_y;
            }
        }
        i += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

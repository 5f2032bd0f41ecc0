// Rolling form of the weak block hash.
//
// The coarse matcher tests a window at every target offset until it finds
// a block match. Recomputing Adler-32 per window costs O(block) per step;
// the rolling state below yields the identical checksum in O(1) when the
// window slides by one byte (`roll`) or loses its leading byte at the tail
// of the target (`shrink`).

use super::checksum::{MOD_ADLER, weak_hash};

// ---------------------------------------------------------------------------
// Rolling Adler-32
// ---------------------------------------------------------------------------

/// Adler-32 state over a window that can slide and shrink.
///
/// `digest()` always equals `weak_hash(window)` for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingChecksum {
    a: u32,
    b: u32,
    len: usize,
}

impl RollingChecksum {
    /// Start a checksum over `window`.
    pub fn new(window: &[u8]) -> Self {
        let digest = weak_hash(window);
        Self {
            a: digest & 0xFFFF,
            b: digest >> 16,
            len: window.len(),
        }
    }

    /// Current checksum value.
    #[inline(always)]
    pub fn digest(&self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Window length covered by the state.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the window is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slide by one byte: drop `out` from the front, append `inb`.
    #[inline(always)]
    pub fn roll(&mut self, out: u8, inb: u8) {
        debug_assert!(self.len > 0);
        let m = MOD_ADLER as u64;
        let out = u64::from(out);
        let weighted = (self.len as u64 % m) * out % m;

        let a = (u64::from(self.a) + m - out + u64::from(inb)) % m;
        // B' = B - len*out + A' - 1
        let b = (u64::from(self.b) + 2 * m - weighted + a - 1) % m;

        self.a = a as u32;
        self.b = b as u32;
    }

    /// Drop `out` from the front without appending (window shrinks by one).
    #[inline(always)]
    pub fn shrink(&mut self, out: u8) {
        debug_assert!(self.len > 0);
        let m = MOD_ADLER as u64;
        let out = u64::from(out);
        let weighted = (self.len as u64 % m) * out % m;

        let a = (u64::from(self.a) + m - out) % m;
        // B' = B - len*out - 1
        let b = (u64::from(self.b) + 2 * m - weighted - 1) % m;

        self.a = a as u32;
        self.b = b as u32;
        self.len -= 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_matches_fresh_checksum() {
        let data = b"Hello, World! Extra bytes here.";
        let look = 9;
        let mut h = RollingChecksum::new(&data[..look]);
        for i in 0..data.len() - look {
            h.roll(data[i], data[i + look]);
            assert_eq!(
                h.digest(),
                weak_hash(&data[i + 1..i + 1 + look]),
                "mismatch at offset {i}"
            );
        }
    }

    #[test]
    fn rolling_handles_high_bytes_and_long_windows() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i * 7919 % 251) as u8 | 0x80).collect();
        let look = 4096;
        let mut h = RollingChecksum::new(&data[..look]);
        for i in 0..data.len() - look {
            h.roll(data[i], data[i + look]);
        }
        let start = data.len() - look;
        assert_eq!(h.digest(), weak_hash(&data[start..]));
    }

    #[test]
    fn shrink_down_to_empty() {
        let data = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let mut h = RollingChecksum::new(data);
        for i in 0..data.len() {
            h.shrink(data[i]);
            assert_eq!(h.digest(), weak_hash(&data[i + 1..]), "after dropping {i}");
            assert_eq!(h.len(), data.len() - i - 1);
        }
        assert!(h.is_empty());
        assert_eq!(h.digest(), 1);
    }

    #[test]
    fn roll_then_shrink() {
        let data: Vec<u8> = (0..=255u8).rev().cycle().take(1000).collect();
        let look = 64;
        let mut h = RollingChecksum::new(&data[..look]);
        let mut pos = 0;
        while pos + look < data.len() {
            h.roll(data[pos], data[pos + look]);
            pos += 1;
        }
        while pos < data.len() {
            h.shrink(data[pos]);
            pos += 1;
            assert_eq!(h.digest(), weak_hash(&data[pos..]));
        }
    }
}

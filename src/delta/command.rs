// Delta commands.
//
// A delta is an ordered list of COPY (bytes taken from the base) and
// LITERAL (bytes carried in the delta) commands. Replaying it in order
// against the base rebuilds the target; each command's destination is
// implied by the total length of the commands before it.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// One delta instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Command {
    /// Copy `length` bytes of the base starting at `offset`.
    Copy { offset: u32, length: u32 },
    /// Emit `data` verbatim. `length` is the declared size of `data`; the
    /// two are kept separately so a corrupted delta can be detected.
    Literal {
        length: u32,
        #[serde(with = "super::format::base64_bytes")]
        data: Vec<u8>,
    },
}

impl Command {
    pub fn copy(offset: u32, length: u32) -> Self {
        Self::Copy { offset, length }
    }

    /// Literal whose declared length is taken from `data`.
    ///
    /// Panics if `data` is longer than `u32::MAX` bytes.
    pub fn literal(data: Vec<u8>) -> Self {
        let length = u32::try_from(data.len())
            .unwrap_or_else(|_| panic!("literal of {} bytes exceeds u32", data.len()));
        Self::Literal { length, data }
    }

    /// Declared output length of this command.
    #[inline]
    pub fn len(&self) -> u32 {
        match *self {
            Self::Copy { length, .. } | Self::Literal { length, .. } => length,
        }
    }

    /// Whether the command produces no output.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, Self::Copy { .. })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    /// Whether `next` can be folded into `self`.
    ///
    /// Two literals always merge; two copies merge when `next` continues
    /// exactly where `self` ends in the base. A merge that would overflow
    /// the 32-bit length field is refused.
    pub fn can_merge(&self, next: &Command) -> bool {
        let fits = u32::checked_add(self.len(), next.len()).is_some();
        match (self, next) {
            (Self::Literal { .. }, Self::Literal { .. }) => fits,
            (Self::Copy { offset, length }, Self::Copy { offset: next_offset, .. }) => {
                fits && u64::from(*offset) + u64::from(*length) == u64::from(*next_offset)
            }
            _ => false,
        }
    }

    /// Fold `next` into `self`. Caller must have checked `can_merge`.
    pub fn absorb(&mut self, next: Command) {
        debug_assert!(self.can_merge(&next));
        match (self, next) {
            (
                Self::Literal { length, data },
                Self::Literal {
                    length: next_len,
                    data: next_data,
                },
            ) => {
                data.extend_from_slice(&next_data);
                *length += next_len;
            }
            (Self::Copy { length, .. }, Self::Copy { length: next_len, .. }) => {
                *length += next_len;
            }
            _ => unreachable!("absorb called on unmergeable commands"),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy { offset, length } => write!(f, "COPY offset={offset} length={length}"),
            Self::Literal { length, data } => {
                write!(f, "LITERAL length={length} data=[{} bytes]", data.len())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

/// Ordered command sequence turning a base into a target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta {
    commands: Vec<Command>,
}

impl Delta {
    pub fn from_commands(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Output length declared by the commands.
    pub fn target_len(&self) -> u64 {
        self.commands.iter().map(|c| u64::from(c.len())).sum()
    }

    /// Bytes produced by COPY commands.
    pub fn copy_bytes(&self) -> u64 {
        self.commands
            .iter()
            .filter(|c| c.is_copy())
            .map(|c| u64::from(c.len()))
            .sum()
    }

    /// Bytes carried by LITERAL commands.
    pub fn literal_bytes(&self) -> u64 {
        self.commands
            .iter()
            .filter(|c| c.is_literal())
            .map(|c| u64::from(c.len()))
            .sum()
    }

    /// True when no two adjacent commands could be merged.
    pub fn is_canonical(&self) -> bool {
        self.commands.windows(2).all(|w| !w[0].can_merge(&w[1]))
    }
}

impl From<Vec<Command>> for Delta {
    fn from(commands: Vec<Command>) -> Self {
        Self { commands }
    }
}

impl FromIterator<Command> for Delta {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Delta {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

impl<'a> IntoIterator for &'a Delta {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_length_follows_data() {
        let cmd = Command::literal(b"hello".to_vec());
        assert_eq!(cmd.len(), 5);
        assert!(cmd.is_literal());
        assert!(!Command::literal(Vec::new()).is_copy());
        assert!(Command::literal(Vec::new()).is_empty());
    }

    #[test]
    fn literals_always_merge() {
        let mut a = Command::literal(b"ab".to_vec());
        let b = Command::literal(b"cde".to_vec());
        assert!(a.can_merge(&b));
        a.absorb(b);
        assert_eq!(a, Command::literal(b"abcde".to_vec()));
    }

    #[test]
    fn copies_merge_only_when_contiguous() {
        let a = Command::copy(10, 5);
        assert!(a.can_merge(&Command::copy(15, 3)));
        assert!(!a.can_merge(&Command::copy(16, 3)));
        assert!(!a.can_merge(&Command::copy(0, 10)));

        let mut merged = a.clone();
        merged.absorb(Command::copy(15, 3));
        assert_eq!(merged, Command::copy(10, 8));
    }

    #[test]
    fn mixed_kinds_never_merge() {
        let copy = Command::copy(0, 4);
        let lit = Command::literal(b"x".to_vec());
        assert!(!copy.can_merge(&lit));
        assert!(!lit.can_merge(&copy));
    }

    #[test]
    fn merge_refused_on_length_overflow() {
        let a = Command::copy(0, u32::MAX);
        let b = Command::copy(u32::MAX, 1);
        assert!(!a.can_merge(&b));
    }

    #[test]
    fn delta_accounting() {
        let delta: Delta = vec![
            Command::copy(0, 10),
            Command::literal(b"xyz".to_vec()),
            Command::copy(20, 7),
        ]
        .into();
        assert_eq!(delta.len(), 3);
        assert_eq!(delta.target_len(), 20);
        assert_eq!(delta.copy_bytes(), 17);
        assert_eq!(delta.literal_bytes(), 3);
        assert!(delta.is_canonical());

        let not_canonical = Delta::from_commands(vec![Command::copy(0, 10), Command::copy(10, 1)]);
        assert!(!not_canonical.is_canonical());
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(Command::copy(3, 4).to_string(), "COPY offset=3 length=4");
        assert_eq!(
            Command::literal(vec![0; 9]).to_string(),
            "LITERAL length=9 data=[9 bytes]"
        );
    }
}

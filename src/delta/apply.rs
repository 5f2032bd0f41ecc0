// Patch application.
//
// Two passes over the command list: the first validates every command
// against the base and sums the output length, the second copies bytes
// into a buffer allocated exactly once. A rejected delta never produces
// partial output.

use std::fmt;

use super::command::Command;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a command was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// `offset + length` runs past the end of the base.
    CopyOutOfBounds {
        offset: u32,
        length: u32,
        base_len: usize,
    },
    /// The literal payload disagrees with its declared length.
    LiteralLengthMismatch { declared: u32, actual: usize },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::CopyOutOfBounds {
                offset,
                length,
                base_len,
            } => write!(
                f,
                "copy of {length} bytes at offset {offset} exceeds base of {base_len} bytes"
            ),
            Self::LiteralLengthMismatch { declared, actual } => write!(
                f,
                "literal declares {declared} bytes but carries {actual}"
            ),
        }
    }
}

/// Error returned when a delta cannot be applied to a base.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("invalid command #{index}: {reason}")]
    InvalidCommand { index: usize, reason: InvalidReason },
}

impl ApplyError {
    /// Zero-based position of the offending command.
    pub fn index(&self) -> usize {
        match self {
            Self::InvalidCommand { index, .. } => *index,
        }
    }

    pub fn reason(&self) -> InvalidReason {
        match self {
            Self::InvalidCommand { reason, .. } => *reason,
        }
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Check one command against a base of `base_len` bytes.
pub fn validate(command: &Command, base_len: usize) -> Result<(), InvalidReason> {
    match command {
        Command::Copy { offset, length } => {
            let end = u64::from(*offset) + u64::from(*length);
            if end > base_len as u64 {
                return Err(InvalidReason::CopyOutOfBounds {
                    offset: *offset,
                    length: *length,
                    base_len,
                });
            }
        }
        Command::Literal { length, data } => {
            if *length as usize != data.len() {
                return Err(InvalidReason::LiteralLengthMismatch {
                    declared: *length,
                    actual: data.len(),
                });
            }
        }
    }
    Ok(())
}

/// Rebuild the target by replaying `commands` against `base`.
///
/// Fails with [`ApplyError::InvalidCommand`] on the first command that
/// copies outside the base or whose literal payload has the wrong length.
pub fn apply_delta(base: &[u8], commands: &[Command]) -> Result<Vec<u8>, ApplyError> {
    let mut total: u64 = 0;
    for (index, cmd) in commands.iter().enumerate() {
        validate(cmd, base.len()).map_err(|reason| ApplyError::InvalidCommand { index, reason })?;
        total += u64::from(cmd.len());
    }

    // Every byte is backed by the base or a literal already in memory.
    let total = usize::try_from(total)
        .unwrap_or_else(|_| panic!("delta output of {total} bytes is not addressable"));
    let mut out = Vec::with_capacity(total);
    for cmd in commands {
        match cmd {
            Command::Copy { offset, length } => {
                let start = *offset as usize;
                out.extend_from_slice(&base[start..start + *length as usize]);
            }
            Command::Literal { data, .. } => out.extend_from_slice(data),
        }
    }
    debug_assert_eq!(out.len(), total);
    log::trace!("applied {} commands -> {} bytes", commands.len(), out.len());
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_delta_gives_empty_output() {
        assert_eq!(apply_delta(b"base", &[]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn replays_in_order() {
        let base = b"0123456789";
        let cmds = vec![
            Command::copy(7, 3),
            Command::literal(b"--".to_vec()),
            Command::copy(0, 2),
        ];
        assert_eq!(apply_delta(base, &cmds).unwrap(), b"789--01");
    }

    #[test]
    fn copy_may_end_exactly_at_base_end() {
        let base = b"abcdef";
        assert_eq!(apply_delta(base, &[Command::copy(2, 4)]).unwrap(), b"cdef");
        assert_eq!(apply_delta(base, &[Command::copy(6, 0)]).unwrap(), b"");
    }

    #[test]
    fn rejects_copy_past_end() {
        let base = b"abcdef";
        let err = apply_delta(base, &[Command::literal(b"x".to_vec()), Command::copy(7, 1)])
            .unwrap_err();
        assert_eq!(err.index(), 1);
        assert_eq!(
            err.reason(),
            InvalidReason::CopyOutOfBounds {
                offset: 7,
                length: 1,
                base_len: 6
            }
        );
    }

    #[test]
    fn rejects_copy_whose_end_overflows_u32() {
        let err = apply_delta(b"abc", &[Command::copy(u32::MAX, 2)]).unwrap_err();
        assert!(matches!(err.reason(), InvalidReason::CopyOutOfBounds { .. }));
    }

    #[test]
    fn rejects_literal_length_mismatch() {
        let bad = Command::Literal {
            length: 5,
            data: b"abc".to_vec(),
        };
        let err = apply_delta(b"", &[bad]).unwrap_err();
        assert_eq!(
            err,
            ApplyError::InvalidCommand {
                index: 0,
                reason: InvalidReason::LiteralLengthMismatch {
                    declared: 5,
                    actual: 3
                }
            }
        );
    }

    #[test]
    fn error_message_names_the_command() {
        let err = apply_delta(b"ab", &[Command::copy(1, 5)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid command #0: copy of 5 bytes at offset 1 exceeds base of 2 bytes"
        );
    }
}

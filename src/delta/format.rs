// JSON delta documents.
//
// Layout:
//   { "version": 1, "base_len": N, "target_len": M,
//     "commands": [ {"type":"COPY","offset":o,"length":l},
//                   {"type":"LITERAL","length":l,"data":"<base64>"} ] }
//
// Command order, tags, offsets, lengths and literal bytes survive a round
// trip exactly. A literal whose `length` disagrees with its payload is
// accepted here and rejected by the applier.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::command::Delta;

/// Current document version.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("malformed delta document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported delta document version {0} (expected {FORMAT_VERSION})")]
    UnsupportedVersion(u32),
    #[error("target length mismatch: document declares {expected} bytes, got {actual}")]
    TargetLengthMismatch { expected: u64, actual: u64 },
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A delta together with the sizes it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaDocument {
    pub version: u32,
    pub base_len: u64,
    pub target_len: u64,
    pub commands: Delta,
}

impl DeltaDocument {
    /// Wrap `delta`, taking `target_len` from its commands.
    pub fn new(base_len: u64, delta: Delta) -> Self {
        Self {
            version: FORMAT_VERSION,
            base_len,
            target_len: delta.target_len(),
            commands: delta,
        }
    }

    pub fn delta(&self) -> &Delta {
        &self.commands
    }

    pub fn into_delta(self) -> Delta {
        self.commands
    }

    pub fn to_json(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, FormatError> {
        serde_json::from_str::<Self>(text)?.checked()
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, FormatError> {
        serde_json::from_slice::<Self>(bytes)?.checked()
    }

    /// Write the pretty-printed document followed by a newline.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), FormatError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self, FormatError> {
        serde_json::from_reader::<_, Self>(reader)?.checked()
    }

    /// Check that `output` has the length this document declares.
    pub fn verify_output(&self, output: &[u8]) -> Result<(), FormatError> {
        let actual = output.len() as u64;
        if actual != self.target_len {
            return Err(FormatError::TargetLengthMismatch {
                expected: self.target_len,
                actual,
            });
        }
        Ok(())
    }

    fn checked(self) -> Result<Self, FormatError> {
        if self.version != FORMAT_VERSION {
            return Err(FormatError::UnsupportedVersion(self.version));
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Literal payload encoding
// ---------------------------------------------------------------------------

/// Serde adapter storing byte payloads as standard base64 strings.
pub(crate) mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.as_bytes())
            .map_err(|e| D::Error::custom(format!("invalid base64 literal payload: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

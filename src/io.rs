// File-level helpers around the delta engine.
//
// Both inputs are read fully into memory (the engine works on whole
// buffers). Delta documents are written as pretty JSON through a
// `BufWriter`; parent directories of every output are created on demand.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::delta::apply::{self, ApplyError};
use crate::delta::format::{DeltaDocument, FormatError};
use crate::engine::{self, DeltaStats};
use crate::hash::checksum::{StrongHash, strong_hash};
use crate::hash::config::{DeltaConfig, MAX_INPUT_LEN};

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `diff_files()`.
#[derive(Debug, Clone)]
pub struct DiffStats {
    /// Base file size in bytes.
    pub base_size: u64,
    /// Target file size in bytes.
    pub target_size: u64,
    /// Size of the written delta document in bytes.
    pub delta_size: u64,
    /// Per-stage engine statistics.
    pub delta: DeltaStats,
    pub base_sha256: StrongHash,
    pub target_sha256: StrongHash,
}

/// Statistics returned by `patch_file()`.
#[derive(Debug, Clone)]
pub struct PatchStats {
    pub base_size: u64,
    pub delta_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// Commands replayed.
    pub commands: usize,
    pub output_sha256: StrongHash,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Format(#[from] FormatError),
    #[error("{0}")]
    Apply(#[from] ApplyError),
    #[error("{}: {len} bytes exceeds the {max}-byte input limit", path.display())]
    InputTooLarge { path: PathBuf, len: u64, max: usize },
}

// ---------------------------------------------------------------------------
// Raw files
// ---------------------------------------------------------------------------

pub fn load_binary_file(path: &Path) -> Result<Vec<u8>, IoError> {
    Ok(fs::read(path)?)
}

/// Write `data` to `path`, truncating it and creating parent directories.
pub fn save_binary_file(path: &Path, data: &[u8]) -> Result<(), IoError> {
    let mut writer = create_output(path)?;
    writer.write_all(data)?;
    writer.flush()?;
    Ok(())
}

/// Fail with `InputTooLarge` when a `len`-byte file cannot be diffed.
pub fn check_input_len(path: &Path, len: u64) -> Result<(), IoError> {
    if len > MAX_INPUT_LEN as u64 {
        return Err(IoError::InputTooLarge {
            path: path.to_path_buf(),
            len,
            max: MAX_INPUT_LEN,
        });
    }
    Ok(())
}

/// Load a diff input, refusing files over `MAX_INPUT_LEN` before reading.
pub fn load_diff_input(path: &Path) -> Result<Vec<u8>, IoError> {
    check_input_len(path, fs::metadata(path)?.len())?;
    let data = load_binary_file(path)?;
    // The file may have grown since it was stat'ed.
    check_input_len(path, data.len() as u64)?;
    Ok(data)
}

fn create_output(path: &Path) -> Result<BufWriter<File>, IoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::with_capacity(BUF_SIZE, File::create(path)?))
}

// ---------------------------------------------------------------------------
// Delta documents
// ---------------------------------------------------------------------------

/// Write `doc` as pretty JSON. Returns the number of bytes written.
pub fn save_delta(path: &Path, doc: &DeltaDocument) -> Result<u64, IoError> {
    let mut writer = create_output(path)?;
    doc.write_to(&mut writer)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(file.metadata()?.len())
}

pub fn load_delta(path: &Path) -> Result<DeltaDocument, IoError> {
    let file = File::open(path)?;
    Ok(DeltaDocument::read_from(BufReader::with_capacity(BUF_SIZE, file))?)
}

// ---------------------------------------------------------------------------
// diff / patch
// ---------------------------------------------------------------------------

/// Compute the delta from `base_path` to `target_path` and write it to
/// `delta_path`.
pub fn diff_files(
    base_path: &Path,
    target_path: &Path,
    delta_path: &Path,
    config: &DeltaConfig,
) -> Result<DiffStats, IoError> {
    let base = load_diff_input(base_path)?;
    let target = load_diff_input(target_path)?;

    let (delta, stats) = engine::calculate_delta_with_stats(&base, &target, config);
    let doc = DeltaDocument::new(base.len() as u64, delta);
    let delta_size = save_delta(delta_path, &doc)?;
    log::info!(
        "wrote {} ({} commands, {delta_size} bytes)",
        delta_path.display(),
        stats.commands
    );

    Ok(DiffStats {
        base_size: base.len() as u64,
        target_size: target.len() as u64,
        delta_size,
        delta: stats,
        base_sha256: strong_hash(&base),
        target_sha256: strong_hash(&target),
    })
}

/// Apply the delta document at `delta_path` to `base_path`, writing the
/// reconstructed target to `output_path`.
///
/// Nothing is written when the delta is invalid for this base or the
/// result disagrees with the document's declared target length.
pub fn patch_file(
    base_path: &Path,
    delta_path: &Path,
    output_path: &Path,
) -> Result<PatchStats, IoError> {
    let base = load_binary_file(base_path)?;
    let delta_size = fs::metadata(delta_path)?.len();
    let doc = load_delta(delta_path)?;
    if doc.base_len != base.len() as u64 {
        log::warn!(
            "delta was computed against a {}-byte base, got {} bytes",
            doc.base_len,
            base.len()
        );
    }

    let output = apply::apply_delta(&base, doc.delta().commands())?;
    doc.verify_output(&output)?;
    save_binary_file(output_path, &output)?;

    Ok(PatchStats {
        base_size: base.len() as u64,
        delta_size,
        output_size: output.len() as u64,
        commands: doc.delta().len(),
        output_sha256: strong_hash(&output),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Filesystem fixtures for photo storage tests.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Smallest byte sequence that still starts and ends like a JPEG (SOI, APP0, EOI).
pub const SAMPLE_JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];

/// Fresh temporary directory removed when the handle drops.
///
/// # Errors
///
/// Returns an error when the directory cannot be created.
pub fn temp_dir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix("photorelay-")
        .tempdir()
        .context("failed to create temp dir")
}

/// Write `contents` to `dir/name`, returning the full path.
///
/// # Errors
///
/// Returns an error when the file cannot be written.
pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Write [`SAMPLE_JPEG`] to `dir/name`.
///
/// # Errors
///
/// Returns an error when the file cannot be written.
pub fn write_photo(dir: &Path, name: &str) -> Result<PathBuf> {
    write_file(dir, name, SAMPLE_JPEG)
}

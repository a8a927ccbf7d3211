//! Listing of stored photos.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use globset::{Glob, GlobMatcher};
use tokio::fs;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Pattern selecting forwardable photos.
pub const PHOTO_PATTERN: &str = "*.jpg";

/// A photo file present in the save directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    /// Filename inside the save directory.
    pub name: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Last modification time.
    pub modified: DateTime<Local>,
}

/// Scans the save directory for photos.
#[derive(Debug, Clone)]
pub struct PhotoCatalog {
    dir: PathBuf,
    matcher: GlobMatcher,
}

impl PhotoCatalog {
    /// Catalog over `dir`.
    ///
    /// # Errors
    ///
    /// Returns `Glob` if the photo pattern fails to compile.
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let matcher = Glob::new(PHOTO_PATTERN)
            .map_err(|source| StorageError::Glob {
                pattern: PHOTO_PATTERN,
                source,
            })?
            .compile_matcher();
        Ok(Self {
            dir: dir.into(),
            matcher,
        })
    }

    /// Directory being scanned.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Regular files matching the photo pattern, sorted by name.
    ///
    /// A missing directory yields an empty list. Entries that disappear mid-scan are skipped.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the directory cannot be read.
    pub async fn scan(&self) -> StorageResult<Vec<StoredPhoto>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::io("catalog.read_dir", &self.dir, err)),
        };

        let mut photos = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| StorageError::io("catalog.next_entry", &self.dir, source))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                debug!(path = %entry.path().display(), "skipping non-utf8 filename");
                continue;
            };
            if !self.matcher.is_match(&name) {
                continue;
            }
            let metadata = match fs::metadata(entry.path()).await {
                Ok(metadata) => metadata,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => return Err(StorageError::io("catalog.metadata", entry.path(), err)),
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata
                .modified()
                .map_err(|source| StorageError::io("catalog.modified", entry.path(), source))?;
            photos.push(StoredPhoto {
                name,
                size_bytes: metadata.len(),
                modified: DateTime::<Local>::from(modified),
            });
        }

        photos.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(photos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use photorelay_test_support::{SAMPLE_JPEG, temp_dir, write_file, write_photo};

    #[tokio::test]
    async fn missing_directory_scans_empty() -> Result<()> {
        let dir = temp_dir()?;
        let catalog = PhotoCatalog::new(dir.path().join("absent"))?;
        assert!(catalog.scan().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn scan_selects_jpg_files_in_name_order() -> Result<()> {
        let dir = temp_dir()?;
        write_photo(dir.path(), "b.jpg")?;
        write_photo(dir.path(), "a.jpg")?;
        write_file(dir.path(), "notes.txt", b"not a photo")?;
        write_file(dir.path(), ".0b1c.part", b"partial")?;
        std::fs::create_dir(dir.path().join("folder.jpg"))?;

        let photos = PhotoCatalog::new(dir.path())?.scan().await?;
        let names: Vec<_> = photos.iter().map(|photo| photo.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
        assert_eq!(photos[0].size_bytes, SAMPLE_JPEG.len() as u64);
        Ok(())
    }

    #[tokio::test]
    async fn pattern_is_case_sensitive() -> Result<()> {
        let dir = temp_dir()?;
        write_photo(dir.path(), "UPPER.JPG")?;
        assert!(PhotoCatalog::new(dir.path())?.scan().await?.is_empty());
        Ok(())
    }
}

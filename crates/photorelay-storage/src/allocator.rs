//! Collision-free filename allocation for stored photos.
//!
//! # Design
//! - Names are `<stem>_<YYYYmmdd_HHMMSS><ext>`, then `<stem>_<ts>_1<ext>`, `_2`, ... until free.
//! - `allocate` is the check-then-create form: the returned name was free when checked.
//! - `commit` closes the race between concurrent uploads by hard-linking a finished temp
//!   file under each candidate name in turn; the link fails if the name exists, so two
//!   uploads can never land on the same name. Filesystems without hard links fall back to
//!   check-then-rename.

use std::io;
use std::path::Path;

use chrono::{DateTime, Local};
use tokio::fs;
use tracing::debug;

use crate::clock::TIMESTAMP_FORMAT;
use crate::error::{StorageError, StorageResult};

/// Upper bound on suffix attempts before giving up on a single upload.
pub const MAX_ATTEMPTS: u32 = 10_000;

/// Candidate name generator for one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameAllocator {
    stem: String,
    extension: String,
    stamp: String,
}

impl FilenameAllocator {
    /// Build the generator for `requested` at time `now`.
    ///
    /// Only the final path component of `requested` is used. Returns `None` when nothing
    /// usable remains (empty, `.` or `..`).
    #[must_use]
    pub fn new(requested: &str, now: DateTime<Local>) -> Option<Self> {
        let name = final_component(requested)?;
        let (stem, extension) = split_extension(name);
        Some(Self {
            stem: stem.to_string(),
            extension: extension.to_string(),
            stamp: now.format(TIMESTAMP_FORMAT).to_string(),
        })
    }

    /// Candidate for the given attempt; attempt 0 has no counter suffix.
    #[must_use]
    pub fn candidate(&self, attempt: u32) -> String {
        if attempt == 0 {
            format!("{}_{}{}", self.stem, self.stamp, self.extension)
        } else {
            format!("{}_{}_{attempt}{}", self.stem, self.stamp, self.extension)
        }
    }

    /// First candidate with no entry in `directory` at the time of the check.
    ///
    /// # Errors
    ///
    /// Returns an IO error if existence cannot be determined, or `NamesExhausted` after
    /// [`MAX_ATTEMPTS`] taken candidates.
    pub async fn allocate(&self, directory: &Path) -> StorageResult<String> {
        self.first_free(directory, 0).await
    }

    /// Give the finished file at `temp` its final name inside `directory`.
    ///
    /// On success the final name refers to the same data as `temp`; the caller still owns
    /// removal of `temp` (it may already be gone after the rename fallback).
    ///
    /// # Errors
    ///
    /// Returns an IO error for link/rename failures other than a taken name, or
    /// `NamesExhausted` after [`MAX_ATTEMPTS`] taken candidates.
    pub async fn commit(&self, temp: &Path, directory: &Path) -> StorageResult<String> {
        for attempt in 0..MAX_ATTEMPTS {
            let name = self.candidate(attempt);
            let target = directory.join(&name);
            match fs::hard_link(temp, &target).await {
                Ok(()) => return Ok(name),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
                Err(err) if links_unsupported(&err) => {
                    debug!(error = %err, "hard links unavailable; falling back to rename");
                    let name = self.first_free(directory, attempt).await?;
                    let target = directory.join(&name);
                    fs::rename(temp, &target)
                        .await
                        .map_err(|source| StorageError::io("allocator.rename", &target, source))?;
                    return Ok(name);
                }
                Err(err) => return Err(StorageError::io("allocator.link", &target, err)),
            }
        }
        Err(StorageError::NamesExhausted {
            directory: directory.to_path_buf(),
            attempts: MAX_ATTEMPTS,
        })
    }

    async fn first_free(&self, directory: &Path, start: u32) -> StorageResult<String> {
        for attempt in start..MAX_ATTEMPTS {
            let name = self.candidate(attempt);
            let target = directory.join(&name);
            let taken = fs::try_exists(&target)
                .await
                .map_err(|source| StorageError::io("allocator.exists", &target, source))?;
            if !taken {
                return Ok(name);
            }
        }
        Err(StorageError::NamesExhausted {
            directory: directory.to_path_buf(),
            attempts: MAX_ATTEMPTS,
        })
    }
}

fn links_unsupported(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Unsupported | io::ErrorKind::PermissionDenied
    )
}

fn final_component(requested: &str) -> Option<&str> {
    let name = requested
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

/// Split into `(stem, extension)` where the extension keeps its leading dot.
///
/// Leading dots belong to the stem, so `.hidden` has no extension. A trailing dot
/// is not an extension either: `trailing.` keeps its dot in the stem.
fn split_extension(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(index) if leading + index + 1 < name.len() => name.split_at(leading + index),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::TimeZone;
    use photorelay_test_support::{temp_dir, write_file, write_photo};

    fn noon() -> Result<DateTime<Local>> {
        Local
            .with_ymd_and_hms(2024, 5, 1, 12, 30, 45)
            .single()
            .ok_or_else(|| anyhow::anyhow!("ambiguous local time"))
    }

    #[test]
    fn candidates_embed_stamp_then_counter() -> Result<()> {
        let allocator =
            FilenameAllocator::new("photo.jpg", noon()?).ok_or_else(|| anyhow::anyhow!("name"))?;
        assert_eq!(allocator.candidate(0), "photo_20240501_123045.jpg");
        assert_eq!(allocator.candidate(1), "photo_20240501_123045_1.jpg");
        assert_eq!(allocator.candidate(12), "photo_20240501_123045_12.jpg");
        Ok(())
    }

    #[test]
    fn extension_is_the_last_non_empty_dot_suffix() {
        assert_eq!(split_extension("photo.jpg"), ("photo", ".jpg"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("..odd.jpg"), ("..odd", ".jpg"));
        assert_eq!(split_extension("trailing."), ("trailing.", ""));
        assert_eq!(split_extension("photo.jpg."), ("photo.jpg.", ""));
    }

    #[test]
    fn trailing_dot_names_get_the_stamp_appended() -> Result<()> {
        let allocator =
            FilenameAllocator::new("trailing.", noon()?).ok_or_else(|| anyhow::anyhow!("name"))?;
        assert_eq!(allocator.candidate(0), "trailing._20240501_123045");
        assert_eq!(allocator.candidate(1), "trailing._20240501_123045_1");
        Ok(())
    }

    #[test]
    fn only_final_component_is_kept() -> Result<()> {
        let allocator = FilenameAllocator::new("../../etc/cam.jpg", noon()?)
            .ok_or_else(|| anyhow::anyhow!("name"))?;
        assert_eq!(allocator.candidate(0), "cam_20240501_123045.jpg");
        let windows = FilenameAllocator::new(r"C:\DCIM\img.jpg", noon()?)
            .ok_or_else(|| anyhow::anyhow!("name"))?;
        assert_eq!(windows.candidate(0), "img_20240501_123045.jpg");
        assert!(FilenameAllocator::new("", noon()?).is_none());
        assert!(FilenameAllocator::new("dir/", noon()?).is_none());
        assert!(FilenameAllocator::new("..", noon()?).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn allocate_skips_taken_names() -> Result<()> {
        let dir = temp_dir()?;
        let allocator =
            FilenameAllocator::new("photo.jpg", noon()?).ok_or_else(|| anyhow::anyhow!("name"))?;
        assert_eq!(allocator.allocate(dir.path()).await?, allocator.candidate(0));

        write_photo(dir.path(), &allocator.candidate(0))?;
        write_photo(dir.path(), &allocator.candidate(1))?;
        assert_eq!(allocator.allocate(dir.path()).await?, allocator.candidate(2));
        Ok(())
    }

    #[tokio::test]
    async fn commit_never_overwrites_existing_files() -> Result<()> {
        let dir = temp_dir()?;
        let allocator =
            FilenameAllocator::new("photo.jpg", noon()?).ok_or_else(|| anyhow::anyhow!("name"))?;
        let existing = write_file(dir.path(), &allocator.candidate(0), b"first")?;

        let temp = write_file(dir.path(), ".upload.part", b"second")?;
        let name = allocator.commit(&temp, dir.path()).await?;

        assert_eq!(name, allocator.candidate(1));
        assert_eq!(std::fs::read(existing)?, b"first");
        assert_eq!(std::fs::read(dir.path().join(&name))?, b"second");
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_commits_get_distinct_names() -> Result<()> {
        let dir = temp_dir()?;
        let allocator =
            FilenameAllocator::new("photo.jpg", noon()?).ok_or_else(|| anyhow::anyhow!("name"))?;
        let mut temps = Vec::new();
        for index in 0..8 {
            temps.push(write_file(
                dir.path(),
                &format!(".upload-{index}.part"),
                format!("body-{index}").as_bytes(),
            )?);
        }

        let commits = temps
            .iter()
            .map(|temp| allocator.commit(temp, dir.path()));
        let mut names = Vec::new();
        for result in futures_util::future::join_all(commits).await {
            names.push(result?);
        }
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 8);
        Ok(())
    }
}

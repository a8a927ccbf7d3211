//! Durable record of filenames already forwarded.
//!
//! # Design
//! - In memory the set is a `BTreeSet`, so the record is always written sorted.
//! - The record is a JSON array of strings, replaced atomically (sibling temp file, fsync,
//!   rename); a crash mid-write leaves the previous record intact.
//! - An unreadable record degrades to an empty set. That can only cause re-sends, never
//!   skipped photos.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

/// Filenames confirmed forwarded. Names are only ever added.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentSet {
    names: BTreeSet<String>,
}

impl SentSet {
    /// Whether `name` has been forwarded.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Record `name`; returns `false` if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Number of recorded names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Recorded names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SentSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// File-backed persistence for a [`SentSet`].
#[derive(Debug, Clone)]
pub struct SentSetStore {
    path: PathBuf,
}

impl SentSetStore {
    /// Store backed by the record at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record, treating a missing file as empty.
    ///
    /// # Errors
    ///
    /// Returns `Io` when the record cannot be read and `Json` when it is malformed.
    pub async fn read(&self) -> StorageResult<SentSet> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(SentSet::default()),
            Err(err) => return Err(StorageError::io("sent_set.read", &self.path, err)),
        };
        serde_json::from_slice(&raw)
            .map_err(|source| StorageError::json("sent_set.parse", &self.path, source))
    }

    /// Load the record, degrading to an empty set (with a warning) on any failure.
    pub async fn load(&self) -> SentSet {
        match self.read().await {
            Ok(set) => {
                info!(path = %self.path.display(), sent = set.len(), "loaded sent record");
                set
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    cause = ?std::error::Error::source(&err).map(ToString::to_string),
                    "sent record unreadable; starting with an empty set"
                );
                SentSet::default()
            }
        }
    }

    /// Atomically replace the record with `set`.
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Json` on failure; the previous record is left untouched.
    pub async fn persist(&self, set: &SentSet) -> StorageResult<()> {
        let serialised = serde_json::to_vec_pretty(set)
            .map_err(|source| StorageError::json("sent_set.serialize", &self.path, source))?;

        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty());
        if let Some(parent) = parent {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::io("sent_set.create_parent", parent, source))?;
        }

        let file_name = self
            .path
            .file_name()
            .map_or_else(|| "sent".into(), |name| name.to_string_lossy());
        let temp = self
            .path
            .with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

        let outcome = write_synced(&temp, &serialised).await;
        let outcome = match outcome {
            Ok(()) => fs::rename(&temp, &self.path)
                .await
                .map_err(|source| StorageError::io("sent_set.rename", &self.path, source)),
            Err(err) => Err(err),
        };
        if outcome.is_err() {
            let _ = fs::remove_file(&temp).await;
        }
        outcome
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|source| StorageError::io("sent_set.create_temp", path, source))?;
    file.write_all(bytes)
        .await
        .map_err(|source| StorageError::io("sent_set.write", path, source))?;
    file.flush()
        .await
        .map_err(|source| StorageError::io("sent_set.flush", path, source))?;
    file.sync_all()
        .await
        .map_err(|source| StorageError::io("sent_set.sync", path, source))
}

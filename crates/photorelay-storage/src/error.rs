//! # Design
//!
//! - Structured, constant-message errors for photo storage and sent-set persistence.
//! - Operation identifiers and paths travel as fields so failures are reproducible in tests.
//! - Ingest errors separate client faults (bad request) from storage faults.

use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for ingest operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors produced while touching the photo directory or the sent-set record.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO failures while interacting with the filesystem.
    #[error("storage io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// JSON parsing or serialization failures for the sent-set record.
    #[error("storage json failure")]
    Json {
        /// Operation that triggered the JSON failure.
        operation: &'static str,
        /// Path involved in the JSON failure.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// Globset compilation failures.
    #[error("storage glob failure")]
    Glob {
        /// Glob pattern that failed to compile.
        pattern: &'static str,
        /// Underlying globset error.
        source: globset::Error,
    },
    /// Every candidate name for an upload was already taken.
    #[error("storage names exhausted")]
    NamesExhausted {
        /// Directory the allocation ran in.
        directory: PathBuf,
        /// Number of candidates tried.
        attempts: u32,
    },
}

impl StorageError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: serde_json::Error,
    ) -> Self {
        Self::Json {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Errors produced while accepting an uploaded photo.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The request carried no file part.
    #[error("No file in request")]
    MissingFile,
    /// The file part carried no usable filename.
    #[error("No filename")]
    MissingFilename,
    /// Reading the request body failed before the upload completed.
    #[error("upload body could not be read")]
    Body {
        /// Underlying transport error.
        source: Box<dyn StdError + Send + Sync>,
    },
    /// Persisting the upload failed.
    #[error("failed to store upload")]
    Storage {
        /// Underlying storage error.
        #[from]
        source: StorageError,
    },
}

impl IngestError {
    /// Whether the failure is attributable to the client request.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingFile | Self::MissingFilename | Self::Body { .. }
        )
    }
}

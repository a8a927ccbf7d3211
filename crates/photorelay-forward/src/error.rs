//! Error types for the forwarding pipeline.

use photorelay_storage::StorageError;
use thiserror::Error;

/// Result alias for forwarding operations.
pub type ForwardResult<T> = Result<T, ForwardError>;

/// Failures that stop a forward cycle or prevent the uploader from being built.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Building the HTTP client failed.
    #[error("failed to build upload client")]
    Client {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// Scanning the save directory failed.
    #[error("failed to scan save directory")]
    Scan {
        /// Underlying storage error.
        source: StorageError,
    },
}

/// Outcome of a single failed transfer. Every variant is retried on the next cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForwardFailure {
    /// The transfer exceeded the upload timeout.
    #[error("remote upload timed out")]
    Timeout,
    /// The remote endpoint could not be reached.
    #[error("remote endpoint unreachable")]
    Unreachable {
        /// Transport detail.
        detail: String,
    },
    /// The remote endpoint answered with a status other than 200.
    #[error("remote endpoint rejected upload")]
    Rejected {
        /// HTTP status code returned.
        status: u16,
    },
    /// Any other failure, including reading the local file.
    #[error("remote upload failed")]
    Other {
        /// Failure detail.
        detail: String,
    },
}

impl ForwardFailure {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Unreachable { .. } => "unreachable",
            Self::Rejected { .. } => "rejected",
            Self::Other { .. } => "other",
        }
    }
}

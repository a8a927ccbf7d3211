//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Name of the field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// Reading the configuration file failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// Configuration file was not a valid document.
    #[error("failed to parse configuration file")]
    Parse {
        /// Path of the offending file.
        path: PathBuf,
        /// Source JSON error.
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str, value: impl ToString) -> Self {
        Self::InvalidField {
            field,
            reason,
            value: Some(value.to_string()),
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn config_error_messages_are_constant() {
        let invalid = ConfigError::invalid("port", "must_be_nonzero", 0);
        assert_eq!(invalid.to_string(), "invalid configuration field");
        assert!(invalid.source().is_none());

        let io_err = ConfigError::Io {
            operation: "config.read",
            path: PathBuf::from("relay.json"),
            source: io::Error::other("boom"),
        };
        assert_eq!(io_err.to_string(), "filesystem operation failed");
        assert!(io_err.source().is_some());
    }

    #[test]
    fn invalid_helper_captures_value() {
        match ConfigError::invalid("bind_host", "invalid_ip", "nope") {
            ConfigError::InvalidField {
                field,
                reason,
                value,
            } => {
                assert_eq!(field, "bind_host");
                assert_eq!(reason, "invalid_ip");
                assert_eq!(value.as_deref(), Some("nope"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

//! # Design
//!
//! - Centralize application-level errors for bootstrap and shutdown.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be resolved.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: photorelay_config::ConfigError,
    },
    /// Telemetry setup failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: photorelay_telemetry::TelemetryError,
    },
    /// Photo storage could not be prepared.
    #[error("storage operation failed")]
    Storage {
        /// Operation identifier.
        operation: &'static str,
        /// Source storage error.
        source: photorelay_storage::StorageError,
    },
    /// The forwarding client could not be built.
    #[error("forward operation failed")]
    Forward {
        /// Operation identifier.
        operation: &'static str,
        /// Source forward error.
        source: photorelay_forward::ForwardError,
    },
    /// API server operations failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: photorelay_api::ApiServerError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: photorelay_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: photorelay_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn storage(
        operation: &'static str,
        source: photorelay_storage::StorageError,
    ) -> Self {
        Self::Storage { operation, source }
    }

    pub(crate) const fn forward(
        operation: &'static str,
        source: photorelay_forward::ForwardError,
    ) -> Self {
        Self::Forward { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: photorelay_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;
    use std::net::SocketAddr;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "config.load",
            photorelay_config::ConfigError::InvalidField {
                field: "port",
                reason: "zero",
                value: Some("0".to_string()),
            },
        );
        assert!(matches!(
            config,
            AppError::Config {
                operation: "config.load",
                ..
            }
        ));
        assert_eq!(config.to_string(), "configuration operation failed");
        assert!(config.source().is_some());

        let api = AppError::api_server(
            "api_server.serve",
            photorelay_api::ApiServerError::Bind {
                addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
                source: io::Error::other("in use"),
            },
        );
        assert!(matches!(api, AppError::ApiServer { .. }));

        let storage = AppError::storage(
            "catalog.new",
            photorelay_storage::StorageError::NamesExhausted {
                directory: "photos".into(),
                attempts: 3,
            },
        );
        assert_eq!(storage.to_string(), "storage operation failed");
    }
}

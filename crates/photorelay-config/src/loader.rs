//! Layered configuration loading.
//!
//! # Design
//! - Precedence is defaults, then the optional JSON file, then command-line overrides.
//! - Every layer shares the same partial shape (`ConfigLayer`); resolution validates the
//!   merged result once.
//! - Unknown keys in the file are rejected so typos surface at startup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::model::RelayConfig;
use crate::validate::{
    non_empty_path, parse_bind_host, parse_endpoint, positive_secs, validate_port,
    validate_upload_cap,
};

/// Partial configuration; unset fields fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    /// Interface to bind, as an IP literal.
    pub bind_host: Option<String>,
    /// Listen port.
    pub port: Option<u16>,
    /// Photo storage directory.
    pub save_dir: Option<PathBuf>,
    /// Remote endpoint URL.
    pub remote_endpoint: Option<String>,
    /// Seconds between forward cycles.
    pub upload_interval_secs: Option<u64>,
    /// Per-transfer timeout in seconds.
    pub upload_timeout_secs: Option<u64>,
    /// Durable sent-set record path.
    pub sent_record_path: Option<PathBuf>,
    /// Upload body cap in bytes.
    pub max_upload_bytes: Option<usize>,
}

impl ConfigLayer {
    /// Merge `top` over `self`; fields set in `top` win.
    #[must_use]
    pub fn overlay(self, top: Self) -> Self {
        Self {
            bind_host: top.bind_host.or(self.bind_host),
            port: top.port.or(self.port),
            save_dir: top.save_dir.or(self.save_dir),
            remote_endpoint: top.remote_endpoint.or(self.remote_endpoint),
            upload_interval_secs: top.upload_interval_secs.or(self.upload_interval_secs),
            upload_timeout_secs: top.upload_timeout_secs.or(self.upload_timeout_secs),
            sent_record_path: top.sent_record_path.or(self.sent_record_path),
            max_upload_bytes: top.max_upload_bytes.or(self.max_upload_bytes),
        }
    }

    /// Read a layer from a JSON document on disk.
    ///
    /// # Errors
    ///
    /// Returns `Io` when the file cannot be read and `Parse` when it is not a valid
    /// document or names unknown fields.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            operation: "config.read_file",
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fill unset fields with defaults and validate the result.
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` for the first field that fails validation.
    pub fn resolve(self) -> ConfigResult<RelayConfig> {
        let bind_addr = parse_bind_host(self.bind_host.as_deref().unwrap_or(defaults::BIND_HOST))?;
        let port = validate_port(self.port.unwrap_or(defaults::PORT))?;
        let save_dir = non_empty_path(
            "save_dir",
            self.save_dir
                .unwrap_or_else(|| PathBuf::from(defaults::SAVE_DIR)),
        )?;
        let remote_endpoint = parse_endpoint(
            self.remote_endpoint
                .as_deref()
                .unwrap_or(defaults::REMOTE_ENDPOINT),
        )?;
        let upload_interval = positive_secs(
            "upload_interval_secs",
            self.upload_interval_secs
                .unwrap_or(defaults::UPLOAD_INTERVAL_SECS),
        )?;
        let upload_timeout = positive_secs(
            "upload_timeout_secs",
            self.upload_timeout_secs
                .unwrap_or(defaults::UPLOAD_TIMEOUT_SECS),
        )?;
        let sent_record_path = non_empty_path(
            "sent_record_path",
            self.sent_record_path
                .unwrap_or_else(|| PathBuf::from(defaults::SENT_RECORD_PATH)),
        )?;
        let max_upload_bytes =
            validate_upload_cap(self.max_upload_bytes.unwrap_or(defaults::MAX_UPLOAD_BYTES))?;

        Ok(RelayConfig {
            bind_addr,
            port,
            save_dir,
            remote_endpoint,
            upload_interval,
            upload_timeout,
            sent_record_path,
            max_upload_bytes,
        })
    }
}

/// Build the relay configuration from an optional file and command-line overrides.
///
/// # Errors
///
/// Propagates file read/parse failures and validation failures.
pub fn load(file: Option<&Path>, overrides: ConfigLayer) -> ConfigResult<RelayConfig> {
    let base = match file {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration file");
            ConfigLayer::from_file(path)?
        }
        None => ConfigLayer::default(),
    };
    base.overlay(overrides).resolve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use photorelay_test_support::{temp_dir, write_file};
    use std::time::Duration;

    #[test]
    fn defaults_apply_without_file_or_overrides() -> Result<()> {
        let config = load(None, ConfigLayer::default())?;
        assert_eq!(config.port, 5000);
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0");
        assert_eq!(config.save_dir, PathBuf::from("./esp32_photos"));
        assert_eq!(config.sent_record_path, PathBuf::from("./sent_files.json"));
        assert_eq!(config.upload_interval, Duration::from_secs(60));
        assert_eq!(config.upload_timeout, Duration::from_secs(30));
        assert_eq!(config.remote_endpoint.as_str(), "http://127.0.0.1:6000/upload");
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
        Ok(())
    }

    #[test]
    fn overrides_win_over_file_values() -> Result<()> {
        let dir = temp_dir()?;
        let path = write_file(
            dir.path(),
            "relay.json",
            br#"{"port": 8080, "save_dir": "/srv/photos", "upload_interval_secs": 5}"#,
        )?;
        let overrides = ConfigLayer {
            port: Some(9090),
            ..ConfigLayer::default()
        };

        let config = load(Some(&path), overrides)?;
        assert_eq!(config.port, 9090);
        assert_eq!(config.save_dir, PathBuf::from("/srv/photos"));
        assert_eq!(config.upload_interval, Duration::from_secs(5));
        Ok(())
    }

    #[test]
    fn unknown_file_keys_are_rejected() -> Result<()> {
        let dir = temp_dir()?;
        let path = write_file(dir.path(), "relay.json", br#"{"prot": 8080}"#)?;
        let err = load(Some(&path), ConfigLayer::default()).err();
        assert!(matches!(err, Some(ConfigError::Parse { .. })));
        Ok(())
    }

    #[test]
    fn missing_file_reports_io_error() -> Result<()> {
        let dir = temp_dir()?;
        let err = load(Some(&dir.path().join("absent.json")), ConfigLayer::default()).err();
        assert!(matches!(
            err,
            Some(ConfigError::Io {
                operation: "config.read_file",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn invalid_override_fails_resolution() {
        let overrides = ConfigLayer {
            upload_timeout_secs: Some(0),
            ..ConfigLayer::default()
        };
        let err = load(None, overrides).err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidField {
                field: "upload_timeout_secs",
                ..
            })
        ));
    }

    #[test]
    fn socket_addr_combines_host_and_port() -> Result<()> {
        let overrides = ConfigLayer {
            bind_host: Some("127.0.0.1".to_string()),
            port: Some(5001),
            ..ConfigLayer::default()
        };
        let config = load(None, overrides)?;
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5001");
        Ok(())
    }
}

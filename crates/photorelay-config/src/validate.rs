//! Field-level validation and parsing for configuration values.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Parse the bind host as an IP address.
///
/// # Errors
///
/// Returns `InvalidField` when the value is not an IPv4 or IPv6 literal.
pub fn parse_bind_host(value: &str) -> ConfigResult<IpAddr> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid("bind_host", "invalid_ip_address", value))
}

/// Reject port zero.
///
/// # Errors
///
/// Returns `InvalidField` when `port` is zero.
pub fn validate_port(port: u16) -> ConfigResult<u16> {
    if port == 0 {
        return Err(ConfigError::invalid("port", "must_be_nonzero", port));
    }
    Ok(port)
}

/// Parse the remote endpoint, requiring an `http` or `https` URL with a host.
///
/// # Errors
///
/// Returns `InvalidField` when the URL is malformed, uses another scheme, or has no host.
pub fn parse_endpoint(value: &str) -> ConfigResult<Url> {
    let url = Url::parse(value.trim())
        .map_err(|_| ConfigError::invalid("remote_endpoint", "invalid_url", value))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            "remote_endpoint",
            "unsupported_scheme",
            value,
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::invalid("remote_endpoint", "missing_host", value));
    }
    Ok(url)
}

/// Convert a positive number of seconds into a `Duration`.
///
/// # Errors
///
/// Returns `InvalidField` for zero.
pub fn positive_secs(field: &'static str, secs: u64) -> ConfigResult<Duration> {
    if secs == 0 {
        return Err(ConfigError::invalid(field, "must_be_positive", secs));
    }
    Ok(Duration::from_secs(secs))
}

/// Reject empty paths.
///
/// # Errors
///
/// Returns `InvalidField` when the path has no components.
pub fn non_empty_path(field: &'static str, path: PathBuf) -> ConfigResult<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            field,
            reason: "must_not_be_empty",
            value: None,
        });
    }
    Ok(path)
}

/// Reject a zero upload cap.
///
/// # Errors
///
/// Returns `InvalidField` when `bytes` is zero.
pub fn validate_upload_cap(bytes: usize) -> ConfigResult<usize> {
    if bytes == 0 {
        return Err(ConfigError::invalid(
            "max_upload_bytes",
            "must_be_positive",
            bytes,
        ));
    }
    Ok(bytes)
}

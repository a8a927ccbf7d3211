//! Command-line surface of the relay binary.

use std::path::PathBuf;

use clap::Parser;
use photorelay_config::ConfigLayer;
use photorelay_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig};

/// Flags and environment variables accepted by `photorelay`.
///
/// Every relay setting is optional here; unset values fall through to the
/// config file and then to built-in defaults.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "photorelay",
    version,
    about = "Receives ESP32 camera uploads and forwards them to a remote server"
)]
pub struct Cli {
    /// JSON configuration file layered under the flags.
    #[arg(long, env = "PHOTORELAY_CONFIG")]
    pub config: Option<PathBuf>,
    /// Interface to bind.
    #[arg(long, env = "PHOTORELAY_HOST")]
    pub host: Option<String>,
    /// Listen port.
    #[arg(short = 'p', long, env = "PHOTORELAY_PORT")]
    pub port: Option<u16>,
    /// Directory photos are stored in.
    #[arg(short = 'd', long = "dir", env = "PHOTORELAY_SAVE_DIR")]
    pub save_dir: Option<PathBuf>,
    /// Remote endpoint photos are forwarded to.
    #[arg(long, env = "PHOTORELAY_REMOTE_URL")]
    pub remote_url: Option<String>,
    /// Seconds between forward cycles.
    #[arg(long = "interval", env = "PHOTORELAY_INTERVAL_SECS")]
    pub interval_secs: Option<u64>,
    /// Per-transfer timeout in seconds.
    #[arg(long = "timeout", env = "PHOTORELAY_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
    /// File recording which photos were forwarded.
    #[arg(long = "sent-record", env = "PHOTORELAY_SENT_RECORD")]
    pub sent_record: Option<PathBuf>,
    /// Largest accepted upload body in bytes.
    #[arg(long, env = "PHOTORELAY_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,
    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, env = "PHOTORELAY_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
    /// Log output format: `json` or `pretty`.
    #[arg(long, env = "PHOTORELAY_LOG_FORMAT", value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Settings given on the command line, as the topmost config layer.
    #[must_use]
    pub fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            bind_host: self.host.clone(),
            port: self.port,
            save_dir: self.save_dir.clone(),
            remote_endpoint: self.remote_url.clone(),
            upload_interval_secs: self.interval_secs,
            upload_timeout_secs: self.timeout_secs,
            sent_record_path: self.sent_record.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }

    /// Logging settings derived from the flags.
    #[must_use]
    pub fn logging(&self) -> LoggingConfig<'_> {
        let defaults = LoggingConfig::default();
        LoggingConfig {
            level: &self.log_level,
            format: self.log_format.unwrap_or(defaults.format),
            build_sha: defaults.build_sha,
        }
    }
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    input.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn bare_invocation_leaves_every_setting_to_lower_layers() -> Result<()> {
        let cli = Cli::try_parse_from(["photorelay"])?;
        assert_eq!(cli.overrides(), ConfigLayer::default());
        assert_eq!(cli.logging().level, DEFAULT_LOG_LEVEL);
        Ok(())
    }

    #[test]
    fn short_flags_map_onto_the_override_layer() -> Result<()> {
        let cli = Cli::try_parse_from([
            "photorelay",
            "-p",
            "8080",
            "-d",
            "/srv/photos",
            "--remote-url",
            "https://archive.example/upload",
            "--interval",
            "15",
            "--timeout",
            "5",
            "--sent-record",
            "/srv/sent.json",
        ])?;
        let layer = cli.overrides();
        assert_eq!(layer.port, Some(8080));
        assert_eq!(layer.save_dir, Some(PathBuf::from("/srv/photos")));
        assert_eq!(
            layer.remote_endpoint.as_deref(),
            Some("https://archive.example/upload")
        );
        assert_eq!(layer.upload_interval_secs, Some(15));
        assert_eq!(layer.upload_timeout_secs, Some(5));
        assert_eq!(layer.sent_record_path, Some(PathBuf::from("/srv/sent.json")));
        assert_eq!(layer.bind_host, None);
        Ok(())
    }

    #[test]
    fn log_format_flag_is_validated() -> Result<()> {
        let cli = Cli::try_parse_from(["photorelay", "--log-format", "json"])?;
        assert_eq!(cli.logging().format, LogFormat::Json);
        assert!(Cli::try_parse_from(["photorelay", "--log-format", "xml"]).is_err());
        Ok(())
    }

    #[test]
    fn port_must_fit_in_sixteen_bits() {
        assert!(Cli::try_parse_from(["photorelay", "--port", "70000"]).is_err());
    }
}

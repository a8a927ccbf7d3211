//! Resolved configuration consumed by the relay services.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Fully validated relay configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Interface the HTTP surface binds to.
    pub bind_addr: IpAddr,
    /// Port the HTTP surface binds to.
    pub port: u16,
    /// Directory holding received photos.
    pub save_dir: PathBuf,
    /// Remote endpoint photos are forwarded to.
    pub remote_endpoint: Url,
    /// Pause between forward cycles.
    pub upload_interval: Duration,
    /// Timeout applied to each remote transfer.
    pub upload_timeout: Duration,
    /// Location of the durable sent-set record.
    pub sent_record_path: PathBuf,
    /// Maximum accepted request body for uploads.
    pub max_upload_bytes: usize,
}

impl RelayConfig {
    /// Socket address the HTTP listener binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

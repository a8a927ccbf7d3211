//! Shared state handed to every handler.

use std::path::PathBuf;
use std::time::Duration;

use photorelay_config::RelayConfig;
use photorelay_storage::{IngestService, PhotoCatalog};
use photorelay_telemetry::Metrics;
use url::Url;

/// Services and settings the HTTP surface reads from.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub(crate) ingest: IngestService,
    pub(crate) catalog: PhotoCatalog,
    pub(crate) metrics: Metrics,
    pub(crate) remote_endpoint: Url,
    pub(crate) upload_interval: Duration,
    pub(crate) max_upload_bytes: usize,
}

impl ApiState {
    /// Assemble handler state from the resolved configuration and shared services.
    #[must_use]
    pub fn new(
        config: &RelayConfig,
        ingest: IngestService,
        catalog: PhotoCatalog,
        metrics: Metrics,
    ) -> Self {
        Self {
            ingest,
            catalog,
            metrics,
            remote_endpoint: config.remote_endpoint.clone(),
            upload_interval: config.upload_interval,
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Save directory resolved against the working directory.
    pub(crate) fn absolute_save_dir(&self) -> PathBuf {
        let configured = self.ingest.save_dir();
        std::path::absolute(configured).unwrap_or_else(|_| configured.to_path_buf())
    }
}

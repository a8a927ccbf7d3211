use std::future::Future;
use std::sync::Arc;

use photorelay_api::{ApiServer, ApiState};
use photorelay_config::RelayConfig;
use photorelay_forward::{ForwardWorker, HttpUploader};
use photorelay_storage::{IngestService, PhotoCatalog, SentSetStore};
use photorelay_telemetry::{GlobalContextGuard, Metrics, init_logging};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cli::Cli;
use crate::error::{AppError, AppResult};

/// Entry point for the relay boot sequence.
///
/// # Errors
///
/// Returns an error if logging, configuration, service construction, or the
/// HTTP listener fails.
pub async fn run_app(cli: Cli) -> AppResult<()> {
    init_logging(&cli.logging()).map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new("serve");

    let config = photorelay_config::load(cli.config.as_deref(), cli.overrides())
        .map_err(|err| AppError::config("config.load", err))?;
    let relay = Relay::build(config).await?;
    relay.run(shutdown_signal()).await
}

/// Fully wired relay: HTTP surface plus the forward worker, not yet running.
pub struct Relay {
    config: RelayConfig,
    api: ApiServer,
    worker: ForwardWorker,
}

impl Relay {
    /// Construct every service from a resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if metrics, the save directory, the photo catalog, or the
    /// upload client cannot be created.
    pub async fn build(config: RelayConfig) -> AppResult<Self> {
        let metrics = Metrics::new().map_err(|err| AppError::telemetry("metrics.new", err))?;
        let ingest = IngestService::new(&config.save_dir, metrics.clone());
        ingest
            .prepare()
            .await
            .map_err(|err| AppError::storage("ingest.prepare", err))?;
        let catalog = PhotoCatalog::new(&config.save_dir)
            .map_err(|err| AppError::storage("catalog.new", err))?;
        let uploader = HttpUploader::new(config.remote_endpoint.clone(), config.upload_timeout)
            .map_err(|err| AppError::forward("uploader.new", err))?;

        let worker = ForwardWorker::new(
            catalog.clone(),
            SentSetStore::new(&config.sent_record_path),
            Arc::new(uploader),
            metrics.clone(),
            config.upload_interval,
        )
        .await;
        let api = ApiServer::new(ApiState::new(&config, ingest, catalog, metrics));

        Ok(Self {
            config,
            api,
            worker,
        })
    }

    /// Bind the configured address and run until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server fails.
    pub async fn run<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.socket_addr();
        let listener = ApiServer::bind(addr)
            .await
            .map_err(|err| AppError::api_server("api_server.bind", err))?;
        self.run_on(listener, shutdown).await
    }

    /// Run on an already bound listener until `shutdown` resolves.
    ///
    /// The forward worker starts first and is aborted once the server stops.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails.
    pub async fn run_on<F>(self, listener: TcpListener, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            config,
            api,
            worker,
        } = self;
        info!(
            save_dir = %config.save_dir.display(),
            remote_endpoint = %config.remote_endpoint,
            interval_secs = config.upload_interval.as_secs(),
            timeout_secs = config.upload_timeout.as_secs(),
            sent_record = %config.sent_record_path.display(),
            "photo relay starting"
        );

        let worker = worker.spawn();
        let serve_result = api.serve_on(listener, shutdown).await;
        stop_worker(worker).await;

        serve_result.map_err(|err| AppError::api_server("api_server.serve", err))?;
        info!("photo relay shutdown complete");
        Ok(())
    }
}

async fn stop_worker(worker: JoinHandle<()>) {
    if !worker.is_finished() {
        worker.abort();
    }
    match worker.await {
        Ok(()) => {}
        Err(err) if err.is_cancelled() => debug!("forward worker stopped"),
        Err(err) => warn!(error = %err, "forward worker join failed"),
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            error!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

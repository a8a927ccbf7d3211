//! Periodic scan-diff-forward loop.
//!
//! # Design
//! - The worker owns the sent set outright; nothing else mutates it, so no locking.
//! - A name enters the set only after the uploader confirms success, and the record is
//!   flushed immediately after each insertion.
//! - Cycle errors are logged and the loop carries on; the task ends only when aborted.

use std::sync::Arc;
use std::time::Duration;

use photorelay_storage::{PhotoCatalog, SentSet, SentSetStore};
use photorelay_telemetry::{Metrics, forward_cycle_span};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, warn};

use crate::error::{ForwardError, ForwardResult};
use crate::uploader::RemoteUploader;

/// Counts describing one forward cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Photos found in the save directory.
    pub scanned: usize,
    /// Photos not yet in the sent set.
    pub candidates: usize,
    /// Candidates forwarded successfully.
    pub forwarded: usize,
    /// Candidates whose transfer failed.
    pub failed: usize,
}

impl CycleReport {
    /// Whether the cycle had nothing to send.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.candidates == 0
    }
}

/// Background worker reconciling the save directory against the sent set.
pub struct ForwardWorker {
    catalog: PhotoCatalog,
    store: SentSetStore,
    sent: SentSet,
    uploader: Arc<dyn RemoteUploader>,
    metrics: Metrics,
    interval: Duration,
    cycles: u64,
}

impl ForwardWorker {
    /// Build the worker, loading the sent set from `store`.
    ///
    /// An unreadable record starts the worker with an empty set.
    pub async fn new(
        catalog: PhotoCatalog,
        store: SentSetStore,
        uploader: Arc<dyn RemoteUploader>,
        metrics: Metrics,
        interval: Duration,
    ) -> Self {
        let sent = store.load().await;
        metrics.set_sent_total(sent.len());
        Self {
            catalog,
            store,
            sent,
            uploader,
            metrics,
            interval,
            cycles: 0,
        }
    }

    /// Names confirmed forwarded so far.
    #[must_use]
    pub const fn sent(&self) -> &SentSet {
        &self.sent
    }

    /// Run one scan-diff-forward pass.
    ///
    /// Transfer failures are counted in the report, not returned.
    ///
    /// # Errors
    ///
    /// Returns `Scan` when the save directory cannot be listed.
    pub async fn run_cycle(&mut self) -> ForwardResult<CycleReport> {
        let scanned = self
            .catalog
            .scan()
            .await
            .map_err(|source| ForwardError::Scan { source })?;
        let candidates: Vec<String> = scanned
            .iter()
            .filter(|photo| !self.sent.contains(&photo.name))
            .map(|photo| photo.name.clone())
            .collect();

        let mut report = CycleReport {
            scanned: scanned.len(),
            candidates: candidates.len(),
            ..CycleReport::default()
        };

        for name in candidates {
            let path = self.catalog.dir().join(&name);
            match self.uploader.upload(&path).await {
                Ok(()) => {
                    self.sent.insert(name.clone());
                    if let Err(err) = self.store.persist(&self.sent).await {
                        error!(
                            filename = %name,
                            path = %self.store.path().display(),
                            error = %err,
                            "failed to persist sent record; photo may be re-sent after restart"
                        );
                    }
                    let forwarded = self.metrics.inc_forwarded();
                    report.forwarded += 1;
                    info!(filename = %name, forwarded, "photo forwarded");
                }
                Err(failure) => {
                    self.metrics.inc_forward_failure(failure.reason());
                    report.failed += 1;
                    warn!(
                        filename = %name,
                        reason = failure.reason(),
                        error = ?failure,
                        "forward failed; will retry next cycle"
                    );
                }
            }
        }

        self.metrics
            .observe_forward_cycle(report.failed, self.sent.len());
        Ok(report)
    }

    async fn tick(&mut self) {
        self.cycles += 1;
        let span = forward_cycle_span(self.cycles);
        match self.run_cycle().instrument(span.clone()).await {
            Ok(report) => {
                span.record("candidates", report.candidates);
                span.record("forwarded", report.forwarded);
                if report.is_idle() {
                    debug!(parent: &span, scanned = report.scanned, "no new photos to forward");
                } else {
                    info!(
                        parent: &span,
                        scanned = report.scanned,
                        candidates = report.candidates,
                        forwarded = report.forwarded,
                        failed = report.failed,
                        "forward cycle complete"
                    );
                }
            }
            Err(err) => {
                error!(parent: &span, error = %err, "forward cycle failed");
            }
        }
    }

    /// Spawn the loop: one cycle immediately, then one per interval until aborted.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        let mut worker = self;
        tokio::spawn(async move {
            info!(
                save_dir = %worker.catalog.dir().display(),
                interval_secs = worker.interval.as_secs(),
                sent = worker.sent.len(),
                "forward worker started"
            );
            loop {
                worker.tick().await;
                tokio::time::sleep(worker.interval).await;
            }
        })
    }
}

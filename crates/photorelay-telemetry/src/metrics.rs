//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Each `Metrics` owns its own registry, so the session counters are scoped to the
//!   process (or test) that created them and reset on restart.

use std::fmt;
use std::sync::Arc;

use prometheus::{
    Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use serde::Serialize;

use crate::error::{TelemetryError, TelemetryResult};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

impl fmt::Debug for Metrics {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Metrics")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

struct MetricsInner {
    registry: Registry,
    upload_outcomes_total: IntCounterVec,
    photos_received_total: IntCounter,
    photos_forwarded_total: IntCounter,
    forward_failures_total: IntCounterVec,
    forward_cycles_total: IntCounter,
    forward_pending: IntGauge,
    sent_set_size: IntGauge,
}

/// Snapshot of the session counters used by status projections.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Photos accepted by the ingest endpoint since process start.
    pub received: u64,
    /// Photos confirmed forwarded to the remote server since process start.
    pub forwarded: u64,
    /// Forward attempts that failed since process start.
    pub forward_failures: u64,
    /// Completed forward cycles since process start.
    pub forward_cycles: u64,
    /// Candidates left unsent after the latest cycle.
    pub pending: i64,
    /// Names recorded in the durable sent set.
    pub sent_total: i64,
}

/// Failure reasons tracked by `forward_failures_total`.
const FAILURE_REASONS: &[&str] = &["timeout", "unreachable", "rejected", "other"];

/// Outcomes tracked by `upload_outcomes_total`.
const UPLOAD_OUTCOMES: &[&str] = &["stored", "rejected", "too_large", "failed"];

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be built or
    /// registered.
    pub fn new() -> TelemetryResult<Self> {
        let registry = Registry::new();

        let upload_outcomes_total = register(
            &registry,
            "upload_outcomes_total",
            IntCounterVec::new(
                Opts::new("upload_outcomes_total", "Upload requests by outcome"),
                &["outcome"],
            ),
        )?;
        let photos_received_total = register(
            &registry,
            "photos_received_total",
            IntCounter::with_opts(Opts::new(
                "photos_received_total",
                "Photos stored by the ingest endpoint this session",
            )),
        )?;
        let photos_forwarded_total = register(
            &registry,
            "photos_forwarded_total",
            IntCounter::with_opts(Opts::new(
                "photos_forwarded_total",
                "Photos confirmed forwarded to the remote server this session",
            )),
        )?;
        let forward_failures_total = register(
            &registry,
            "forward_failures_total",
            IntCounterVec::new(
                Opts::new("forward_failures_total", "Failed forward attempts by reason"),
                &["reason"],
            ),
        )?;
        let forward_cycles_total = register(
            &registry,
            "forward_cycles_total",
            IntCounter::with_opts(Opts::new(
                "forward_cycles_total",
                "Completed scan-diff-forward cycles",
            )),
        )?;
        let forward_pending = register(
            &registry,
            "forward_pending",
            IntGauge::with_opts(Opts::new(
                "forward_pending",
                "Stored photos not yet forwarded after the latest cycle",
            )),
        )?;
        let sent_set_size = register(
            &registry,
            "sent_set_size",
            IntGauge::with_opts(Opts::new(
                "sent_set_size",
                "Filenames recorded as forwarded in the durable sent set",
            )),
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                upload_outcomes_total,
                photos_received_total,
                photos_forwarded_total,
                forward_failures_total,
                forward_cycles_total,
                forward_pending,
                sent_set_size,
            }),
        })
    }

    /// Count one upload request by outcome. Unknown outcomes are folded into `failed`.
    pub fn inc_upload_outcome(&self, outcome: &str) {
        let label = if UPLOAD_OUTCOMES.contains(&outcome) {
            outcome
        } else {
            "failed"
        };
        self.inner
            .upload_outcomes_total
            .with_label_values(&[label])
            .inc();
    }

    /// Count a photo accepted by the ingest endpoint; returns the new session total.
    pub fn inc_received(&self) -> u64 {
        self.inner.photos_received_total.inc();
        self.inner.photos_received_total.get()
    }

    /// Count a photo confirmed forwarded; returns the new session total.
    pub fn inc_forwarded(&self) -> u64 {
        self.inner.photos_forwarded_total.inc();
        self.inner.photos_forwarded_total.get()
    }

    /// Count a failed forward attempt. Unknown reasons are folded into `other`.
    pub fn inc_forward_failure(&self, reason: &str) {
        let label = if FAILURE_REASONS.contains(&reason) {
            reason
        } else {
            "other"
        };
        self.inner
            .forward_failures_total
            .with_label_values(&[label])
            .inc();
    }

    /// Record the outcome of a completed forward cycle.
    pub fn observe_forward_cycle(&self, pending: usize, sent_total: usize) {
        self.inner.forward_cycles_total.inc();
        self.inner.forward_pending.set(saturating_i64(pending));
        self.inner.sent_set_size.set(saturating_i64(sent_total));
    }

    /// Record the size of the sent set outside a cycle (e.g. after startup load).
    pub fn set_sent_total(&self, sent_total: usize) {
        self.inner.sent_set_size.set(saturating_i64(sent_total));
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the session counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let forward_failures = FAILURE_REASONS
            .iter()
            .map(|reason| {
                self.inner
                    .forward_failures_total
                    .with_label_values(&[*reason])
                    .get()
            })
            .sum();
        MetricsSnapshot {
            received: self.inner.photos_received_total.get(),
            forwarded: self.inner.photos_forwarded_total.get(),
            forward_failures,
            forward_cycles: self.inner.forward_cycles_total.get(),
            pending: self.inner.forward_pending.get(),
            sent_total: self.inner.sent_set_size.get(),
        }
    }
}

fn register<C>(
    registry: &Registry,
    name: &'static str,
    collector: Result<C, prometheus::Error>,
) -> TelemetryResult<C>
where
    C: Collector + Clone + 'static,
{
    let collector = collector.map_err(|source| TelemetryError::MetricsCollector { name, source })?;
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })?;
    Ok(collector)
}

fn saturating_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn fresh_registry_starts_at_zero() -> Result<()> {
        let metrics = Metrics::new()?;
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.received, 0);
        assert_eq!(snapshot.forwarded, 0);
        assert_eq!(snapshot.forward_failures, 0);
        Ok(())
    }

    #[test]
    fn registries_are_isolated_per_instance() -> Result<()> {
        let first = Metrics::new()?;
        let second = Metrics::new()?;
        first.inc_received();
        assert_eq!(first.snapshot().received, 1);
        assert_eq!(second.snapshot().received, 0);
        Ok(())
    }

    #[test]
    fn metrics_snapshot_reflects_updates() -> Result<()> {
        let metrics = Metrics::new()?;
        assert_eq!(metrics.inc_received(), 1);
        assert_eq!(metrics.inc_received(), 2);
        assert_eq!(metrics.inc_forwarded(), 1);
        metrics.inc_forward_failure("timeout");
        metrics.inc_forward_failure("rejected");
        metrics.inc_forward_failure("gremlins");
        metrics.observe_forward_cycle(3, 7);
        metrics.inc_upload_outcome("stored");
        metrics.inc_upload_outcome("too_large");
        metrics.inc_upload_outcome("mystery");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.received, 2);
        assert_eq!(snapshot.forwarded, 1);
        assert_eq!(snapshot.forward_failures, 3);
        assert_eq!(snapshot.forward_cycles, 1);
        assert_eq!(snapshot.pending, 3);
        assert_eq!(snapshot.sent_total, 7);

        let rendered = metrics.render()?;
        assert!(rendered.contains("photos_received_total 2"));
        assert!(rendered.contains("forward_failures_total{reason=\"other\"} 1"));
        assert!(rendered.contains("upload_outcomes_total{outcome=\"stored\"} 1"));
        assert!(rendered.contains("upload_outcomes_total{outcome=\"too_large\"} 1"));
        assert!(rendered.contains("upload_outcomes_total{outcome=\"failed\"} 1"));
        Ok(())
    }
}

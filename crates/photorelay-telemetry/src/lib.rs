#![forbid(unsafe_code)]
#![warn(
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Telemetry primitives shared across the photorelay workspace.
//!
//! Layout: `init.rs` (subscriber installation), `metrics.rs` (Prometheus registry and
//! session counters), `context.rs` (process-wide span guard), `layers.rs` (request-id
//! middleware), `error.rs` (typed failures).

pub mod context;
pub mod error;
pub mod init;
pub mod layers;
pub mod metrics;

pub use context::GlobalContextGuard;
pub use error::{TelemetryError, TelemetryResult};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use context::{current_request_id, forward_cycle_span, with_request_id};
pub use layers::{
    HEADER_REQUEST_ID, RecordResponse, RequestSpan, propagate_request_id_layer,
    set_request_id_layer,
};
pub use metrics::{Metrics, MetricsSnapshot};

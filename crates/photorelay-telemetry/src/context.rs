//! Span helpers shared by the HTTP surface and the forward worker.
//!
//! # Design
//! - The process span carries the relay mode and build SHA so every event inherits them.
//! - The request identifier lives in task-local storage for the duration of a request,
//!   letting handlers attach it to their own events without threading it through.

use std::future::Future;
use std::sync::Arc;

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the application-level span entered for the lifetime of the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the `relay` span tagged with `mode` and the recorded build SHA.
    #[must_use]
    pub fn new(mode: impl Into<String>) -> Self {
        let mode = mode.into();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "relay",
            mode = %mode,
            build_sha = %build_sha()
        )));
        Self {
            _guard: span.enter(),
        }
    }
}

/// Span wrapping a single forward cycle.
#[must_use]
pub fn forward_cycle_span(cycle: u64) -> Span {
    tracing::info_span!(
        "forward.cycle",
        cycle,
        candidates = tracing::field::Empty,
        forwarded = tracing::field::Empty
    )
}

/// Request identifier of the request currently being served, if any.
#[must_use]
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(ToString::to_string).ok()
}

/// Run `fut` with `request_id` visible through [`current_request_id`].
pub async fn with_request_id<Fut, T>(request_id: impl Into<String>, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    let request_id: Arc<str> = Arc::from(request_id.into());
    REQUEST_ID.scope(request_id, fut).await
}

tokio::task_local! {
    static REQUEST_ID: Arc<str>;
}

//! Tower layers for request identification and request spans.
//!
//! # Design
//! - Incoming `x-request-id` values are kept; missing ones are generated as UUIDs.
//! - The request span is built from the (possibly generated) identifier so logs and
//!   responses agree on it.

use std::time::Duration;

use http::{Request, Response};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{MakeSpan, OnResponse},
};
use tracing::Span;

use crate::init::build_sha;

/// Header carrying the request identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Layer that assigns an `x-request-id` to requests lacking one.
#[must_use]
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request's `x-request-id` onto the response.
#[must_use]
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Builds the `http.request` span for each request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(HEADER_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        tracing::info_span!(
            "http.request",
            method = %request.method(),
            route = %request.uri().path(),
            request_id = %request_id,
            build_sha = %build_sha(),
            status_code = tracing::field::Empty,
            latency_ms = tracing::field::Empty
        )
    }
}

/// Records status and latency on the request span once a response is produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordResponse;

impl<B> OnResponse<B> for RecordResponse {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        span.record("status_code", response.status().as_u16());
        span.record(
            "latency_ms",
            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
        );
        tracing::debug!(parent: span, "request completed");
    }
}

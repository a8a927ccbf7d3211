//! `{success: false, error}` error wrapper.

use std::error::Error as StdError;

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use photorelay_storage::IngestError;
use photorelay_telemetry::current_request_id;
use serde::Serialize;
use tracing::{error, warn};

/// Handler error rendered as a JSON failure body.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct FailureBody {
    success: bool,
    error: String,
}

impl ApiError {
    const fn new(status: StatusCode, message: String) -> Self {
        Self { status, message }
    }

    pub(crate) fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, message.into())
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into())
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        if let Some(multipart) = multipart_cause(&err) {
            warn!(error = %multipart, request_id = ?current_request_id(), "upload body rejected");
            Self::with_status(multipart.status(), multipart.body_text())
        } else if err.is_client_error() {
            warn!(error = %err, request_id = ?current_request_id(), "rejected upload");
            Self::bad_request(err.to_string())
        } else {
            let cause = root_cause(&err);
            error!(
                error = %err,
                cause = %cause,
                request_id = ?current_request_id(),
                "failed to store upload"
            );
            Self::internal(cause)
        }
    }
}

/// Multipart failure behind a body error; it carries its own status, such as 413 past the limit.
fn multipart_cause(err: &IngestError) -> Option<&MultipartError> {
    match err {
        IngestError::Body { source } => source.downcast_ref::<MultipartError>(),
        _ => None,
    }
}

/// Message of the innermost error in the source chain.
fn root_cause(err: &(dyn StdError + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = FailureBody {
            success: false,
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

//! `POST /upload`: accept a photo from the camera.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
};
use photorelay_storage::IngestError;
use serde::Serialize;
use tracing::debug;

use crate::http::errors::ApiError;
use crate::state::ApiState;

/// Multipart field expected to carry the photo.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub(crate) struct UploadResponse {
    pub(crate) success: bool,
    pub(crate) filename: String,
    pub(crate) size: u64,
    pub(crate) path: String,
}

pub(crate) async fn upload(
    State(state): State<Arc<ApiState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let result = store_upload(&state, multipart).await;
    let outcome = match &result {
        Ok(_) => "stored",
        Err(err) => outcome_label(err.status),
    };
    state.metrics.inc_upload_outcome(outcome);
    result
}

/// Label for `upload_outcomes_total` given the response status of a failed upload.
fn outcome_label(status: StatusCode) -> &'static str {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        "too_large"
    } else if status.is_client_error() {
        "rejected"
    } else {
        "failed"
    }
}

async fn store_upload(
    state: &ApiState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!(error = %rejection, "request is not multipart");
        IngestError::MissingFile
    })?;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        debug!(error = %err, "malformed multipart body");
        ApiError::with_status(err.status(), err.body_text())
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let declared = field.file_name().map(ToOwned::to_owned);
        let receipt = state.ingest.receive(declared.as_deref(), field).await?;
        return Ok(Json(UploadResponse {
            success: true,
            filename: receipt.name,
            size: receipt.size_bytes,
            path: receipt.path.display().to_string(),
        }));
    }

    Err(IngestError::MissingFile.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_uploads_are_labelled_by_status() {
        assert_eq!(outcome_label(StatusCode::PAYLOAD_TOO_LARGE), "too_large");
        assert_eq!(outcome_label(StatusCode::BAD_REQUEST), "rejected");
        assert_eq!(outcome_label(StatusCode::INTERNAL_SERVER_ERROR), "failed");
    }
}

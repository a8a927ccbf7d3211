//! `GET /list`: stored photos, newest first.

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::{DateTime, Local};
use photorelay_storage::StoredPhoto;
use serde::Serialize;
use tracing::error;

use crate::http::errors::ApiError;
use crate::state::ApiState;

#[derive(Debug, Serialize)]
pub(crate) struct PhotoEntry {
    pub(crate) name: String,
    pub(crate) size: u64,
    pub(crate) modified: DateTime<Local>,
}

impl From<StoredPhoto> for PhotoEntry {
    fn from(photo: StoredPhoto) -> Self {
        Self {
            name: photo.name,
            size: photo.size_bytes,
            modified: photo.modified,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PhotoListResponse {
    pub(crate) files: Vec<PhotoEntry>,
    pub(crate) count: usize,
}

pub(crate) async fn list_photos(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<PhotoListResponse>, ApiError> {
    let mut photos = state.catalog.scan().await.map_err(|err| {
        error!(error = %err, "failed to list stored photos");
        ApiError::internal("failed to list stored photos")
    })?;
    photos.sort_by(|left, right| right.modified.cmp(&left.modified));

    let files: Vec<PhotoEntry> = photos.into_iter().map(PhotoEntry::from).collect();
    Ok(Json(PhotoListResponse {
        count: files.len(),
        files,
    }))
}

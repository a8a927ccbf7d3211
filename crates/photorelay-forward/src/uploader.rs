//! Transfer of a single photo to the remote endpoint.
//!
//! # Design
//! - `RemoteUploader` is the seam the worker depends on; tests substitute scripted uploaders.
//! - `HttpUploader` streams the file as a multipart `file` part typed `image/jpeg`.
//! - Only HTTP 200 counts as success.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use tokio::fs::File;
use url::Url;

use crate::error::{ForwardError, ForwardFailure, ForwardResult};

/// Multipart field carrying the photo.
pub const FILE_FIELD: &str = "file";
/// Content type declared for forwarded photos.
pub const PHOTO_MIME: &str = "image/jpeg";

/// Performs one transfer of a stored photo.
#[async_trait]
pub trait RemoteUploader: Send + Sync {
    /// Upload the file at `path`.
    async fn upload(&self, path: &Path) -> Result<(), ForwardFailure>;
}

/// `reqwest`-backed uploader with a bounded per-transfer timeout.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: Client,
    endpoint: Url,
}

impl HttpUploader {
    /// Uploader posting to `endpoint`, abandoning transfers after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `Client` if the HTTP client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> ForwardResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ForwardError::Client { source })?;
        Ok(Self { client, endpoint })
    }

    /// Endpoint photos are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn photo_part(path: &Path) -> Result<Part, ForwardFailure> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ForwardFailure::Other {
                detail: "photo path has no filename".to_string(),
            })?;
        let file = File::open(path).await.map_err(local_read_failure)?;
        let length = file.metadata().await.map_err(local_read_failure)?.len();
        Part::stream_with_length(Body::from(file), length)
            .file_name(name)
            .mime_str(PHOTO_MIME)
            .map_err(|err| ForwardFailure::Other {
                detail: err.to_string(),
            })
    }
}

#[async_trait]
impl RemoteUploader for HttpUploader {
    async fn upload(&self, path: &Path) -> Result<(), ForwardFailure> {
        let form = Form::new().part(FILE_FIELD, Self::photo_part(path).await?);
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(ForwardFailure::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

fn classify_transport(err: reqwest::Error) -> ForwardFailure {
    if err.is_timeout() {
        ForwardFailure::Timeout
    } else if err.is_connect() {
        ForwardFailure::Unreachable {
            detail: err.to_string(),
        }
    } else {
        ForwardFailure::Other {
            detail: err.to_string(),
        }
    }
}

fn local_read_failure(err: std::io::Error) -> ForwardFailure {
    ForwardFailure::Other {
        detail: format!("failed to read photo: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::prelude::*;
    use photorelay_test_support::{temp_dir, write_photo};

    fn uploader(url: &str, timeout: Duration) -> Result<HttpUploader> {
        Ok(HttpUploader::new(Url::parse(url)?, timeout)?)
    }

    #[tokio::test]
    async fn upload_succeeds_on_http_200() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/upload");
            then.status(200).body("ok");
        });
        let dir = temp_dir()?;
        let photo = write_photo(dir.path(), "a.jpg")?;

        let uploader = uploader(&server.url("/upload"), Duration::from_secs(5))?;
        uploader.upload(&photo).await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn non_200_status_is_rejected() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/upload");
            then.status(500);
        });
        let dir = temp_dir()?;
        let photo = write_photo(dir.path(), "b.jpg")?;

        let uploader = uploader(&server.url("/upload"), Duration::from_secs(5))?;
        let outcome = uploader.upload(&photo).await;
        assert_eq!(outcome, Err(ForwardFailure::Rejected { status: 500 }));
        Ok(())
    }

    #[tokio::test]
    async fn created_status_is_not_success() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/upload");
            then.status(201);
        });
        let dir = temp_dir()?;
        let photo = write_photo(dir.path(), "c.jpg")?;

        let uploader = uploader(&server.url("/upload"), Duration::from_secs(5))?;
        let outcome = uploader.upload(&photo).await;
        assert_eq!(outcome, Err(ForwardFailure::Rejected { status: 201 }));
        Ok(())
    }

    #[tokio::test]
    async fn slow_remote_times_out() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/upload");
            then.status(200).delay(Duration::from_secs(2));
        });
        let dir = temp_dir()?;
        let photo = write_photo(dir.path(), "slow.jpg")?;

        let uploader = uploader(&server.url("/upload"), Duration::from_millis(100))?;
        let outcome = uploader.upload(&photo).await;
        assert_eq!(outcome, Err(ForwardFailure::Timeout));
        Ok(())
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() -> Result<()> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        drop(listener);
        let dir = temp_dir()?;
        let photo = write_photo(dir.path(), "d.jpg")?;

        let uploader = uploader(
            &format!("http://127.0.0.1:{port}/upload"),
            Duration::from_secs(5),
        )?;
        let outcome = uploader.upload(&photo).await;
        assert!(matches!(outcome, Err(ForwardFailure::Unreachable { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn missing_local_file_is_other_failure() -> Result<()> {
        let dir = temp_dir()?;
        let uploader = uploader("http://127.0.0.1:9/upload", Duration::from_secs(1))?;
        let outcome = uploader.upload(&dir.path().join("gone.jpg")).await;
        assert!(matches!(outcome, Err(ForwardFailure::Other { .. })));
        Ok(())
    }
}

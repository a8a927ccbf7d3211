//! Accepting uploaded photos onto disk.
//!
//! # Design
//! - The body streams into a hidden `.<uuid>.part` file in the save directory, is fsynced,
//!   and only then receives its final name, so scans never see a partial photo.
//! - The temp file is removed on every path; `prepare` sweeps any a crash left behind.
//! - Size is measured from disk after commit.

use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use photorelay_telemetry::Metrics;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::allocator::FilenameAllocator;
use crate::clock::{Clock, SystemClock};
use crate::error::{IngestError, IngestResult, StorageError, StorageResult};

const TEMP_SUFFIX: &str = ".part";

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReceipt {
    /// Final name inside the save directory.
    pub name: String,
    /// Size of the stored file in bytes.
    pub size_bytes: u64,
    /// Absolute path of the stored file.
    pub path: PathBuf,
}

/// Stores uploaded photos under collision-free names.
#[derive(Debug, Clone)]
pub struct IngestService {
    save_dir: PathBuf,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl IngestService {
    /// Service writing into `save_dir` using the system clock.
    #[must_use]
    pub fn new(save_dir: impl Into<PathBuf>, metrics: Metrics) -> Self {
        Self::with_clock(save_dir, Arc::new(SystemClock), metrics)
    }

    /// Service with an explicit clock.
    #[must_use]
    pub fn with_clock(save_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>, metrics: Metrics) -> Self {
        Self {
            save_dir: save_dir.into(),
            clock,
            metrics,
        }
    }

    /// Directory uploads are stored in.
    #[must_use]
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Photos received during this session.
    #[must_use]
    pub fn received_count(&self) -> u64 {
        self.metrics.snapshot().received
    }

    /// Create the save directory and remove upload temp files left by an interrupted run.
    ///
    /// Must run before uploads are accepted. Returns the number of files removed.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be created or listed.
    pub async fn prepare(&self) -> StorageResult<usize> {
        fs::create_dir_all(&self.save_dir)
            .await
            .map_err(|source| StorageError::io("ingest.create_dir", &self.save_dir, source))?;
        let mut entries = fs::read_dir(&self.save_dir)
            .await
            .map_err(|source| StorageError::io("ingest.read_dir", &self.save_dir, source))?;

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| StorageError::io("ingest.read_dir", &self.save_dir, source))?
        {
            let stale = entry.file_name().to_str().is_some_and(is_upload_temp)
                && entry.file_type().await.is_ok_and(|kind| kind.is_file());
            if !stale {
                continue;
            }
            let path = entry.path();
            match fs::remove_file(&path).await {
                Ok(()) => {
                    debug!(path = %path.display(), "removed stale upload temp file");
                    removed += 1;
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to remove stale upload temp file");
                }
            }
        }
        if removed > 0 {
            info!(removed, save_dir = %self.save_dir.display(), "cleared interrupted uploads");
        }
        Ok(removed)
    }

    /// Store one uploaded file.
    ///
    /// `declared` is the client-supplied filename; `body` yields the file contents.
    ///
    /// # Errors
    ///
    /// - `MissingFilename` when `declared` is absent or has no usable final component.
    /// - `Body` when the stream fails; nothing is left on disk.
    /// - `Storage` for filesystem failures.
    pub async fn receive<S, B, E>(&self, declared: Option<&str>, body: S) -> IngestResult<IngestReceipt>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let allocator = declared
            .and_then(|name| FilenameAllocator::new(name, self.clock.now()))
            .ok_or(IngestError::MissingFilename)?;

        fs::create_dir_all(&self.save_dir)
            .await
            .map_err(|source| StorageError::io("ingest.create_dir", &self.save_dir, source))?;

        let temp = self.save_dir.join(format!(".{}{TEMP_SUFFIX}", Uuid::new_v4()));
        let outcome = self.write_and_commit(&temp, &allocator, body).await;
        if let Err(err) = fs::remove_file(&temp).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %temp.display(), error = %err, "failed to remove upload temp file");
            }
        }
        let name = outcome?;

        let stored = self.save_dir.join(&name);
        let size_bytes = fs::metadata(&stored)
            .await
            .map_err(|source| StorageError::io("ingest.stat", &stored, source))?
            .len();
        let path = std::path::absolute(&stored)
            .map_err(|source| StorageError::io("ingest.absolute_path", &stored, source))?;

        let received = self.metrics.inc_received();
        info!(filename = %name, size_bytes, received, "photo stored");

        Ok(IngestReceipt {
            name,
            size_bytes,
            path,
        })
    }

    async fn write_and_commit<S, B, E>(
        &self,
        temp: &Path,
        allocator: &FilenameAllocator,
        body: S,
    ) -> IngestResult<String>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(temp)
            .await
            .map_err(|source| StorageError::io("ingest.create_temp", temp, source))?;

        let mut body = std::pin::pin!(body);
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|source| IngestError::Body {
                source: source.into(),
            })?;
            file.write_all(chunk.as_ref())
                .await
                .map_err(|source| StorageError::io("ingest.write", temp, source))?;
        }
        sync_and_close(file, temp).await?;

        Ok(allocator.commit(temp, &self.save_dir).await?)
    }
}

fn is_upload_temp(name: &str) -> bool {
    name.len() > TEMP_SUFFIX.len() + 1 && name.starts_with('.') && name.ends_with(TEMP_SUFFIX)
}

async fn sync_and_close(mut file: fs::File, temp: &Path) -> StorageResult<()> {
    file.flush()
        .await
        .map_err(|source| StorageError::io("ingest.flush", temp, source))?;
    file.sync_all()
        .await
        .map_err(|source| StorageError::io("ingest.sync", temp, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use anyhow::Result;
    use chrono::{DateTime, Local, TimeZone};
    use futures_util::stream;
    use photorelay_test_support::{SAMPLE_JPEG, temp_dir};
    use std::io;

    fn frozen() -> Result<DateTime<Local>> {
        Local
            .with_ymd_and_hms(2024, 5, 1, 8, 0, 1)
            .single()
            .ok_or_else(|| anyhow::anyhow!("ambiguous local time"))
    }

    fn service(dir: &Path) -> Result<IngestService> {
        Ok(IngestService::with_clock(
            dir,
            Arc::new(FixedClock(frozen()?)),
            Metrics::new()?,
        ))
    }

    fn body(bytes: &[u8]) -> impl Stream<Item = Result<Vec<u8>, io::Error>> + use<> {
        let (head, tail) = bytes.split_at(bytes.len() / 2);
        stream::iter(vec![Ok(head.to_vec()), Ok(tail.to_vec())])
    }

    fn entries(dir: &Path) -> Result<Vec<String>> {
        let mut names = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
            .collect::<Result<Vec<_>, _>>()?;
        names.sort();
        Ok(names)
    }

    #[tokio::test]
    async fn same_second_uploads_get_suffixed_names() -> Result<()> {
        let dir = temp_dir()?;
        let save_dir = dir.path().join("photos");
        let ingest = service(&save_dir)?;

        let first = ingest.receive(Some("photo.jpg"), body(SAMPLE_JPEG)).await?;
        let second = ingest.receive(Some("photo.jpg"), body(SAMPLE_JPEG)).await?;

        assert_eq!(first.name, "photo_20240501_080001.jpg");
        assert_eq!(second.name, "photo_20240501_080001_1.jpg");
        assert_eq!(first.size_bytes, SAMPLE_JPEG.len() as u64);
        assert!(first.path.is_absolute());
        assert_eq!(std::fs::read(&second.path)?, SAMPLE_JPEG);
        assert_eq!(ingest.received_count(), 2);
        assert_eq!(entries(&save_dir)?, vec![first.name, second.name]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_filename_is_rejected_without_side_effects() -> Result<()> {
        let dir = temp_dir()?;
        let save_dir = dir.path().join("photos");
        let ingest = service(&save_dir)?;

        let missing = ingest.receive(None, body(SAMPLE_JPEG)).await;
        assert!(matches!(missing, Err(IngestError::MissingFilename)));
        let empty = ingest.receive(Some(""), body(SAMPLE_JPEG)).await;
        assert!(matches!(empty, Err(IngestError::MissingFilename)));

        assert!(!save_dir.exists());
        assert_eq!(ingest.received_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn aborted_body_leaves_nothing_behind() -> Result<()> {
        let dir = temp_dir()?;
        let ingest = service(dir.path())?;
        let broken = stream::iter(vec![
            Ok(b"partial".to_vec()),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ]);

        let result = ingest.receive(Some("photo.jpg"), broken).await;
        assert!(matches!(result, Err(IngestError::Body { .. })));
        assert!(entries(dir.path())?.is_empty());
        assert_eq!(ingest.received_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn empty_body_is_stored_as_empty_file() -> Result<()> {
        let dir = temp_dir()?;
        let ingest = service(dir.path())?;
        let receipt = ingest
            .receive(Some("blank.jpg"), stream::iter(Vec::<Result<Vec<u8>, io::Error>>::new()))
            .await?;
        assert_eq!(receipt.size_bytes, 0);
        Ok(())
    }

    #[tokio::test]
    async fn unwritable_save_dir_reports_storage_error() -> Result<()> {
        let dir = temp_dir()?;
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file")?;
        let ingest = service(&blocker.join("photos"))?;

        let result = ingest.receive(Some("photo.jpg"), body(SAMPLE_JPEG)).await;
        match result {
            Err(err @ IngestError::Storage { .. }) => assert!(!err.is_client_error()),
            other => anyhow::bail!("expected storage error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn prepare_creates_dir_and_clears_interrupted_uploads() -> Result<()> {
        let dir = temp_dir()?;
        let save_dir = dir.path().join("photos");
        let ingest = service(&save_dir)?;

        assert_eq!(ingest.prepare().await?, 0);
        assert!(save_dir.is_dir());

        std::fs::write(save_dir.join(format!(".{}.part", Uuid::new_v4())), b"half")?;
        std::fs::write(save_dir.join("kept.jpg"), SAMPLE_JPEG)?;
        std::fs::write(save_dir.join("notes.part"), b"visible")?;
        std::fs::create_dir(save_dir.join(".nested.part"))?;

        assert_eq!(ingest.prepare().await?, 1);
        assert_eq!(
            entries(&save_dir)?,
            vec![".nested.part", "kept.jpg", "notes.part"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn prepare_reports_uncreatable_dir() -> Result<()> {
        let dir = temp_dir()?;
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file")?;
        let ingest = service(&blocker.join("photos"))?;

        assert!(matches!(
            ingest.prepare().await,
            Err(StorageError::Io {
                operation: "ingest.create_dir",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn upload_temp_names_are_recognised() {
        assert!(is_upload_temp(".0b7c.part"));
        assert!(!is_upload_temp(".part"));
        assert!(!is_upload_temp("photo.part"));
        assert!(!is_upload_temp(".photo.jpg"));
    }
}

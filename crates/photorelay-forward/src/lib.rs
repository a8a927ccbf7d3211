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

//! Forwarding of stored photos to the remote aggregation server.
//!
//! Layout: `uploader.rs` (single multipart transfer), `worker.rs` (periodic
//! scan-diff-forward loop), `error.rs`.

pub mod error;
pub mod uploader;
pub mod worker;

pub use error::{ForwardError, ForwardFailure, ForwardResult};
pub use uploader::{FILE_FIELD, HttpUploader, PHOTO_MIME, RemoteUploader};
pub use worker::{CycleReport, ForwardWorker};

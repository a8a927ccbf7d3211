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

//! Photo storage for the relay: collision-free naming, upload ingestion, directory scans,
//! and the durable record of forwarded files.
//!
//! Layout: `allocator.rs` (unique names), `ingest.rs` (upload to disk), `catalog.rs`
//! (photo listing), `sent_set.rs` (forwarded record), `clock.rs` (time seam), `error.rs`.

pub mod allocator;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod ingest;
pub mod sent_set;

pub use allocator::FilenameAllocator;
pub use catalog::{PHOTO_PATTERN, PhotoCatalog, StoredPhoto};
pub use clock::{Clock, FixedClock, SystemClock, TIMESTAMP_FORMAT};
pub use error::{IngestError, IngestResult, StorageError, StorageResult};
pub use ingest::{IngestReceipt, IngestService};
pub use sent_set::{SentSet, SentSetStore};

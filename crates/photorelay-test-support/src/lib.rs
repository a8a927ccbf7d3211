#![forbid(unsafe_code)]
#![warn(
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Shared test helpers used across the photorelay crates.
//! Layout: fixtures.rs (temp directories, sample photos), multipart.rs (hand-built upload bodies).

pub mod fixtures;
pub mod multipart;

pub use fixtures::{SAMPLE_JPEG, temp_dir, write_file, write_photo};
pub use multipart::{MultipartBody, TEST_BOUNDARY};

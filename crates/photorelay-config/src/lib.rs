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

//! Typed relay configuration assembled from defaults, an optional JSON file, and
//! command-line overrides.
//!
//! Layout: `model.rs` (resolved `RelayConfig`), `defaults.rs` (baseline values),
//! `loader.rs` (layer merging and file parsing), `validate.rs` (field checks),
//! `error.rs` (typed failures).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLayer, load};
pub use model::RelayConfig;

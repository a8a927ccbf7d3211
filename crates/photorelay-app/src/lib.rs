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

//! Photo relay application wiring.
//!
//! Layout: `cli.rs` (flags and environment), `bootstrap.rs` (service wiring and
//! shutdown), `error.rs` (application errors).

/// Application bootstrap and service wiring.
pub mod bootstrap;
/// Command-line parsing.
pub mod cli;
/// Application-level errors.
pub mod error;

pub use bootstrap::{Relay, run_app};
pub use cli::Cli;
pub use error::{AppError, AppResult};

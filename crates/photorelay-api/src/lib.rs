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

//! HTTP surface for the relay: photo upload, health, listing, status page and metrics.
//!
//! Layout: `state.rs` (shared handler state), `http/` (router, handlers, error mapping,
//! request metrics), `error.rs` (server lifecycle failures).

pub mod error;
pub mod http;
pub mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
pub use state::ApiState;

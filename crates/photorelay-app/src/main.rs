#![forbid(unsafe_code)]
#![warn(
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Binary entrypoint that parses the command line and runs the photo relay.

use clap::Parser;
use photorelay_app::{AppResult, Cli, run_app};

/// Boots the relay and blocks until shutdown.
#[tokio::main]
async fn main() -> AppResult<()> {
    run_app(Cli::parse()).await
}

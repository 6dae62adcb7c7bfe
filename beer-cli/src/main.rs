//! Binary crate for the `beer` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Serving the HTTP API

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = beer_cli::cli::Cli::parse();
    cmd.run().await
}

//! Postforge CLI — automatic article generator for the Segeln Lernen blog.
//!
//! One command drafts, checks, assembles, and publishes a complete
//! article; derived index pages are rebuilt from the content store.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}

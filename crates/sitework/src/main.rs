//! Sitework CLI binary.

use anyhow::Result;
use sitework::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the sitework CLI.
///
/// Uses tokio's current_thread runtime; all I/O is a couple of sequential
/// file reads and writes.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=sitework=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sitework=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting sitework CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Sitework CLI completed successfully");
    Ok(())
}

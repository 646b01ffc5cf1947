//! Lockview CLI binary.

use anyhow::Result;
use lockview::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the lockview CLI.
///
/// The viewer core is single-threaded, so the binary runs on tokio's
/// current_thread runtime.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=lockview=debug,lockview_transform=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lockview=info,lockview_transform=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting lockview CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Lockview CLI completed successfully");
    Ok(())
}

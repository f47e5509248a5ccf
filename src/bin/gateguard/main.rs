//! gateguard CLI entry point.

mod cli;

use clap::Parser;
use cli::Cli;
use gateguard::{KeyRing, ReplayLedger, SystemClock, VerificationService};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("gateguard v{}", env!("CARGO_PKG_VERSION"));

    // Build configuration
    let config = cli.into_config()?;

    // Startup order matters: keys, then ledger, then the service. Either
    // failing aborts startup; no partial service.
    let keys = Arc::new(KeyRing::fetch(&config.key_source_url).await?);
    let ledger = Arc::new(ReplayLedger::load(&config.ledger_path)?);

    let service = Arc::new(VerificationService::new(
        Arc::clone(&keys),
        Arc::clone(&ledger),
        Arc::new(SystemClock),
        config.cache.capacity,
        Duration::from_secs(config.cache.ttl_secs),
    ));

    // Serve until shutdown; in-flight requests drain before this returns.
    gateguard::http::serve(service, config.port).await?;

    // Orderly shutdown: the only ledger write of the process lifetime.
    ledger.flush()?;

    info!("Goodbye!");
    Ok(())
}

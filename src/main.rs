use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinic_scheduler::cli::{self, Cli};
use clinic_scheduler::config::Config;
use clinic_scheduler::{Clinic, ClinicError};

#[tokio::main]
async fn main() {
    if let Err(e) = try_main().await {
        eprintln!("error: {:#}", e);
        // Bad input exits 1; store or setup problems exit 2
        let code = match e.downcast_ref::<ClinicError>() {
            Some(err) if err.is_recoverable() => 1,
            _ => 2,
        };
        std::process::exit(code);
    }
}

async fn try_main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config)?;
    if let Some(database) = &cli.database {
        config.store.database = Some(database.clone());
    }

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting clinic v{}", env!("CARGO_PKG_VERSION"));

    let clinic = Clinic::open(&config).await?;

    cli::run(&clinic, cli.command, cli.json).await?;

    clinic.db().close().await;
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tileboard::{
    config::Config,
    database::Database,
    repositories::SettingsRepository,
    scheduler::{create_shutdown_channel, SweepScheduler},
    services::{SetupGate, TileStore},
};

#[derive(Parser)]
#[command(name = "tileboard")]
#[command(version)]
#[command(about = "A status-board tile store with automatic expiry of stale tiles")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Seconds between expiry sweeps (overrides config file)
    #[arg(short = 's', long, value_name = "SECONDS")]
    sweep_interval: Option<u64>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("tileboard={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tileboard v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }
    if let Some(sweep_interval) = cli.sweep_interval {
        config.sweep.interval_seconds = sweep_interval;
    }
    config.validate()?;

    info!("Using database: {}", config.database.url);
    let database = Database::new(&config.database).await?;
    database.migrate().await?;

    let setup_gate = SetupGate::load(SettingsRepository::new(&database)).await?;
    if !setup_gate.is_completed().await {
        warn!("Board setup has not been completed");
    }

    let store = TileStore::sqlite(&database);
    let health = store.health().await?;
    info!("{} active tiles", health.active_tiles);

    let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
    let sweeper = if config.sweep.enabled {
        let scheduler = SweepScheduler::new(
            store.clone(),
            Duration::from_secs(config.sweep.interval_seconds),
            shutdown_rx,
        );
        Some(tokio::spawn(scheduler.start()))
    } else {
        info!("Automatic expiry sweep disabled");
        None
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutting down gracefully...");

    let _ = shutdown_tx.send(());
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            warn!("Sweep scheduler task failed: {}", e);
        }
    }

    database.close().await;
    Ok(())
}

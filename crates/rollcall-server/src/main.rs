//! Rollcall analytics server - main entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use rollcall_common::init_logging;
use rollcall_config::ConfigLoader;
use rollcall_server::RollcallServer;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "ROLLCALL_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// JSON dataset with `students` and `events`
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8080
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ConfigLoader::load(args.config.as_deref()).context("Failed to load configuration")?;

    if let Some(data) = args.data {
        config.server.data_path = Some(data);
    }
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config
        .validate_all()
        .context("Invalid configuration after command line overrides")?;

    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        timezone = %config.analytics.timezone,
        cache_ttl_seconds = config.analytics.cache_ttl_seconds,
        "Starting Rollcall analytics server"
    );

    let server = RollcallServer::new(config).await?;
    server.start().await?;

    Ok(())
}

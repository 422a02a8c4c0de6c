//! Gatehouse Server - Main entry point.

use anyhow::Context;
use clap::Parser;
use gatehouse_inbound::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gatehouse-server")]
#[command(about = "Gatehouse - proxy inbound authentication and hooks")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/gatehouse.json", env = "GATEHOUSE_CONFIG")]
    config: String,

    /// Parse the configuration, provision users, and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting Gatehouse server...");
    tracing::info!("Configuration: {}", cli.config);

    let config = ServerConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;
    let inbounds = config.build().context("failed to build inbounds")?;

    if inbounds.is_empty() {
        tracing::warn!("No inbounds configured");
    }
    for inbound in inbounds.iter() {
        tracing::info!(
            tag = inbound.tag(),
            protocol = inbound.protocol(),
            users = inbound.user_count(),
            "Inbound ready"
        );
    }

    if cli.check {
        tracing::info!("Configuration OK");
        return Ok(());
    }

    tracing::info!("Gatehouse server started successfully");

    // Keep the server running
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    Ok(())
}

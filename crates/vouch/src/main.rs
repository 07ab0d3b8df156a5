//! # Vouch - Discord verification bot
//!
//! Verifies members by sending a one-time code over DM and waiting for
//! them to type it back. Verified members are recorded in PostgreSQL and
//! mirrored into Redis for cheap existence checks.
//!
//! ## Architecture
//! ```text
//! Discord ⇄ poise commands → VerificationService
//!                                ├─ Redis (existence cache)
//!                                └─ PostgreSQL (source of truth)
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cache;
mod challenge;
mod config;
mod discord;
mod routes;
mod service;
mod state;
mod store;

#[cfg(test)]
mod testing;

use crate::config::AppConfig;
use crate::state::AppState;

/// Vouch - DM code verification bot
#[derive(Parser, Debug)]
#[command(name = "vouch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/vouch.toml")]
    config: String,

    /// Redis URL (overrides config)
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// PostgreSQL URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Discord bot token (overrides config)
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    discord_token: Option<String>,

    /// Health probe listen address (overrides config)
    #[arg(long, env = "HEALTH_ADDR")]
    health_addr: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Vouch v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(&args.config, &args)?;
    info!("Configuration loaded from {}", args.config);

    let state = AppState::connect(config.clone()).await?;
    info!(redis = %config.redis_url, "Redis and PostgreSQL connected");

    // The cache must mirror the store before any command runs
    let sync = state
        .verification
        .rebuild_cache()
        .await
        .context("Failed to rebuild the verification cache")?;
    info!(
        records = sync.records,
        restored = sync.restored,
        pruned = sync.pruned,
        "Verification cache rebuilt"
    );

    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    if let Some(addr) = config.health_addr.clone() {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind health probes on {}", addr))?;
        let app = routes::create_router(state.clone());
        let mut shutdown = shutdown_tx.subscribe();
        info!("Health probes listening on {}", addr);

        tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown.recv().await;
                })
                .await;
            if let Err(e) = served {
                error!(error = %e, "Health server error");
            }
        });
    }

    let mut client = discord::build_client(state).await?;

    // Handle graceful shutdown
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            return;
        }
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
        shard_manager.shutdown_all().await;
    });

    client.start().await.context("Discord client error")?;

    info!("Vouch shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    Ok(())
}

//! Custody-signed swap batch runner
//!
//! Entry point: loads configuration, wires the connection handles, custody
//! client, and optional relay forwarder, then runs the full batch loop to
//! completion. Swap parameters come from configuration, not CLI arguments.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![warn(dead_code)]
#![warn(unused_must_use)]

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swapbot::config::Config;
use swapbot::connection::ConnectionManager;
use swapbot::custody::CustodyClient;
use swapbot::event_log::{EventSink, FileEventSink};
use swapbot::jito::{JitoClient, RelayForwarder};
use swapbot::orchestrator::BatchOrchestrator;
use swapbot::pipeline::SwapPipeline;
use swapbot::types::{BroadcastMode, SwapRequest};
use swapbot::wallet::{Ed25519RequestSigner, VaultAccount};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    info!("Starting swap batch runner");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    info!("Loading configuration from: {}", args.config);
    let config = load_config(&args.config)?;
    config.validate().context("Invalid configuration")?;

    // Connection provider failure is the only startup-fatal remote concern
    let conn = Arc::new(
        ConnectionManager::new(&config.rpc).context("Failed to initialize connections")?,
    );
    if !conn.health_check().await {
        warn!("Ledger RPC health check failed; continuing anyway");
    }

    let vault = VaultAccount::from_str(&config.custody.vault_address)
        .context("Invalid vault address")?;
    info!("Vault address: {}", vault.address());

    let signer = Arc::new(
        Ed25519RequestSigner::from_file(&config.custody.api_signer_key_path)
            .context("Failed to load API signer key")?,
    );
    let custody = CustodyClient::new(conn.http().clone(), &config.custody, signer);

    let relay = match config.swap.broadcast_mode {
        BroadcastMode::Relay => {
            info!(
                "Relay broadcast enabled via {}",
                config.jito.block_engine_url
            );
            Some(RelayForwarder::new(
                JitoClient::new(conn.http().clone(), config.jito.block_engine_url.clone()),
                config.jito.tip_lamports,
            ))
        }
        BroadcastMode::Direct => None,
    };

    let sink: Arc<dyn EventSink> = Arc::new(FileEventSink::create(&config.run.log_path));

    let request = SwapRequest {
        pool: Pubkey::from_str(&config.swap.pool).context("Invalid pool address")?,
        input_mint: Pubkey::from_str(&config.swap.input_mint).context("Invalid input mint")?,
        amount_in: config.swap.amount_in,
        fee_payer: vault.address(),
        slippage_bps: config.swap.slippage_bps,
        broadcast_mode: config.swap.broadcast_mode,
    };
    info!(
        pool = %request.pool,
        input_mint = %request.input_mint,
        amount_in = request.amount_in,
        broadcast_mode = ?request.broadcast_mode,
        "Swap parameters fixed for this run"
    );

    let pipeline = SwapPipeline::new(
        Arc::clone(&conn),
        vault,
        config.custody.vault_id.clone(),
        custody,
        relay,
        Arc::clone(&sink),
    );

    let mut orchestrator =
        BatchOrchestrator::new(pipeline, request, config.run.clone(), Arc::clone(&sink));
    let summary = orchestrator.run().await;

    info!(
        "Run finished: {} swaps, mean {}ms, p50 {}ms, p90 {}ms, p99 {}ms, min {}ms, max {}ms",
        summary.count,
        summary.mean_ms,
        summary.percentiles.p50,
        summary.percentiles.p90,
        summary.percentiles.p99,
        summary.min_ms,
        summary.max_ms
    );
    info!("Timing details appended to {}", config.run.log_path);

    Ok(())
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        "swapbot=debug,info"
    } else {
        "swapbot=info,warn,error"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        warn!("Config file '{}' not found, using defaults", path);
        dotenvy::dotenv().ok();
        let mut config = Config::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

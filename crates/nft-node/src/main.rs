//! # nft-node
//!
//! Entry point: see the library docs for the startup sequence.

use std::sync::Arc;

use anyhow::{Context, Result};
use nft_node::{NodeConfig, NodeRuntime};
use nft_sync::JsonRpcLedger;
use nft_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;

    info!("===========================================");
    info!("  nft-sync node v{}", nft_sync::VERSION);
    info!("===========================================");

    let config = NodeConfig::from_env().context("Invalid node configuration")?;

    let mut ledger = JsonRpcLedger::new(config.rpc_url.clone(), config.contract);
    if let Some(sender) = config.sender {
        ledger = ledger.with_sender(sender);
    }

    let mut runtime = NodeRuntime::new(config, Arc::new(ledger));
    runtime.start();

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}

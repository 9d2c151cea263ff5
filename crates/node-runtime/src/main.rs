//! # Ledger Node
//!
//! Runs a reference node: loads the enabled transaction families, orders
//! submissions into blocks and serves the HTTP API.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then `LF_*` environment overrides)
//! 2. Validate configuration and load families; any error aborts startup
//! 3. Start the ordering loop
//! 4. Serve HTTP until Ctrl+C

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use node_runtime::{serve, spawn_ordering_loop, LedgerNode, NodeConfig};

fn load_config() -> NodeConfig {
    NodeConfig::default().apply_env_overrides()
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config();
    let node = Arc::new(LedgerNode::new(config).context("Failed to start node")?);

    info!("===========================================");
    info!("  Ledger Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let ordering = spawn_ordering_loop(Arc::clone(&node));

    let server = if node.config().api.enabled {
        let addr = node.config().api.http_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        Some(tokio::spawn(serve(Arc::clone(&node), listener)))
    } else {
        None
    };

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    node.shutdown();
    ordering.await.context("Ordering loop panicked")?;
    if let Some(server) = server {
        server
            .await
            .context("HTTP server panicked")?
            .context("HTTP server failed")?;
    }

    info!("Shutdown complete");
    Ok(())
}

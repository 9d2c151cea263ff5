//! # Ordering Loop
//!
//! Stand-in for consensus: one block per interval, until shutdown.

use crate::node::LedgerNode;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Spawn the loop that calls [`LedgerNode::commit_block`] every block
/// interval. Ends when the node's shutdown signal fires.
pub fn spawn_ordering_loop(node: Arc<LedgerNode>) -> JoinHandle<()> {
    let mut shutdown = node.shutdown_signal();
    let interval = node.config().ordering.block_interval();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(?interval, "[ordering] Started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(summary) = node.commit_block().await {
                        debug!(block = summary.block, size = summary.outcomes.len(), "[ordering] Round complete");
                    }
                }
                _ = shutdown.changed() => {
                    info!("[ordering] Shutdown signal received");
                    break;
                }
            }
        }
    })
}

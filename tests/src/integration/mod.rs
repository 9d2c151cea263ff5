//! # Integration Flows

mod agreement;
mod commit_flows;
mod http_flows;

#[cfg(test)]
pub(crate) mod fixtures {
    use lf_01_signing::KeyPair;
    use lf_02_family_core::TransactionFamily;
    use lf_05_client::{FamilyClient, WaitPolicy};
    use node_runtime::{LedgerNode, LocalTransport, NodeConfig};
    use std::sync::Arc;
    use std::time::Duration;

    pub fn fast_config() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.ordering.block_interval_ms = 10;
        config
    }

    pub fn fast_polling() -> WaitPolicy {
        WaitPolicy {
            poll_interval: Duration::from_millis(5),
            max_poll_interval: Duration::from_millis(20),
        }
    }

    pub fn node() -> Arc<LedgerNode> {
        Arc::new(LedgerNode::new(fast_config()).unwrap())
    }

    /// A waiting client on `node` with a fresh key.
    pub fn client<F: TransactionFamily>(
        family: F,
        node: &Arc<LedgerNode>,
        key: KeyPair,
    ) -> FamilyClient<F, LocalTransport> {
        FamilyClient::new(family, LocalTransport::new(Arc::clone(node)), key)
            .with_wait(true, Some(Duration::from_secs(5)))
            .with_wait_policy(fast_polling())
    }
}

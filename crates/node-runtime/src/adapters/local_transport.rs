//! # In-Process Transport
//!
//! Lets a `FamilyClient` talk to a node in the same process, with the same
//! error mapping the HTTP API produces.

use crate::errors::NodeError;
use crate::node::LedgerNode;
use async_trait::async_trait;
use lf_05_client::{Transport, TransportError};
use shared_types::{SignedEnvelope, SubmissionId, SubmissionStatus};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LocalTransport {
    node: Arc<LedgerNode>,
}

impl LocalTransport {
    pub fn new(node: Arc<LedgerNode>) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &Arc<LedgerNode> {
        &self.node
    }
}

fn refused(e: NodeError) -> TransportError {
    TransportError::Refused {
        status: e.status_code(),
        kind: e.kind().to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn submit(&self, envelope: &SignedEnvelope) -> Result<SubmissionId, TransportError> {
        self.node.submit(envelope.clone()).await.map_err(refused)
    }

    async fn status(&self, id: &SubmissionId) -> Result<SubmissionStatus, TransportError> {
        self.node
            .status(id)
            .ok_or_else(|| TransportError::UnknownSubmission(id.clone()))
    }

    async fn fetch_store(&self, name: &str) -> Result<BTreeMap<String, String>, TransportError> {
        match self.node.store_entries(name).map_err(refused)? {
            Some((_, entries)) => Ok(entries),
            None => Err(TransportError::Refused {
                status: 404,
                kind: "not_found".to_string(),
                message: format!("unknown store {name}"),
            }),
        }
    }
}

//! # Transport Port
//!
//! What the client needs from a ledger node. Implemented over HTTP by
//! `HttpTransport` and in-process by the node runtime.

use crate::errors::TransportError;
use async_trait::async_trait;
use shared_types::{SignedEnvelope, SubmissionId, SubmissionStatus};
use std::collections::BTreeMap;
use std::sync::Arc;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Hand a signed envelope to the node. Returns the id to poll.
    async fn submit(&self, envelope: &SignedEnvelope) -> Result<SubmissionId, TransportError>;

    /// Current status of a submission.
    async fn status(&self, id: &SubmissionId) -> Result<SubmissionStatus, TransportError>;

    /// Committed contents of the named store.
    async fn fetch_store(&self, name: &str) -> Result<BTreeMap<String, String>, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn submit(&self, envelope: &SignedEnvelope) -> Result<SubmissionId, TransportError> {
        (**self).submit(envelope).await
    }

    async fn status(&self, id: &SubmissionId) -> Result<SubmissionStatus, TransportError> {
        (**self).status(id).await
    }

    async fn fetch_store(&self, name: &str) -> Result<BTreeMap<String, String>, TransportError> {
        (**self).fetch_store(name).await
    }
}

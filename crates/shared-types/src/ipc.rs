//! # Node API Payloads
//!
//! Request and response bodies exchanged between a client and a node.
//!
//! | Route | Request | Response |
//! |-------|---------|----------|
//! | `POST /transactions` | `SignedEnvelope` | `SubmitResponse` |
//! | `GET /transactions/{id}` | - | `StatusResponse` |
//! | `GET /store/{name}` | - | `StoreResponse` |
//!
//! Errors use `ErrorResponse` with a non-2xx status code.

use crate::entities::{SubmissionId, SubmissionStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response to an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Identifier to poll for commit status.
    pub id: SubmissionId,
}

/// Commit status of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: SubmissionId,
    #[serde(flatten)]
    pub status: SubmissionStatus,
}

/// Committed contents of one family store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreResponse {
    /// Store name, e.g. `ClinicalTransaction`.
    pub name: String,
    /// Number of the last committed block.
    pub block: u64,
    pub entries: BTreeMap<String, String>,
}

/// Error body for any failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable kind (`rejected`, `not_found`, `bad_request`).
    pub kind: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

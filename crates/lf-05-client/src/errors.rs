//! # Client Errors
//!
//! | Variant | Meaning | Retry? |
//! |---------|---------|--------|
//! | `Validation` | family `validate` refused the update locally | no, fix the fields |
//! | `Rejected` | the node's `validate` refused it after submission | no, fix the fields |
//! | `Signing` | key material unreadable or malformed | no |
//! | `Transport` | the node could not be reached or answered badly | yes |
//! | `Timeout` | the wait deadline elapsed; not a rejection | yes |
//! | `Configuration` | client setup problem | no |
//! | `Cancelled` | the wait was shut down by the caller | no |

use lf_01_signing::SigningError;
use lf_02_family_core::ValidationError;
use shared_types::SubmissionId;
use std::time::Duration;
use thiserror::Error;

/// Failures at the node boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot connect to {0}")]
    Connection(String),

    #[error("request failed: {0}")]
    Request(String),

    /// The node answered with an error body.
    #[error("node refused request ({status} {kind}): {message}")]
    Refused {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("unknown submission {0}")]
    UnknownSubmission(SubmissionId),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Whether repeating the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Connection(_) | TransportError::Request(_) => true,
            TransportError::Refused { status, .. } => *status >= 500,
            TransportError::UnknownSubmission(_) | TransportError::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("transaction {id} rejected: {reason}")]
    Rejected { id: SubmissionId, reason: String },

    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("timed out after {waited:?} waiting for {id} to commit")]
    Timeout { id: SubmissionId, waited: Duration },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("wait for {0} cancelled")]
    Cancelled(SubmissionId),
}

impl ClientError {
    /// Transport and timeout failures may be retried unchanged. Validation
    /// failures need a different payload.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(e) => e.is_transient(),
            ClientError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// The rejection reason, whether it came from local pre-validation or
    /// from the node.
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            ClientError::Validation(e) => Some(e.reason()),
            ClientError::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

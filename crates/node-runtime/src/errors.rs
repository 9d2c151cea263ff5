//! # Node Errors
//!
//! Submissions that fail signature checks are not errors: they are accepted
//! and recorded as rejected. These are the failures that refuse a request
//! outright or stop the node from starting.

use crate::container::ConfigError;
use lf_02_family_core::{ConfigurationError, StoreError};
use shared_types::EnvelopeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    /// Unknown family or message type, duplicate registration.
    #[error(transparent)]
    Family(#[from] ConfigurationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The envelope cannot be read at all.
    #[error("malformed envelope: {0}")]
    Malformed(String),

    #[error("store fault: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<EnvelopeError> for NodeError {
    fn from(e: EnvelopeError) -> Self {
        NodeError::Malformed(e.to_string())
    }
}

impl NodeError {
    /// Short machine-readable kind for error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            NodeError::Family(ConfigurationError::UnknownMessageType(_))
            | NodeError::Family(ConfigurationError::UnknownTransactionType(_)) => "unknown_family",
            NodeError::Family(_) | NodeError::Config(_) => "configuration",
            NodeError::Malformed(_) => "bad_request",
            NodeError::Store(_) | NodeError::Io(_) => "internal",
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            NodeError::Malformed(_) => 400,
            NodeError::Family(ConfigurationError::UnknownMessageType(_))
            | NodeError::Family(ConfigurationError::UnknownTransactionType(_)) => 400,
            _ => 500,
        }
    }
}

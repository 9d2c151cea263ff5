//! # Family Errors
//!
//! - `ValidationError`: a transaction was rejected; recoverable by the caller.
//! - `ConfigurationError`: a family could not be loaded; fatal at startup.
//! - `StoreError`: the store itself misbehaved.

use thiserror::Error;

/// A `validate` rejection.
///
/// The reason string is the same whether the check ran on the client or on
/// the node.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct ValidationError {
    reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Family registration and dispatch problems.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A handler or store was already registered for this tag.
    #[error("family already registered for {tag}")]
    DuplicateFamily { tag: String },

    /// No handler registered for this message type.
    #[error("no handler registered for message type {0}")]
    UnknownMessageType(String),

    /// No store registered for this transaction type.
    #[error("no store registered for transaction type {0}")]
    UnknownTransactionType(String),

    /// A message handler was registered without a matching store.
    #[error("message type {message_type} has no store for {transaction_type}")]
    MissingStore {
        message_type: String,
        transaction_type: String,
    },

    /// A family name that no loader knows.
    #[error("unknown family {0}")]
    UnknownFamily(String),
}

/// Store failures. These are faults, never rejections.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store lock poisoned")]
    LockPoisoned,

    /// A value could not be encoded for writing.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// A stored value could not be read back.
    #[error("corrupted value at {key}: {reason}")]
    Corrupted { key: String, reason: String },
}

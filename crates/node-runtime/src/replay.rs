//! # Replay Guard
//!
//! Remembers the digest of every envelope the node has accepted for
//! ordering, so a signed envelope can be applied at most once.
//!
//! ## Design
//!
//! - Only envelopes that passed signature verification are recorded.
//!   Intake rejections never claim a digest.
//! - Entries are never expired. Envelopes carry no timestamp, so there is no
//!   window after which a replay could be refused on age instead.
//! - Independent of the status book, whose entries are evicted.

use parking_lot::Mutex;
use shared_types::{Hash, TransactionId};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The envelope was already accepted once.
    #[error("transaction {id} was already accepted")]
    AlreadyAccepted { id: TransactionId },
}

#[derive(Debug, Default)]
pub struct ReplayGuard {
    accepted: Mutex<HashSet<Hash>>,
}

impl ReplayGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_accepted(&self, digest: &Hash) -> bool {
        self.accepted.lock().contains(digest)
    }

    /// Check and record atomically; only the first caller for a digest wins.
    pub fn accept(&self, digest: Hash) -> Result<(), ReplayError> {
        if self.accepted.lock().insert(digest) {
            Ok(())
        } else {
            Err(ReplayError::AlreadyAccepted {
                id: TransactionId::from_hash(&digest),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.accepted.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

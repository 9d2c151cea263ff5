//! # Transaction Message
//!
//! Routing wrapper around one transaction. Dispatch reads the tags and never
//! looks inside the update.

use crate::domain::entities::{FamilyTags, TransactionMeta};
use crate::ports::inbound::{FamilyTransaction, TransactionFamily};
use shared_types::UpdateRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionMessage {
    pub message_type: String,
    pub transaction_type: String,
    pub update: UpdateRecord,
    pub meta: TransactionMeta,
}

impl TransactionMessage {
    pub fn new(
        message_type: impl Into<String>,
        transaction_type: impl Into<String>,
        update: UpdateRecord,
        meta: TransactionMeta,
    ) -> Self {
        Self {
            message_type: message_type.into(),
            transaction_type: transaction_type.into(),
            update,
            meta,
        }
    }

    /// Wrap a decoded transaction for gossip.
    pub fn wrap(tags: FamilyTags, transaction: &dyn FamilyTransaction) -> Self {
        Self::new(
            tags.message_type,
            tags.transaction_type,
            transaction.serialize(),
            transaction.meta().clone(),
        )
    }

    /// Decode with the family the message was routed to.
    pub fn unwrap_with<F: TransactionFamily>(self, family: &F) -> F::Transaction {
        family.decode(&self.update, self.meta)
    }
}

//! # Domain Entities
//!
//! Metadata composed into every family transaction, and the static tags that
//! bind a family into a node.

use shared_types::{address_to_hex, Address, TransactionId};

/// Ledger-supplied metadata shared by all families.
///
/// Drafts built locally for pre-validation may carry an originator but no id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionMeta {
    /// Address recovered from the envelope signature.
    pub originator: Option<Address>,
    /// Hex of the signed digest.
    pub id: Option<TransactionId>,
}

impl TransactionMeta {
    pub fn new(originator: Address, id: TransactionId) -> Self {
        Self {
            originator: Some(originator),
            id: Some(id),
        }
    }

    /// Metadata for a local draft signed by `originator`.
    pub fn draft(originator: Address) -> Self {
        Self {
            originator: Some(originator),
            id: None,
        }
    }

    /// `0x`-prefixed originator, or `unknown`.
    pub fn originator_hex(&self) -> String {
        self.originator
            .as_ref()
            .map(address_to_hex)
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Routing tags and store name of one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FamilyTags {
    /// Short family name used in configuration, e.g. `clinical`.
    pub name: &'static str,
    /// Dispatch tag, e.g. `/Clinical/Transaction`.
    pub message_type: &'static str,
    /// Transaction type tag, e.g. `/ClinicalTransaction`.
    pub transaction_type: &'static str,
    /// Name of the family's store, e.g. `ClinicalTransaction`.
    pub store_name: &'static str,
}

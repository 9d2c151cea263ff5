//! # Inbound Ports
//!
//! What a transaction family implements to plug into the commit pipeline.
//!
//! A family is two things:
//!
//! - a [`TransactionFamily`]: static tags, the action set, the field
//!   superset, decoding and client-side update building;
//! - its transaction type, a [`FamilyTransaction`]: validate, apply,
//!   serialize.

use crate::domain::entities::{FamilyTags, TransactionMeta};
use crate::domain::errors::{StoreError, ValidationError};
use crate::ports::outbound::KeyValueStore;
use shared_types::{FieldValue, UpdateRecord, ACTION_FIELD};
use std::fmt;

/// One decoded, immutable transaction of some family.
///
/// `validate` and `apply` must not touch anything but their arguments.
pub trait FamilyTransaction: Send + Sync + fmt::Debug {
    /// Originator and id.
    fn meta(&self) -> &TransactionMeta;

    /// The `Action` discriminator as received, if any.
    fn action_name(&self) -> Option<&str>;

    /// Pure check against the current store.
    fn validate(&self, store: &dyn KeyValueStore) -> Result<(), ValidationError>;

    /// Deterministic state transition. Only called after `validate` passed
    /// against the same store.
    fn apply(&self, store: &dyn KeyValueStore) -> Result<(), StoreError>;

    /// Non-null fields relevant to the action.
    fn serialize(&self) -> UpdateRecord;

    /// Human-readable summary for logs. Never used for equality.
    fn identity(&self) -> String;
}

/// A pluggable transaction family.
pub trait TransactionFamily: Send + Sync + 'static {
    type Transaction: FamilyTransaction + 'static;

    fn tags(&self) -> FamilyTags;

    /// Recognised `Action` values.
    fn actions(&self) -> &'static [&'static str];

    /// Every field an update of this family may carry, `Action` included.
    fn fields(&self) -> &'static [&'static str];

    /// Decode an update record. Never fails; absent fields become null.
    fn decode(&self, update: &UpdateRecord, meta: TransactionMeta) -> Self::Transaction;

    /// Build the wire record for `action` from the caller's fields.
    ///
    /// The default injects `Action` when absent and declares every family
    /// field, nulling the ones the caller left out.
    fn prepare_update(&self, action: &str, provided: UpdateRecord) -> UpdateRecord {
        pad_update(self.fields(), action, provided)
    }
}

/// Inject `Action` if absent and null-pad every field in `fields`.
///
/// An empty `action` is injected as `null`.
pub fn pad_update(fields: &[&str], action: &str, mut update: UpdateRecord) -> UpdateRecord {
    if !update.contains(ACTION_FIELD) {
        let value = if action.is_empty() {
            FieldValue::Null
        } else {
            FieldValue::String(action.to_string())
        };
        update.insert(ACTION_FIELD, value);
    }
    for field in fields {
        update.declare_null(field);
    }
    update
}

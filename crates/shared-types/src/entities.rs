//! # Core Domain Entities
//!
//! Defines the entities every transaction family and the commit pipeline
//! agree on.
//!
//! ## Clusters
//!
//! - **Identity**: `Hash`, `Address`, `TransactionId`
//! - **Update Record**: `UpdateRecord`, `FieldValue`
//! - **Commit Status**: `SubmissionStatus`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte hash (Keccak-256 of the signed payload).
pub type Hash = [u8; 32];

/// A 20-byte address derived from a signing public key.
pub type Address = [u8; 20];

/// Render an address as `0x`-prefixed lowercase hex.
pub fn address_to_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Parse a `0x`-prefixed (or bare) hex address.
pub fn address_from_hex(value: &str) -> Option<Address> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(stripped).ok()?;
    bytes.try_into().ok()
}

/// Content-derived identifier of a transaction.
///
/// The hex encoding of the digest the originator signed. Two submissions of
/// the same update with different envelope nonces get different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Build the identifier from a signed digest.
    pub fn from_hash(hash: &Hash) -> Self {
        Self(hex::encode(hash))
    }

    /// Wrap an identifier received over the wire.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for log lines.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier returned by a node when it accepts a submission.
///
/// The reference node uses the transaction id itself.
pub type SubmissionId = TransactionId;

// =============================================================================
// CLUSTER B: UPDATE RECORD
// =============================================================================

/// Name of the discriminator field every update record carries.
pub const ACTION_FIELD: &str = "Action";

/// Value of a single update-record field.
///
/// Families carry structured details (study details, player lists) as JSON.
pub type FieldValue = serde_json::Value;

/// The flat wire shape of an update: field name to value.
///
/// Keys are kept in a `BTreeMap` so the JSON encoding is canonical, which is
/// what makes the signed digest reproducible on the receiving node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateRecord(BTreeMap<String, FieldValue>);

impl UpdateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a record with the `Action` discriminator set.
    pub fn with_action(action: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.insert(ACTION_FIELD, FieldValue::String(action.into()));
        record
    }

    /// Builder-style insert.
    #[must_use]
    pub fn field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn insert(&mut self, name: &str, value: FieldValue) -> Option<FieldValue> {
        self.0.insert(name.to_string(), value)
    }

    /// Insert `null` for `name` unless the field is already declared.
    pub fn declare_null(&mut self, name: &str) {
        self.0
            .entry(name.to_string())
            .or_insert(FieldValue::Null);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Whether the field is declared at all (a `null` counts as declared).
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Field value as a string.
    ///
    /// Strings are returned as-is; `null` and absent fields are `None`;
    /// numbers and booleans are rendered; structured values are returned as
    /// compact JSON.
    pub fn get_str(&self, name: &str) -> Option<String> {
        match self.0.get(name)? {
            FieldValue::Null => None,
            FieldValue::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Field value with `null` mapped to absent.
    pub fn get_value(&self, name: &str) -> Option<FieldValue> {
        match self.0.get(name)? {
            FieldValue::Null => None,
            other => Some(other.clone()),
        }
    }

    /// The `Action` discriminator, if set to a string.
    pub fn action(&self) -> Option<&str> {
        self.0.get(ACTION_FIELD).and_then(FieldValue::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, FieldValue> {
        self.0
    }
}

impl From<BTreeMap<String, FieldValue>> for UpdateRecord {
    fn from(fields: BTreeMap<String, FieldValue>) -> Self {
        Self(fields)
    }
}

impl FromIterator<(String, FieldValue)> for UpdateRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// CLUSTER C: COMMIT STATUS
// =============================================================================

/// Commit status of a submission as reported by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Accepted by the node, not yet ordered.
    Pending,
    /// Ordered, validated and applied in the given block.
    Committed { block: u64 },
    /// Validation failed when the transaction was ordered (or at intake).
    Rejected { reason: String },
}

impl SubmissionStatus {
    /// Returns true once the status can no longer change.
    #[must_use]
    pub fn is_final(&self) -> bool {
        !matches!(self, SubmissionStatus::Pending)
    }

    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, SubmissionStatus::Committed { .. })
    }
}

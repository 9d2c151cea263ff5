//! # Outbound Ports
//!
//! The store a family reads and mutates. Provided by the host ledger.

use crate::domain::errors::StoreError;
use std::collections::BTreeMap;

/// String-keyed state shared by `validate` and `apply`.
///
/// Writes happen only inside `apply`, after `validate` succeeded, in the
/// order the ledger assigned. The ledger never applies two transactions
/// against the same store concurrently.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// All entries, sorted by key.
    fn entries(&self) -> Result<BTreeMap<String, String>, StoreError>;

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

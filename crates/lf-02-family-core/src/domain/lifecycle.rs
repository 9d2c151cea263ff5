//! # Transaction Lifecycle
//!
//! Type-state wrapper that makes "apply without validate" unrepresentable.
//!
//! ```text
//! [Built] ──validate ok──→ [Validated] ──apply──→ [Applied]
//!    │
//!    └──── validate err ──→ [Discarded]
//! ```
//!
//! Each transition consumes `self`. `Applied` and `Discarded` have no
//! transitions.

use super::entities::TransactionMeta;
use super::errors::{StoreError, ValidationError};
use crate::ports::inbound::FamilyTransaction;
use crate::ports::outbound::KeyValueStore;
use std::marker::PhantomData;
use tracing::debug;

// =============================================================================
// STATE MARKERS (Zero-Sized Types)
// =============================================================================

/// Marker: decoded, not yet checked.
#[derive(Debug, Clone, Copy)]
pub struct Built;

/// Marker: passed `validate` against the current store.
#[derive(Debug, Clone, Copy)]
pub struct Validated;

/// Marker: applied to the store. Terminal.
#[derive(Debug, Clone, Copy)]
pub struct Applied;

/// Marker: rejected by `validate`. Terminal.
#[derive(Debug, Clone, Copy)]
pub struct Discarded;

// =============================================================================
// LIFECYCLE
// =============================================================================

/// A transaction in lifecycle state `S`.
#[derive(Debug)]
pub struct Lifecycle<S> {
    transaction: Box<dyn FamilyTransaction>,
    rejection: Option<ValidationError>,
    _state: PhantomData<S>,
}

impl<S> Lifecycle<S> {
    fn transition<T>(self) -> Lifecycle<T> {
        Lifecycle {
            transaction: self.transaction,
            rejection: self.rejection,
            _state: PhantomData,
        }
    }

    pub fn transaction(&self) -> &dyn FamilyTransaction {
        self.transaction.as_ref()
    }

    pub fn meta(&self) -> &TransactionMeta {
        self.transaction.meta()
    }

    pub fn identity(&self) -> String {
        self.transaction.identity()
    }
}

impl Lifecycle<Built> {
    pub fn new(transaction: Box<dyn FamilyTransaction>) -> Self {
        Self {
            transaction,
            rejection: None,
            _state: PhantomData,
        }
    }

    /// Run the family's `validate`. Consumes the built transaction.
    pub fn validate(
        self,
        store: &dyn KeyValueStore,
    ) -> Result<Lifecycle<Validated>, Lifecycle<Discarded>> {
        match self.transaction.validate(store) {
            Ok(()) => Ok(self.transition()),
            Err(rejection) => {
                debug!(identity = %self.identity(), reason = %rejection, "Transaction discarded");
                let mut discarded: Lifecycle<Discarded> = self.transition();
                discarded.rejection = Some(rejection);
                Err(discarded)
            }
        }
    }
}

impl Lifecycle<Validated> {
    /// Run the family's `apply` against the store it was validated on.
    #[must_use = "the applied transaction must be recorded"]
    pub fn apply(self, store: &dyn KeyValueStore) -> Result<Lifecycle<Applied>, StoreError> {
        self.transaction.apply(store)?;
        Ok(self.transition())
    }
}

impl Lifecycle<Discarded> {
    pub fn rejection(&self) -> ValidationError {
        self.rejection
            .clone()
            .unwrap_or_else(|| ValidationError::new("rejected"))
    }
}

//! # Family Core (LF-02)
//!
//! The contract every transaction family implements, and the glue a node
//! uses to load families and route transactions to them.
//!
//! ## Architecture
//!
//! - **Domain** (`domain/`): metadata, errors, lifecycle type-state
//! - **Ports** (`ports/`): `FamilyTransaction`, `TransactionFamily`,
//!   `KeyValueStore`
//! - **Adapters** (`adapters/`): `InMemoryStore`
//! - **Glue**: `TransactionMessage`, `FamilyRegistry`
//!
//! ## Invariants
//!
//! - The store is mutated only by `apply`, and `apply` only runs on a
//!   `Lifecycle<Validated>`.
//! - `validate` is deterministic in (transaction, store) and has no side
//!   effects, so it can run speculatively on a client.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod message;
pub mod ports;
pub mod registry;

pub use adapters::memory_store::InMemoryStore;
pub use domain::entities::{FamilyTags, TransactionMeta};
pub use domain::errors::{ConfigurationError, StoreError, ValidationError};
pub use domain::lifecycle::{Applied, Built, Discarded, Lifecycle, Validated};
pub use message::TransactionMessage;
pub use ports::inbound::{pad_update, FamilyTransaction, TransactionFamily};
pub use ports::outbound::KeyValueStore;
pub use registry::{in_memory_store_factory, FamilyRegistry, MessageHandler, StoreFactory};

//! # Shared Types Crate
//!
//! This crate contains the vocabulary shared by every transaction family,
//! the client and the node runtime.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the flat update record, the signed envelope
//!   and the HTTP payloads are defined here and nowhere else.
//! - **Full-Superset Wire Shape**: every update for a family carries the
//!   complete set of that family's fields; irrelevant ones are `null`.
//! - **Envelope Authority**: the originator of a transaction is the address
//!   recovered from the envelope signature, never a field of the update.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod ipc;

pub use entities::*;
pub use envelope::SignedEnvelope;
pub use errors::*;
pub use ipc::*;

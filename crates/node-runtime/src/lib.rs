//! # Node Runtime Library
//!
//! Reference single-node ledger for the transaction families. The binary in
//! `main.rs` wires it to an HTTP listener; tests embed it directly.
//!
//! ## Modules
//!
//! - `container/` - configuration and family loading
//! - `node` - intake, ordering, apply, status
//! - `replay` - at-most-once acceptance of signed envelopes
//! - `handlers/` - the ordering loop
//! - `adapters/` - HTTP API, in-process transport

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod container;
pub mod errors;
pub mod handlers;
pub mod node;
pub mod replay;
pub mod status;

pub use adapters::{build_router, serve, LocalTransport};
pub use container::{load_families, NodeConfig};
pub use errors::NodeError;
pub use handlers::spawn_ordering_loop;
pub use node::{BlockSummary, LedgerNode};

//! # Family Client (LF-05)
//!
//! Turns a caller's intent into a signed, submitted transaction and
//! optionally waits for it to commit.
//!
//! ## Commit Protocol
//!
//! ```text
//! build_update ──→ pre_validate ──→ sign ──→ submit ──→ wait_for_commit
//!                  (optional)                            (optional)
//! ```
//!
//! ## Architecture
//!
//! - **Ports** (`ports/`): `Transport`, the node boundary
//! - **Adapters** (`adapters/`): `HttpTransport` over reqwest
//! - **Service** (`service.rs`): `FamilyClient`
//! - **Helpers** (`clinical.rs`, `arcade.rs`): typed calls per family
//!
//! Abandoning a wait never rolls a submission back. The transaction may
//! still commit after the caller stops waiting.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod arcade;
pub mod clinical;
pub mod config;
pub mod errors;
pub mod ports;
pub mod service;

pub use adapters::http::HttpTransport;
pub use arcade::ArcadeClient;
pub use clinical::ClinicalClient;
pub use config::ClientConfig;
pub use errors::{ClientError, TransportError};
pub use ports::transport::Transport;
pub use service::{FamilyClient, Receipt, WaitPolicy};

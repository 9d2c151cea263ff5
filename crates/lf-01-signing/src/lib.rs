//! # Signing (LF-01)
//!
//! Signing keys with a stable address, envelope signatures, and signer
//! recovery for submitted transactions.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): ECDSA over secp256k1, key files
//! - **Ports Layer** (`ports/`): `EnvelopeSignatureApi`
//! - **Service Layer** (`service.rs`): envelope digest, sign, verify
//!
//! ## Security Notes
//!
//! - The originator of a transaction is the address recovered from its
//!   signature. The `signer` field of an envelope is only a claim.
//! - High-S signatures are rejected.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::ecdsa::{address_from_pubkey, keccak256};
pub use domain::entities::{EcdsaSignature, VerifiedEnvelope};
pub use domain::errors::SigningError;
pub use domain::keys::KeyPair;
pub use ports::inbound::EnvelopeSignatureApi;
pub use service::{envelope_digest, sign_update_with_nonce, EnvelopeSigningService, SignedTransaction};

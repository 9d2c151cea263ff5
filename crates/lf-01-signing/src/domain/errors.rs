//! # Signing Errors
//!
//! Error types for key handling, signing and signer recovery.

use shared_types::EnvelopeError;
use thiserror::Error;

/// Errors that can occur while loading keys, signing, or recovering signers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// The key file could not be read or written.
    #[error("key file {path} unreadable: {reason}")]
    KeyUnreadable { path: String, reason: String },

    /// The key material is not a valid secp256k1 secret.
    #[error("malformed signing key: {0}")]
    MalformedKey(String),

    /// The signer refused to produce a signature.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// The signature is not 65 bytes of hex, or r/s are out of range.
    #[error("invalid signature format")]
    InvalidSignatureFormat,

    /// Signature has a high S value.
    #[error("malleable signature (high S value)")]
    MalleableSignature,

    /// Recovery ID must be 0, 1, 27 or 28.
    #[error("invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// No public key could be recovered from the signature.
    #[error("failed to recover public key")]
    RecoveryFailed,

    /// The recovered address differs from the claimed signer.
    #[error("signature does not match signer")]
    SignerMismatch { claimed: String, recovered: String },

    /// The envelope itself is malformed.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

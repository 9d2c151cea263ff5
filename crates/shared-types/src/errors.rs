//! # Error Types
//!
//! Defines error types shared across crates.

use thiserror::Error;

/// Errors raised while encoding or checking a `SignedEnvelope`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Envelope version not supported.
    #[error("Unsupported version: received {received}, supported {supported}")]
    UnsupportedVersion { received: u16, supported: u16 },

    /// The signing payload could not be encoded.
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// The signature field is not valid hex of the expected length.
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    /// The signer field is not a valid address.
    #[error("Malformed signer address: {0}")]
    MalformedSigner(String),
}

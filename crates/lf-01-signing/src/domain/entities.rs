//! # Domain Entities
//!
//! Signature and verification result types.

use super::errors::SigningError;
use shared_types::{Address, TransactionId};

/// Recoverable ECDSA signature on secp256k1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcdsaSignature {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes), always in the lower half of the curve order
    pub s: [u8; 32],
    /// Recovery ID (27 or 28 when produced here; 0 and 1 are accepted)
    pub v: u8,
}

impl EcdsaSignature {
    /// Wire length: `r || s || v`.
    pub const LEN: usize = 65;

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SigningError> {
        if bytes.len() != Self::LEN {
            return Err(SigningError::InvalidSignatureFormat);
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(value: &str) -> Result<Self, SigningError> {
        let bytes = hex::decode(value).map_err(|_| SigningError::InvalidSignatureFormat)?;
        Self::from_bytes(&bytes)
    }
}

/// An envelope whose signature checked out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedEnvelope {
    /// Address recovered from the signature.
    pub originator: Address,
    /// Content-derived identifier (hex of the signed digest).
    pub id: TransactionId,
}

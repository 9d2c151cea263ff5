//! # Inbound Ports
//!
//! The signing API used by clients (sign) and nodes (verify).

use crate::domain::entities::VerifiedEnvelope;
use crate::domain::errors::SigningError;
use crate::domain::keys::KeyPair;
use crate::service::SignedTransaction;
use shared_types::{SignedEnvelope, UpdateRecord};

/// Envelope signing and verification.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait EnvelopeSignatureApi: Send + Sync {
    /// Wrap an update in a signed envelope with a fresh nonce.
    ///
    /// Returns the envelope together with its content-derived id.
    fn sign_update(
        &self,
        keypair: &KeyPair,
        transaction_type: &str,
        message_type: &str,
        update: UpdateRecord,
    ) -> Result<SignedTransaction, SigningError>;

    /// Check the version, recover the signer and compare it to the claim.
    fn verify_envelope(&self, envelope: &SignedEnvelope) -> Result<VerifiedEnvelope, SigningError>;
}

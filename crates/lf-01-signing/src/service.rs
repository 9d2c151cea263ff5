//! # Envelope Signing Service
//!
//! Implements `EnvelopeSignatureApi` on top of the ECDSA domain functions.

use crate::domain::ecdsa::{keccak256, recover_address};
use crate::domain::entities::{EcdsaSignature, VerifiedEnvelope};
use crate::domain::errors::SigningError;
use crate::domain::keys::KeyPair;
use crate::ports::inbound::EnvelopeSignatureApi;
use shared_types::envelope::signing_bytes;
use shared_types::{
    address_from_hex, address_to_hex, EnvelopeError, Hash, SignedEnvelope, TransactionId,
    UpdateRecord,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// A signed envelope and the id the node will assign to it.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    pub envelope: SignedEnvelope,
    pub id: TransactionId,
}

/// Keccak-256 over the canonical signing payload.
pub fn envelope_digest(
    transaction_type: &str,
    update: &UpdateRecord,
    nonce: &Uuid,
) -> Result<Hash, SigningError> {
    Ok(keccak256(&signing_bytes(transaction_type, update, nonce)?))
}

/// Sign with an explicit nonce.
///
/// Same key, update and nonce always give the same envelope and id.
pub fn sign_update_with_nonce(
    keypair: &KeyPair,
    transaction_type: &str,
    message_type: &str,
    update: UpdateRecord,
    nonce: Uuid,
) -> Result<SignedTransaction, SigningError> {
    let digest = envelope_digest(transaction_type, &update, &nonce)?;
    let signature = keypair.sign_digest(&digest)?;
    let id = TransactionId::from_hash(&digest);

    debug!(txn_id = %id.short(), signer = %keypair.address_hex(), transaction_type, "Signed update");

    Ok(SignedTransaction {
        envelope: SignedEnvelope {
            version: SignedEnvelope::CURRENT_VERSION,
            transaction_type: transaction_type.to_string(),
            message_type: message_type.to_string(),
            update,
            nonce,
            signer: keypair.address_hex(),
            signature: signature.to_hex(),
        },
        id,
    })
}

/// The default signing service.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeSigningService;

impl EnvelopeSigningService {
    pub fn new() -> Self {
        Self
    }
}

impl EnvelopeSignatureApi for EnvelopeSigningService {
    fn sign_update(
        &self,
        keypair: &KeyPair,
        transaction_type: &str,
        message_type: &str,
        update: UpdateRecord,
    ) -> Result<SignedTransaction, SigningError> {
        sign_update_with_nonce(
            keypair,
            transaction_type,
            message_type,
            update,
            Uuid::new_v4(),
        )
    }

    fn verify_envelope(&self, envelope: &SignedEnvelope) -> Result<VerifiedEnvelope, SigningError> {
        envelope.check_version()?;

        let claimed = address_from_hex(&envelope.signer)
            .ok_or_else(|| EnvelopeError::MalformedSigner(envelope.signer.clone()))?;
        let signature = EcdsaSignature::from_hex(&envelope.signature)?;
        let digest = envelope_digest(&envelope.transaction_type, &envelope.update, &envelope.nonce)?;

        let recovered = recover_address(&digest, &signature)?;
        if recovered != claimed {
            warn!(
                claimed = %envelope.signer,
                recovered = %address_to_hex(&recovered),
                "Envelope signer mismatch"
            );
            return Err(SigningError::SignerMismatch {
                claimed: envelope.signer.clone(),
                recovered: address_to_hex(&recovered),
            });
        }

        Ok(VerifiedEnvelope {
            originator: recovered,
            id: TransactionId::from_hash(&digest),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update() -> UpdateRecord {
        UpdateRecord::with_action("CREATE_STUDY")
            .field("StudyNumber", "S100")
            .field("StudyDetails", "details")
    }

    fn sign(keypair: &KeyPair) -> SignedTransaction {
        EnvelopeSigningService::new()
            .sign_update(keypair, "/ClinicalTransaction", "/Clinical/Transaction", update())
            .unwrap()
    }

    #[test]
    fn test_sign_then_verify() {
        let keypair = KeyPair::generate();
        let signed = sign(&keypair);

        let verified = EnvelopeSigningService::new()
            .verify_envelope(&signed.envelope)
            .unwrap();

        assert_eq!(verified.originator, keypair.address());
        assert_eq!(verified.id, signed.id);
        assert_eq!(signed.envelope.signer, keypair.address_hex());
    }

    #[test]
    fn test_fresh_nonce_gives_distinct_ids() {
        let keypair = KeyPair::generate();
        assert_ne!(sign(&keypair).id, sign(&keypair).id);
    }

    #[test]
    fn test_explicit_nonce_is_deterministic() {
        let keypair = KeyPair::generate();
        let nonce = Uuid::nil();
        let a = sign_update_with_nonce(&keypair, "/RPSTransaction", "/RPS/Transaction", update(), nonce)
            .unwrap();
        let b = sign_update_with_nonce(&keypair, "/RPSTransaction", "/RPS/Transaction", update(), nonce)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tampered_update_is_rejected() {
        let keypair = KeyPair::generate();
        let mut signed = sign(&keypair);
        signed
            .envelope
            .update
            .insert("StudyNumber", "S999".into());

        let err = EnvelopeSigningService::new()
            .verify_envelope(&signed.envelope)
            .unwrap_err();
        assert!(matches!(
            err,
            SigningError::SignerMismatch { .. } | SigningError::RecoveryFailed
        ));
    }

    #[test]
    fn test_claimed_signer_must_match() {
        let keypair = KeyPair::generate();
        let other = KeyPair::generate();
        let mut signed = sign(&keypair);
        signed.envelope.signer = other.address_hex();

        let err = EnvelopeSigningService::new()
            .verify_envelope(&signed.envelope)
            .unwrap_err();
        assert_eq!(err.to_string(), "signature does not match signer");
    }

    #[test]
    fn test_malformed_signer_and_signature() {
        let keypair = KeyPair::generate();
        let service = EnvelopeSigningService::new();

        let mut signed = sign(&keypair);
        signed.envelope.signer = "nobody".into();
        assert!(matches!(
            service.verify_envelope(&signed.envelope),
            Err(SigningError::Envelope(EnvelopeError::MalformedSigner(_)))
        ));

        let mut signed = sign(&keypair);
        signed.envelope.signature = "00".into();
        assert_eq!(
            service.verify_envelope(&signed.envelope),
            Err(SigningError::InvalidSignatureFormat)
        );
    }
}

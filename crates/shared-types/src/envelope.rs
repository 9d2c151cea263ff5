//! # `SignedEnvelope`
//!
//! The wrapper a client submits to a node: one update record, the family
//! type tags needed to route it, and the originator's signature.
//!
//! ## Security Properties
//!
//! - **Versioning**: every envelope carries a `version` checked on intake.
//! - **Canonical Payload**: the signed bytes are the JSON encoding of
//!   `{TransactionType, Update, Nonce}` with sorted keys.
//! - **Envelope Authority**: `signer` is only a claim; the node recovers the
//!   address from `signature` and rejects a mismatch.

use crate::entities::UpdateRecord;
use crate::errors::EnvelopeError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A signed submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    /// Envelope format version.
    pub version: u16,

    /// Transaction type tag, e.g. `/ClinicalTransaction`.
    pub transaction_type: String,

    /// Message type tag used for dispatch, e.g. `/Clinical/Transaction`.
    pub message_type: String,

    /// The full-superset update record.
    pub update: UpdateRecord,

    /// Per-submission nonce so identical updates get distinct ids.
    pub nonce: Uuid,

    /// Claimed originator address (`0x`-prefixed hex).
    pub signer: String,

    /// Recoverable ECDSA signature, hex of `r || s || v` (65 bytes).
    pub signature: String,
}

/// The exact structure that gets signed.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SigningPayload<'a> {
    transaction_type: &'a str,
    update: &'a UpdateRecord,
    nonce: &'a Uuid,
}

impl SignedEnvelope {
    /// Current envelope version.
    pub const CURRENT_VERSION: u16 = 1;

    /// Canonical bytes covered by the signature.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        signing_bytes(&self.transaction_type, &self.update, &self.nonce)
    }

    /// Check the version field before anything else is interpreted.
    pub fn check_version(&self) -> Result<(), EnvelopeError> {
        if self.version != Self::CURRENT_VERSION {
            return Err(EnvelopeError::UnsupportedVersion {
                received: self.version,
                supported: Self::CURRENT_VERSION,
            });
        }
        Ok(())
    }
}

/// Canonical signing bytes for an update that has not been wrapped yet.
pub fn signing_bytes(
    transaction_type: &str,
    update: &UpdateRecord,
    nonce: &Uuid,
) -> Result<Vec<u8>, EnvelopeError> {
    let payload = SigningPayload {
        transaction_type,
        update,
        nonce,
    };
    serde_json::to_vec(&payload).map_err(|e| EnvelopeError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(update: UpdateRecord) -> SignedEnvelope {
        SignedEnvelope {
            version: SignedEnvelope::CURRENT_VERSION,
            transaction_type: "/ClinicalTransaction".into(),
            message_type: "/Clinical/Transaction".into(),
            update,
            nonce: Uuid::nil(),
            signer: String::new(),
            signature: String::new(),
        }
    }

    #[test]
    fn test_signing_bytes_ignore_signature_fields() {
        let update = UpdateRecord::with_action("CREATE_STUDY").field("StudyNumber", "S1");
        let mut a = envelope(update.clone());
        let b = envelope(update);
        a.signer = "0xabc".into();
        a.signature = "deadbeef".into();

        assert_eq!(a.signing_bytes().unwrap(), b.signing_bytes().unwrap());
    }

    #[test]
    fn test_signing_bytes_layout() {
        let e = envelope(UpdateRecord::with_action("ADD"));
        let bytes = e.signing_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            r#"{"TransactionType":"/ClinicalTransaction","Update":{"Action":"ADD"},"Nonce":"00000000-0000-0000-0000-000000000000"}"#
        );
    }

    #[test]
    fn test_version_check() {
        let mut e = envelope(UpdateRecord::new());
        assert!(e.check_version().is_ok());
        e.version = 9;
        assert!(matches!(
            e.check_version(),
            Err(EnvelopeError::UnsupportedVersion { received: 9, .. })
        ));
    }
}

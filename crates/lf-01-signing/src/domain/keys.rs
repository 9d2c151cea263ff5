//! # Signing Keys
//!
//! A secp256k1 keypair with a stable 20-byte address.
//!
//! Key files hold the secret scalar as one line of hex. Saving a key also
//! writes the address, `0x`-prefixed, to a sibling `.addr` file.

use super::ecdsa::{address_from_pubkey, sign_digest};
use super::entities::EcdsaSignature;
use super::errors::SigningError;
use k256::ecdsa::SigningKey;
use shared_types::{address_to_hex, Address, Hash};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zeroize::Zeroizing;

/// A signing keypair.
///
/// The secret is zeroized on drop by `k256`.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    address: Address,
}

impl KeyPair {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Parse a hex-encoded 32-byte secret.
    pub fn from_secret_hex(secret: &str) -> Result<Self, SigningError> {
        let bytes = Zeroizing::new(
            hex::decode(secret.trim())
                .map_err(|e| SigningError::MalformedKey(format!("not hex: {e}")))?,
        );
        Self::from_secret_bytes(&bytes)
    }

    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self, SigningError> {
        if secret.len() != 32 {
            return Err(SigningError::MalformedKey(format!(
                "expected 32 bytes, got {}",
                secret.len()
            )));
        }
        let signing_key =
            SigningKey::from_slice(secret).map_err(|e| SigningError::MalformedKey(e.to_string()))?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = address_from_pubkey(signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    /// Load a key file written by [`KeyPair::save`].
    pub fn load(path: &Path) -> Result<Self, SigningError> {
        let contents = Zeroizing::new(fs::read_to_string(path).map_err(|e| {
            SigningError::KeyUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?);
        let keypair = Self::from_secret_hex(&contents)?;
        debug!(path = %path.display(), address = %keypair.address_hex(), "Loaded signing key");
        Ok(keypair)
    }

    /// Write the secret to `path` and the address to `path` with an `.addr`
    /// extension. Returns the address file path.
    pub fn save(&self, path: &Path) -> Result<PathBuf, SigningError> {
        let unreadable = |p: &Path, e: std::io::Error| SigningError::KeyUnreadable {
            path: p.display().to_string(),
            reason: e.to_string(),
        };

        let secret = Zeroizing::new(format!("{}\n", self.secret_hex().as_str()));
        fs::write(path, secret.as_bytes()).map_err(|e| unreadable(path, e))?;

        let addr_path = path.with_extension("addr");
        fs::write(&addr_path, format!("{}\n", self.address_hex()))
            .map_err(|e| unreadable(&addr_path, e))?;

        info!(path = %path.display(), address = %self.address_hex(), "Wrote signing key");
        Ok(addr_path)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `0x`-prefixed lowercase hex address.
    pub fn address_hex(&self) -> String {
        address_to_hex(&self.address)
    }

    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.signing_key.to_bytes()))
    }

    /// Sign a prehashed digest.
    pub fn sign_digest(&self, digest: &Hash) -> Result<EcdsaSignature, SigningError> {
        sign_digest(digest, &self.signing_key)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address_hex())
            .finish_non_exhaustive()
    }
}

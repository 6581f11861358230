//! Ed25519 principals.
//!
//! Compact keys and deterministic signatures; the default algorithm for
//! software-held principals. Certified keys must be canonical points outside
//! the small-order subgroup, and caller signatures are checked with the
//! strict verification equation.

use ed25519_dalek::{
    Signature, Signer, SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH,
};
use rand_core::OsRng;

use crate::error::CryptoError;
use crate::signer::ClassicalSigner;
use crate::types::ClassicalAlgorithm;

/// Ed25519 principal key.
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Generate a fresh principal key.
    #[must_use]
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Derive a principal key from a 32-byte seed.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidPrivateKey`] unless the seed is exactly
    /// 32 bytes.
    pub fn from_seed(seed: &[u8]) -> Result<Self, CryptoError> {
        let seed: [u8; 32] = seed.try_into().map_err(|_| {
            CryptoError::invalid_private_key(format!(
                "Ed25519 seed must be 32 bytes, got {}",
                seed.len()
            ))
        })?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }
}

impl ClassicalSigner for Ed25519Signer {
    fn algorithm(&self) -> ClassicalAlgorithm {
        ClassicalAlgorithm::Ed25519
    }

    fn public_key(&self) -> Result<Vec<u8>, CryptoError> {
        Ok(self.signing_key.verifying_key().to_bytes().to_vec())
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(self.signing_key.sign(data).to_bytes().to_vec())
    }
}

/// Parse the key carried by an Ed25519 certificate.
pub(crate) fn parse_public_key(public_key: &[u8]) -> Result<VerifyingKey, CryptoError> {
    let bytes: [u8; PUBLIC_KEY_LENGTH] = public_key.try_into().map_err(|_| {
        CryptoError::invalid_public_key(format!(
            "Ed25519 public key must be {PUBLIC_KEY_LENGTH} bytes, got {}",
            public_key.len()
        ))
    })?;
    let key = VerifyingKey::from_bytes(&bytes)
        .map_err(|e| CryptoError::invalid_public_key(e.to_string()))?;
    // A small-order key accepts signatures no private key holder produced.
    if key.is_weak() {
        return Err(CryptoError::invalid_public_key(
            "Ed25519 public key has small order",
        ));
    }
    Ok(key)
}

/// Check a caller signature over `message`.
pub(crate) fn verify(
    key: &VerifyingKey,
    message: &[u8],
    signature: &[u8],
) -> Result<bool, CryptoError> {
    let bytes: [u8; SIGNATURE_LENGTH] = signature.try_into().map_err(|_| {
        CryptoError::invalid_signature(format!(
            "Ed25519 signature must be {SIGNATURE_LENGTH} bytes, got {}",
            signature.len()
        ))
    })?;
    Ok(key
        .verify_strict(message, &Signature::from_bytes(&bytes))
        .is_ok())
}

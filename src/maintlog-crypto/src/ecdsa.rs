//! ECDSA P-256 principals.
//!
//! For principals whose keys live in hardware that only speaks NIST curves.
//! Certificates carry the uncompressed SEC1 point, so the same key always
//! has the same certificate bytes; signatures are fixed-width `r || s`.

use p256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use rand_core::OsRng;

use crate::error::CryptoError;
use crate::signer::ClassicalSigner;
use crate::types::ClassicalAlgorithm;

/// Uncompressed SEC1 point: tag byte plus two 32-byte coordinates.
const UNCOMPRESSED_POINT_LEN: usize = 65;

/// ECDSA P-256 principal key.
pub struct P256Signer {
    signing_key: SigningKey,
}

impl P256Signer {
    /// Generate a fresh principal key.
    #[must_use]
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }
}

impl ClassicalSigner for P256Signer {
    fn algorithm(&self) -> ClassicalAlgorithm {
        ClassicalAlgorithm::EcdsaP256
    }

    fn public_key(&self) -> Result<Vec<u8>, CryptoError> {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        Ok(point.as_bytes().to_vec())
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let signature: Signature = self.signing_key.sign(data);
        Ok(signature.to_bytes().to_vec())
    }
}

/// Parse the key carried by a P-256 certificate.
pub(crate) fn parse_public_key(public_key: &[u8]) -> Result<VerifyingKey, CryptoError> {
    if public_key.len() != UNCOMPRESSED_POINT_LEN || public_key[0] != 0x04 {
        return Err(CryptoError::invalid_public_key(format!(
            "P-256 public key must be a {UNCOMPRESSED_POINT_LEN}-byte uncompressed point, \
             got {} bytes",
            public_key.len()
        )));
    }
    VerifyingKey::from_sec1_bytes(public_key)
        .map_err(|e| CryptoError::invalid_public_key(e.to_string()))
}

/// Check a caller signature over `message`.
pub(crate) fn verify(
    key: &VerifyingKey,
    message: &[u8],
    signature: &[u8],
) -> Result<bool, CryptoError> {
    let signature = Signature::from_slice(signature)
        .map_err(|e| CryptoError::invalid_signature(e.to_string()))?;
    Ok(key.verify(message, &signature).is_ok())
}

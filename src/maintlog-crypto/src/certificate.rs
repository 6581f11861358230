//! Principal certificates.
//!
//! A certificate binds an algorithm to a public key. The ledger stores
//! certificates as opaque bytes; decoding one always parses its key, so a
//! certificate that decodes is one a signature can be checked against.

use crate::error::CryptoError;
use crate::types::{ClassicalAlgorithm, CryptoKind, CRYPTO_KIND_MAINTLOG_V1};

/// Length of the fixed header: kind tag plus algorithm id.
const HEADER_LEN: usize = 5;

/// Decoded principal certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    algorithm: ClassicalAlgorithm,
    public_key: Vec<u8>,
}

impl Certificate {
    /// Build a certificate from an algorithm and its public key.
    ///
    /// The key is not checked; signers use this for their own keys.
    #[must_use]
    pub fn new(algorithm: ClassicalAlgorithm, public_key: Vec<u8>) -> Self {
        Self {
            algorithm,
            public_key,
        }
    }

    /// Decode a certificate from its wire form and validate its key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::CryptoKindMismatch`] for a foreign tag,
    /// [`CryptoError::InvalidCertificate`] for truncated input or an unknown
    /// algorithm id, and [`CryptoError::InvalidPublicKey`] when the key does
    /// not parse for its algorithm.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() <= HEADER_LEN {
            return Err(CryptoError::invalid_certificate(format!(
                "certificate must be longer than {} bytes, got {}",
                HEADER_LEN,
                bytes.len()
            )));
        }

        let mut kind: CryptoKind = [0u8; 4];
        kind.copy_from_slice(&bytes[..4]);
        if kind != CRYPTO_KIND_MAINTLOG_V1 {
            return Err(CryptoError::CryptoKindMismatch {
                expected: CRYPTO_KIND_MAINTLOG_V1,
                actual: kind,
            });
        }

        let algorithm = ClassicalAlgorithm::from_id(bytes[4]).ok_or_else(|| {
            CryptoError::invalid_certificate(format!("unknown algorithm id {}", bytes[4]))
        })?;

        let certificate = Self {
            algorithm,
            public_key: bytes[HEADER_LEN..].to_vec(),
        };
        certificate.validate()?;
        Ok(certificate)
    }

    /// Encode to wire form.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.public_key.len());
        bytes.extend_from_slice(&CRYPTO_KIND_MAINTLOG_V1);
        bytes.push(self.algorithm.id());
        bytes.extend_from_slice(&self.public_key);
        bytes
    }

    /// Signature algorithm of the certified key.
    #[must_use]
    pub fn algorithm(&self) -> ClassicalAlgorithm {
        self.algorithm
    }

    /// Check that the certified key parses for its algorithm.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidPublicKey`] for a malformed key, and
    /// [`CryptoError::UnsupportedAlgorithm`] when the algorithm is not
    /// compiled in.
    pub fn validate(&self) -> Result<(), CryptoError> {
        match self.algorithm {
            #[cfg(feature = "ed25519")]
            ClassicalAlgorithm::Ed25519 => {
                crate::ed25519::parse_public_key(&self.public_key).map(drop)
            },
            #[cfg(feature = "ecdsa-p256")]
            ClassicalAlgorithm::EcdsaP256 => {
                crate::ecdsa::parse_public_key(&self.public_key).map(drop)
            },
            #[allow(unreachable_patterns)]
            other => Err(CryptoError::UnsupportedAlgorithm { algorithm: other }),
        }
    }

    /// Check `signature` over `data` against the certified key.
    ///
    /// Returns `Ok(false)` for a well-formed signature that does not verify.
    ///
    /// # Errors
    ///
    /// Fails when the public key cannot be parsed, the signature is
    /// malformed for the algorithm, or the algorithm is not compiled in.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        match self.algorithm {
            #[cfg(feature = "ed25519")]
            ClassicalAlgorithm::Ed25519 => {
                let key = crate::ed25519::parse_public_key(&self.public_key)?;
                crate::ed25519::verify(&key, data, signature)
            },
            #[cfg(feature = "ecdsa-p256")]
            ClassicalAlgorithm::EcdsaP256 => {
                let key = crate::ecdsa::parse_public_key(&self.public_key)?;
                crate::ecdsa::verify(&key, data, signature)
            },
            #[allow(unreachable_patterns)]
            other => Err(CryptoError::UnsupportedAlgorithm { algorithm: other }),
        }
    }
}

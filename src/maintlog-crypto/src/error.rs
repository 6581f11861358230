//! Cryptographic error types.

use thiserror::Error;

use crate::types::ClassicalAlgorithm;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid signature format or length.
    #[error("Invalid signature: {reason}")]
    InvalidSignature {
        /// Reason the signature is invalid.
        reason: String,
    },

    /// Invalid public key format or length.
    #[error("Invalid public key: {reason}")]
    InvalidPublicKey {
        /// Reason the key is invalid.
        reason: String,
    },

    /// Invalid private key format or length.
    #[error("Invalid private key: {reason}")]
    InvalidPrivateKey {
        /// Reason the key is invalid.
        reason: String,
    },

    /// Certificate bytes could not be decoded.
    #[error("Invalid certificate: {reason}")]
    InvalidCertificate {
        /// Reason the certificate is invalid.
        reason: String,
    },

    /// Algorithm not compiled into this build.
    #[error("Algorithm not supported: {algorithm}")]
    UnsupportedAlgorithm {
        /// The unsupported algorithm.
        algorithm: ClassicalAlgorithm,
    },

    /// Crypto kind mismatch.
    #[error("Crypto kind mismatch: expected {expected:?}, got {actual:?}")]
    CryptoKindMismatch {
        /// Expected crypto kind.
        expected: [u8; 4],
        /// Actual crypto kind.
        actual: [u8; 4],
    },
}

impl CryptoError {
    /// Create an invalid signature error.
    #[must_use]
    pub fn invalid_signature(reason: impl Into<String>) -> Self {
        Self::InvalidSignature {
            reason: reason.into(),
        }
    }

    /// Create an invalid public key error.
    #[must_use]
    pub fn invalid_public_key(reason: impl Into<String>) -> Self {
        Self::InvalidPublicKey {
            reason: reason.into(),
        }
    }

    /// Create an invalid private key error.
    #[must_use]
    pub fn invalid_private_key(reason: impl Into<String>) -> Self {
        Self::InvalidPrivateKey {
            reason: reason.into(),
        }
    }

    /// Create an invalid certificate error.
    #[must_use]
    pub fn invalid_certificate(reason: impl Into<String>) -> Self {
        Self::InvalidCertificate {
            reason: reason.into(),
        }
    }

    /// Whether the error concerns caller-supplied signature bytes rather
    /// than stored key material.
    #[must_use]
    pub fn is_signature_format(&self) -> bool {
        matches!(self, Self::InvalidSignature { .. })
    }
}

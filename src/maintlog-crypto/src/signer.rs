//! Principal signing keys.
//!
//! A principal on the ledger is whoever holds the signing key behind a
//! [`Certificate`]. Signers produce the proof; [`Certificate::verify`]
//! checks it.

use crate::certificate::Certificate;
use crate::error::CryptoError;
use crate::types::ClassicalAlgorithm;

/// A key able to sign on behalf of a principal.
pub trait ClassicalSigner {
    /// Get the algorithm used by this signer.
    fn algorithm(&self) -> ClassicalAlgorithm;

    /// Get the public key.
    fn public_key(&self) -> Result<Vec<u8>, CryptoError>;

    /// Sign data and return the signature.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Certificate naming this signer's public key.
    fn certificate(&self) -> Result<Certificate, CryptoError> {
        Ok(Certificate::new(self.algorithm(), self.public_key()?))
    }
}

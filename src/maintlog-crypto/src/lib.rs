//! # maintlog-crypto
//!
//! Signature primitives for the maintlog device-maintenance ledger.
//!
//! Every state transition on the ledger is gated by proof that the caller
//! holds the private key behind a stored certificate. This crate provides
//! the pieces of that proof:
//! - **Certificates**: a self-describing encoding of a principal's public key,
//!   validated whenever it is decoded
//! - **Signers**: ECDSA P-256 and Ed25519 signing keys
//! - **Verification**: signature checks that separate "did not match" from
//!   "could not be checked"
//!
//! ## Certificate Encoding
//!
//! ```text
//! certificate = kind_tag (b"MLC1") || algorithm_id (u8) || public_key
//! ```
//!
//! The four-byte tag identifies the encoding version. The key must parse for
//! its algorithm: 32 bytes for Ed25519 (not of small order), a 65-byte
//! uncompressed SEC1 point for P-256.
//!
//! ## Verification Contract
//!
//! [`Certificate::verify`] returns `Ok(false)` when a well-formed signature
//! does not verify, and `Err` only when the key material itself is unusable.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod certificate;
mod error;
mod signer;
mod types;

#[cfg(feature = "ecdsa-p256")]
mod ecdsa;

#[cfg(feature = "ed25519")]
mod ed25519;

pub use certificate::Certificate;
pub use error::CryptoError;
pub use signer::ClassicalSigner;
pub use types::{ClassicalAlgorithm, CryptoKind, CRYPTO_KIND_MAINTLOG_V1};

#[cfg(feature = "ecdsa-p256")]
pub use ecdsa::P256Signer;

#[cfg(feature = "ed25519")]
pub use ed25519::Ed25519Signer;

/// Constant-time byte comparison.
///
/// Compares two byte slices in constant time to prevent timing attacks.
/// Returns `true` if the slices are equal, `false` otherwise.
///
/// # Security
///
/// Used for every certificate and signature comparison in the ledger.
/// The length check still returns early; lengths of certificates are public.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;

    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

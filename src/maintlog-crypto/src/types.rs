//! Certificate kind tag and algorithm identifiers.

/// Four-character code identifying a certificate encoding.
pub type CryptoKind = [u8; 4];

/// maintlog certificate encoding v1.
pub const CRYPTO_KIND_MAINTLOG_V1: CryptoKind = *b"MLC1";

/// Classical signature algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ClassicalAlgorithm {
    /// ECDSA with NIST P-256 (secp256r1), SHA-256 message digest.
    EcdsaP256 = 1,

    /// Ed25519 Edwards curve.
    Ed25519 = 2,
}

impl ClassicalAlgorithm {
    /// Wire identifier used in the certificate encoding.
    #[must_use]
    pub const fn id(&self) -> u8 {
        *self as u8
    }

    /// Resolve a wire identifier.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::EcdsaP256),
            2 => Some(Self::Ed25519),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClassicalAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EcdsaP256 => write!(f, "ecdsa-p256"),
            Self::Ed25519 => write!(f, "ed25519"),
        }
    }
}

//! Error types for ledger invocations.

use maintlog_crypto::CryptoError;
use maintlog_store::StoreError;
use thiserror::Error;

use crate::authority::PrincipalRole;

/// Coarse classification of a [`MaintenanceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad argument count, encoding or enum value.
    Argument,
    /// Caller is not the required principal (only under `DenialPolicy::Reject`).
    AuthorizationDenied,
    /// Referenced device or service record does not exist.
    NotFound,
    /// Transition attempted from a state that does not allow it.
    Precondition,
    /// Underlying store operation failed.
    Persistence,
    /// Identity could not be checked at all.
    Verification,
    /// Result could not be encoded.
    Serialization,
}

/// Errors returned to the invoking runtime.
#[derive(Debug, Error)]
pub enum MaintenanceError {
    /// Wrong argument count, malformed encoding, or invalid enum value.
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong.
        reason: String,
    },

    /// Function name not recognized by the entry point.
    #[error("Unimplemented '{function}' invoked")]
    UnknownFunction {
        /// The requested function name.
        function: String,
    },

    /// Referenced entity does not exist.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity kind ("device", "service record").
        entity: &'static str,
        /// Missing key, echoed back.
        key: String,
    },

    /// Transition blocked by the current record state.
    #[error("Precondition failed: {reason}")]
    Precondition {
        /// Which precondition failed.
        reason: String,
    },

    /// Caller did not prove the required identity.
    #[error("Caller is not the {role}")]
    AuthorizationDenied {
        /// Principal the call required.
        role: PrincipalRole,
    },

    /// Store operation failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Stored certificate could not be used to check a signature.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Invocation metadata, payload or binding could not be fetched.
    #[error("Invocation context error: {reason}")]
    Context {
        /// What could not be fetched.
        reason: String,
    },

    /// Query result could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MaintenanceError {
    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create a precondition error.
    #[must_use]
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::Precondition {
            reason: reason.into(),
        }
    }

    /// Create a context error.
    #[must_use]
    pub fn context(reason: impl Into<String>) -> Self {
        Self::Context {
            reason: reason.into(),
        }
    }

    /// Reject an argument list whose length is not `expected`.
    pub fn check_arity(args: &[String], expected: usize, usage: &str) -> Result<(), Self> {
        if args.len() != expected {
            return Err(Self::invalid_argument(format!(
                "Incorrect number of arguments. {usage}"
            )));
        }
        Ok(())
    }

    /// Classify the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } | Self::UnknownFunction { .. } => ErrorKind::Argument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Precondition { .. } => ErrorKind::Precondition,
            Self::AuthorizationDenied { .. } => ErrorKind::AuthorizationDenied,
            Self::Persistence(_) => ErrorKind::Persistence,
            Self::Crypto(_) | Self::Context { .. } => ErrorKind::Verification,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Check if resubmitting the same invocation unchanged cannot succeed.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Argument
                | ErrorKind::NotFound
                | ErrorKind::Precondition
                | ErrorKind::AuthorizationDenied
        )
    }
}

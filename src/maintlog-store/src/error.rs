//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named table has not been created.
    #[error("Table not found: {table}")]
    TableNotFound {
        /// Table name.
        table: String,
    },

    /// Insert attempted on a key that already holds a row.
    #[error("Duplicate key in {table}: {key}")]
    DuplicateKey {
        /// Table name.
        table: String,
        /// Rendered composite key.
        key: String,
    },

    /// No row exists under the requested key.
    #[error("Row not found in {table}: {key}")]
    RowNotFound {
        /// Table name.
        table: String,
        /// Rendered composite key.
        key: String,
    },

    /// Row or key does not fit the table schema.
    #[error("Schema mismatch in {table}: {reason}")]
    SchemaMismatch {
        /// Table name.
        table: String,
        /// What did not match.
        reason: String,
    },

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// Failure reported by a [`LedgerStore`](crate::LedgerStore)
    /// implementation outside the in-memory store, such as a lost connection
    /// to a ledger peer.
    #[error("Store backend error: {message}")]
    Backend {
        /// Error message from the implementation.
        message: String,
    },
}

impl StoreError {
    /// Create a schema mismatch error.
    #[must_use]
    pub fn schema_mismatch(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Create a backend error from a message. For out-of-tree
    /// [`LedgerStore`](crate::LedgerStore) implementations.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Check if this error reports a missing row.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RowNotFound { .. })
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}

//! The ledger store contract.

use crate::error::StoreError;
use crate::table::{Column, Row, TableSchema};

/// Lazy, finite, single-pass sequence of row snapshots.
///
/// Each yielded [`Row`] is an owned copy; nothing handed out aliases store
/// state. The sequence is consumed once and cannot be restarted. A row that
/// cannot be read yields an error instead of ending the scan early, so a
/// caller never mistakes a failed scan for a short table.
pub struct Rows<'a> {
    inner: Box<dyn Iterator<Item = Result<Row, StoreError>> + 'a>,
}

impl<'a> Rows<'a> {
    /// Wrap a backend iterator.
    pub fn new(inner: impl Iterator<Item = Result<Row, StoreError>> + 'a) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }
}

impl Iterator for Rows<'_> {
    type Item = Result<Row, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl std::fmt::Debug for Rows<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rows").finish_non_exhaustive()
    }
}

/// Composite-key row store with scalar state entries.
///
/// ## Contract
///
/// - Every method is atomic on a single row or entry; there are no
///   multi-row transactions.
/// - `insert_row` is not an upsert; `replace_row` never creates.
/// - `delete_row` on an absent key succeeds and returns `false`.
/// - `get_rows` takes a prefix of the key columns; an empty prefix selects
///   the whole table.
///
/// Callers that read a row and then replace it must serialize those two
/// steps themselves.
pub trait LedgerStore: Send + Sync {
    /// Create a table unless one with the same name exists.
    ///
    /// Returns `true` if the table was created.
    fn create_table_if_absent(&self, schema: TableSchema) -> Result<bool, StoreError>;

    /// Whether the table exists.
    fn has_table(&self, table: &str) -> Result<bool, StoreError>;

    /// Insert a new row. Fails with [`StoreError::DuplicateKey`] if the key
    /// is taken.
    fn insert_row(&self, table: &str, row: Row) -> Result<(), StoreError>;

    /// Overwrite an existing row. Fails with [`StoreError::RowNotFound`] if
    /// the key is free.
    fn replace_row(&self, table: &str, row: Row) -> Result<(), StoreError>;

    /// Delete the row under a full key.
    fn delete_row(&self, table: &str, key: &[Column]) -> Result<bool, StoreError>;

    /// Fetch the row under a full key.
    fn get_row(&self, table: &str, key: &[Column]) -> Result<Row, StoreError>;

    /// Enumerate rows whose key starts with `partial_key`.
    fn get_rows<'a>(&'a self, table: &str, partial_key: &[Column])
        -> Result<Rows<'a>, StoreError>;

    /// Read a scalar state entry.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write a scalar state entry.
    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

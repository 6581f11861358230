//! In-memory ledger store.
//!
//! Tables live in a `RwLock<HashMap>` keyed by name; rows within a table are
//! held in a `BTreeMap` keyed by composite key, so prefix scans come back in
//! key order.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use tracing::{debug, trace, warn};

use crate::error::StoreError;
use crate::store::{LedgerStore, Rows};
use crate::table::{describe_key, Column, Row, TableSchema};

/// A table and its rows.
#[derive(Debug)]
struct MemoryTable {
    schema: TableSchema,
    rows: BTreeMap<Vec<Column>, Row>,
}

/// Ledger store held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Tables by name.
    tables: RwLock<HashMap<String, MemoryTable>>,
    /// Scalar state entries.
    state: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in a table.
    pub fn row_count(&self, table: &str) -> Result<usize, StoreError> {
        self.with_table(table, |t| Ok(t.rows.len()))
    }

    fn with_table<T>(
        &self,
        table: &str,
        f: impl FnOnce(&MemoryTable) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let tables = self.tables.read()?;
        let t = tables.get(table).ok_or_else(|| StoreError::TableNotFound {
            table: table.to_string(),
        })?;
        f(t)
    }

    fn with_table_mut<T>(
        &self,
        table: &str,
        f: impl FnOnce(&mut MemoryTable) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut tables = self.tables.write()?;
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound {
                table: table.to_string(),
            })?;
        f(t)
    }

    /// Copy of a single row, or `None` if it has gone away.
    fn snapshot(&self, table: &str, key: &[Column]) -> Result<Option<Row>, StoreError> {
        let tables = self.tables.read().map_err(|e| {
            warn!(table, key = %describe_key(key), "Lock poisoned during row scan");
            StoreError::from(e)
        })?;
        Ok(tables.get(table).and_then(|t| t.rows.get(key).cloned()))
    }
}

impl LedgerStore for MemoryStore {
    fn create_table_if_absent(&self, schema: TableSchema) -> Result<bool, StoreError> {
        schema.validate()?;
        let mut tables = self.tables.write()?;
        if tables.contains_key(&schema.name) {
            debug!(table = %schema.name, "Table already exists");
            return Ok(false);
        }
        debug!(table = %schema.name, columns = schema.columns.len(), "Creating table");
        tables.insert(
            schema.name.clone(),
            MemoryTable {
                schema,
                rows: BTreeMap::new(),
            },
        );
        Ok(true)
    }

    fn has_table(&self, table: &str) -> Result<bool, StoreError> {
        Ok(self.tables.read()?.contains_key(table))
    }

    fn insert_row(&self, table: &str, row: Row) -> Result<(), StoreError> {
        self.with_table_mut(table, |t| {
            t.schema.validate_row(&row)?;
            let key = t.schema.key_of(&row);
            if t.rows.contains_key(&key) {
                return Err(StoreError::DuplicateKey {
                    table: table.to_string(),
                    key: describe_key(&key),
                });
            }
            trace!(table, key = %describe_key(&key), "insert");
            t.rows.insert(key, row);
            Ok(())
        })
    }

    fn replace_row(&self, table: &str, row: Row) -> Result<(), StoreError> {
        self.with_table_mut(table, |t| {
            t.schema.validate_row(&row)?;
            let key = t.schema.key_of(&row);
            match t.rows.get_mut(&key) {
                Some(existing) => {
                    trace!(table, key = %describe_key(&key), "replace");
                    *existing = row;
                    Ok(())
                },
                None => Err(StoreError::RowNotFound {
                    table: table.to_string(),
                    key: describe_key(&key),
                }),
            }
        })
    }

    fn delete_row(&self, table: &str, key: &[Column]) -> Result<bool, StoreError> {
        self.with_table_mut(table, |t| {
            t.schema.validate_key(key, false)?;
            let removed = t.rows.remove(key).is_some();
            trace!(table, key = %describe_key(key), removed, "delete");
            Ok(removed)
        })
    }

    fn get_row(&self, table: &str, key: &[Column]) -> Result<Row, StoreError> {
        self.with_table(table, |t| {
            t.schema.validate_key(key, false)?;
            t.rows.get(key).cloned().ok_or_else(|| StoreError::RowNotFound {
                table: table.to_string(),
                key: describe_key(key),
            })
        })
    }

    fn get_rows<'a>(
        &'a self,
        table: &str,
        partial_key: &[Column],
    ) -> Result<Rows<'a>, StoreError> {
        // Only keys are captured up front; each row is copied when the
        // caller reaches it, without holding the lock in between.
        let keys: Vec<Vec<Column>> = self.with_table(table, |t| {
            t.schema.validate_key(partial_key, true)?;
            Ok(t.rows
                .range(partial_key.to_vec()..)
                .take_while(|(k, _)| k.starts_with(partial_key))
                .map(|(k, _)| k.clone())
                .collect())
        })?;

        let table = table.to_string();
        Ok(Rows::new(
            keys.into_iter()
                .filter_map(move |key| self.snapshot(&table, &key).transpose()),
        ))
    }

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.state.read()?.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        trace!(key, len = value.len(), "put_state");
        self.state.write()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

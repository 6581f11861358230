//! Row, column and schema types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// UTF-8 string.
    String,
    /// Opaque bytes.
    Bytes,
    /// Boolean flag.
    Bool,
}

/// A single typed cell.
///
/// Ordering is derived so composite keys sort column by column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    /// UTF-8 string value.
    String(String),
    /// Opaque byte value.
    Bytes(Vec<u8>),
    /// Boolean value.
    Bool(bool),
}

impl Column {
    /// String cell.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Bytes cell.
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(value.into())
    }

    /// Kind of this cell.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::String(_) => ColumnKind::String,
            Self::Bytes(_) => ColumnKind::Bytes,
            Self::Bool(_) => ColumnKind::Bool,
        }
    }

    /// String value, if this is a string cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Byte value, if this is a bytes cell.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Boolean value, if this is a bool cell.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Render a composite key for error messages and logs.
pub fn describe_key(key: &[Column]) -> String {
    if key.is_empty() {
        return "<all>".to_string();
    }
    key.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

/// Column definition within a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Column type.
    pub kind: ColumnKind,
    /// Whether the column is part of the composite key.
    pub key: bool,
}

impl ColumnDefinition {
    /// Key column.
    pub fn key(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            key: true,
        }
    }

    /// Non-key column.
    pub fn value(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            key: false,
        }
    }
}

/// Table schema.
///
/// Key columns must come first; the composite key is the leading
/// `key_len()` cells of each row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Ordered column definitions.
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    /// Create a schema.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDefinition>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Number of leading key columns.
    pub fn key_len(&self) -> usize {
        self.columns.iter().take_while(|c| c.key).count()
    }

    /// Check the schema itself: at least one key column, keys leading.
    pub fn validate(&self) -> Result<(), StoreError> {
        let key_len = self.key_len();
        if key_len == 0 {
            return Err(StoreError::schema_mismatch(&self.name, "no key columns"));
        }
        if self.columns[key_len..].iter().any(|c| c.key) {
            return Err(StoreError::schema_mismatch(
                &self.name,
                "key columns must precede value columns",
            ));
        }
        Ok(())
    }

    /// Check that a row matches the schema column for column.
    pub fn validate_row(&self, row: &Row) -> Result<(), StoreError> {
        if row.len() != self.columns.len() {
            return Err(StoreError::schema_mismatch(
                &self.name,
                format!("expected {} columns, got {}", self.columns.len(), row.len()),
            ));
        }
        self.check_kinds(row.columns())
    }

    /// Check a lookup key. A prefix of the key columns is accepted when
    /// `allow_prefix` is set.
    pub fn validate_key(&self, key: &[Column], allow_prefix: bool) -> Result<(), StoreError> {
        let key_len = self.key_len();
        let ok = if allow_prefix {
            key.len() <= key_len
        } else {
            key.len() == key_len
        };
        if !ok {
            return Err(StoreError::schema_mismatch(
                &self.name,
                format!("key has {} columns, table key has {}", key.len(), key_len),
            ));
        }
        self.check_kinds(key)
    }

    /// Composite key of a row that already passed `validate_row`.
    pub fn key_of(&self, row: &Row) -> Vec<Column> {
        row.columns()[..self.key_len()].to_vec()
    }

    fn check_kinds(&self, cells: &[Column]) -> Result<(), StoreError> {
        for (def, cell) in self.columns.iter().zip(cells) {
            if def.kind != cell.kind() {
                return Err(StoreError::schema_mismatch(
                    &self.name,
                    format!(
                        "column {} expects {:?}, got {:?}",
                        def.name,
                        def.kind,
                        cell.kind()
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// A table row: an ordered list of cells matching the table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    columns: Vec<Column>,
}

impl Row {
    /// Create a row.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// All cells in schema order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Cell at `index`.
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// String cell at `index`.
    pub fn as_str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Column::as_str)
    }

    /// Bytes cell at `index`.
    pub fn as_bytes(&self, index: usize) -> Option<&[u8]> {
        self.get(index).and_then(Column::as_bytes)
    }

    /// Bool cell at `index`.
    pub fn as_bool(&self, index: usize) -> Option<bool> {
        self.get(index).and_then(Column::as_bool)
    }
}

//! # maintlog-store
//!
//! Composite-key row store backing the maintlog ledger.
//!
//! The ledger keeps two kinds of state:
//! - **Tables** of typed rows addressed by a composite key (one or more
//!   leading key columns)
//! - **Scalar entries** addressed by a string key, used for values written
//!   once at deployment such as the administrator certificate
//!
//! [`LedgerStore`] is the contract the workflow engine consumes. It is
//! deliberately narrow: no transactions, no secondary indexes, and every
//! operation is atomic on exactly one row.
//!
//! ## Backends
//!
//! | Backend | Feature | Notes |
//! |---------|---------|-------|
//! | [`MemoryStore`] | `memory` (default) | `RwLock`-guarded, ordered keys |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use maintlog_store::{Column, ColumnDefinition, ColumnKind, LedgerStore, MemoryStore, Row, TableSchema};
//!
//! let store = MemoryStore::new();
//! store.create_table_if_absent(TableSchema::new("Parts", vec![
//!     ColumnDefinition::key("PartId", ColumnKind::String),
//!     ColumnDefinition::value("Serial", ColumnKind::Bytes),
//! ]))?;
//! store.insert_row("Parts", Row::new(vec![
//!     Column::string("P1"),
//!     Column::bytes(b"abc".to_vec()),
//! ]))?;
//! for row in store.get_rows("Parts", &[])? {
//!     println!("{:?}", row?.as_str(0));
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)] // Allow Type in module::Type
#![allow(clippy::must_use_candidate)] // Not all functions need must_use

mod error;
mod store;
mod table;

#[cfg(feature = "memory")]
mod memory;

pub use error::StoreError;
pub use store::{LedgerStore, Rows};
pub use table::{describe_key, Column, ColumnDefinition, ColumnKind, Row, TableSchema};

#[cfg(feature = "memory")]
pub use memory::MemoryStore;

//! jsondb Core Library
//!
//! An embedded, single-file JSON document store. The whole file is loaded
//! into memory as a set of named tables and written back on every change.
//!
//! # Architecture
//!
//! - **Document**: the root JSON object, table name to table content
//! - **Table**: records keyed by auto-incrementing string ids `"1"`, `"2"`, ...
//! - **FileChannel**: whole-file, mutually exclusive reads and atomic writes
//!
//! All reads are served from the in-memory document.
//!
//! # Quick Start
//!
//! ```text
//! let mut db = Database::open_or_create("budget.json")?;
//!
//! db.new_table("expenses", None)?;
//! let id = db.append("expenses", parse_record(r#"{"name": "rent", "cost": 100}"#)?)?;
//!
//! let rent = db.record("expenses", id)?;
//! ```
//!
//! # Modules
//!
//! - `store`: the `Database` (main entry point)
//! - `document`: parsing and validation of the root document
//! - `table`: table views and id allocation
//! - `record`: conversion between records and Rust types
//! - `storage`: file persistence
//! - `config`: application configuration

pub mod config;
pub mod document;
pub mod error;
pub mod record;
pub mod storage;
pub mod store;
pub mod table;

pub use config::Config;
pub use document::{Document, DocumentError, DocumentState, DEFAULT_DOCUMENT, DEFAULT_TABLE};
pub use error::{DatabaseError, DatabaseResult};
pub use record::{from_record, parse_record, to_record, Record};
pub use storage::{FileChannel, StorageError, StorageResult};
pub use store::Database;
pub use table::Table;

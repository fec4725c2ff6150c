//! Database: the document store
//!
//! A `Database` loads the whole JSON file into memory, serves reads from the
//! in-memory document and writes the whole document back on every change.
//!
//! ## Mutations
//!
//! Every mutating call follows the same two steps:
//! 1. Validate and apply the change to the in-memory document. A failed
//!    validation leaves both memory and disk untouched.
//! 2. Serialize the whole document and replace the file.
//!
//! If step 2 fails the change stays in memory and the call returns
//! [`DatabaseError::Persist`]. Call [`Database::reload`] to go back to what
//! is on disk.
//!
//! ## Concurrency
//!
//! Two `Database` values opened on the same path do not see each other's
//! changes. Each rewrites the file from its own snapshot, so the last
//! writer wins and earlier changes from the other instance are lost.
//!
//! ## Usage
//!
//! ```ignore
//! let mut db = Database::open_or_create("data/budget.json")?;
//!
//! if !db.table_exists("expenses")? {
//!     db.new_table("expenses", None)?;
//! }
//!
//! let id = db.append("expenses", parse_record(r#"{"name": "rent", "cost": 100}"#)?)?;
//! db.append_value_to_table("expenses", id, "paid", true)?;
//! ```

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::document::{Document, DocumentState, DEFAULT_DOCUMENT};
use crate::error::{DatabaseError, DatabaseResult};
use crate::record::{self, Record};
use crate::storage::FileChannel;
use crate::table::{Table, TableMut};

/// Single-file JSON document store
#[derive(Debug)]
pub struct Database {
    /// Backing file
    channel: FileChannel,
    /// The parsed document, or `Empty` if the file had no content
    state: DocumentState,
    /// Pretty-print on persist
    pretty: bool,
}

impl Database {
    /// Open an existing database file
    ///
    /// An empty file opens successfully with no document; every accessor
    /// then fails with [`DatabaseError::NoDocument`].
    pub fn open(path: impl AsRef<Path>) -> DatabaseResult<Self> {
        let channel = FileChannel::open(path)?;
        let db = Self::load(channel)?;
        info!("Opened database {:?}", db.path());
        Ok(db)
    }

    /// Create a new database file containing `{ "default": {} }`
    ///
    /// Missing parent directories are created. Fails with
    /// [`DatabaseError::Creation`] if the file already exists or cannot be
    /// written.
    pub fn create(path: impl AsRef<Path>) -> DatabaseResult<Self> {
        let path = path.as_ref();
        let creation_failed = |source| DatabaseError::Creation {
            path: path.to_path_buf(),
            source,
        };

        let channel = FileChannel::create(path).map_err(creation_failed)?;
        channel.write(DEFAULT_DOCUMENT).map_err(creation_failed)?;

        let db = Self::load(channel)?;
        info!("Created database {:?}", db.path());
        Ok(db)
    }

    /// Open the database at `path`, creating it if no file exists
    pub fn open_or_create(path: impl AsRef<Path>) -> DatabaseResult<Self> {
        match Self::open(path.as_ref()) {
            Err(e) if e.is_not_found() => Self::create(path),
            result => result,
        }
    }

    /// Open (or create) the configured default database
    pub fn open_with_config(config: &Config) -> DatabaseResult<Self> {
        Ok(Self::open_or_create(config.database_path())?.with_pretty(config.pretty))
    }

    /// Pretty-print the document on subsequent writes
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn load(channel: FileChannel) -> DatabaseResult<Self> {
        let state = read_state(&channel)?;
        Ok(Self {
            channel,
            state,
            pretty: false,
        })
    }

    /// Discard in-memory state and load the file again
    pub fn reload(&mut self) -> DatabaseResult<()> {
        self.state = read_state(&self.channel)?;
        debug!("Reloaded database {:?}", self.path());
        Ok(())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.channel.path()
    }

    /// Whether a document was loaded (false if the file was empty)
    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    /// The in-memory document
    pub fn document(&self) -> DatabaseResult<&Document> {
        self.state.document()
    }

    // ==================== Tables ====================

    /// Check whether a table exists
    pub fn table_exists(&self, name: &str) -> DatabaseResult<bool> {
        Ok(self.document()?.contains_table(name))
    }

    /// Table names in document order
    pub fn table_names(&self) -> DatabaseResult<Vec<String>> {
        Ok(self.document()?.table_names())
    }

    /// Borrow a read-only view of a table
    pub fn table(&self, name: &str) -> DatabaseResult<Table<'_>> {
        let (name, content) = self
            .document()?
            .table_entry(name)
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))?;
        Ok(Table::new(name, content))
    }

    fn table_mut<'a>(&'a mut self, name: &'a str) -> DatabaseResult<TableMut<'a>> {
        let content = self
            .state
            .document_mut()?
            .table_mut(name)
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))?;
        Ok(TableMut::new(name, content))
    }

    /// Create a table, optionally with initial content
    pub fn new_table(&mut self, name: &str, initial: Option<Record>) -> DatabaseResult<()> {
        let doc = self.state.document_mut()?;
        if doc.contains_table(name) {
            return Err(DatabaseError::TableAlreadyExists(name.to_string()));
        }

        doc.insert_table(name, initial.unwrap_or_default());
        debug!("Created table {}", name);
        self.persist()
    }

    /// Remove a table and all of its records
    pub fn drop_table(&mut self, name: &str) -> DatabaseResult<()> {
        self.state
            .document_mut()?
            .remove_table(name)
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))?;

        debug!("Dropped table {}", name);
        self.persist()
    }

    // ==================== Records ====================

    /// Get a record by id
    pub fn record(&self, table: &str, id: u64) -> DatabaseResult<&Record> {
        self.table(table)?.record(&id.to_string())
    }

    /// Append a record and return its newly allocated id
    pub fn append(&mut self, table: &str, record: Record) -> DatabaseResult<u64> {
        let id = self.table_mut(table)?.append(record)?;
        debug!("Appended record {} to table {}", id, table);
        self.persist()?;
        Ok(id)
    }

    /// Append any value that serializes to a JSON object
    pub fn append_serialized<T: Serialize + ?Sized>(
        &mut self,
        table: &str,
        value: &T,
    ) -> DatabaseResult<u64> {
        let record = record::to_record(value)?;
        self.append(table, record)
    }

    /// Deserialize every record of a table, in table order
    pub fn records_as<T: DeserializeOwned>(&self, table: &str) -> DatabaseResult<Vec<T>> {
        self.table(table)?
            .records()
            .map(|(_, record)| record::from_record(record))
            .collect()
    }

    /// Add a new field to an existing record
    ///
    /// Never overwrites: fails with [`DatabaseError::FieldAlreadyExists`] if
    /// the record already has `field`.
    pub fn append_value_to_table(
        &mut self,
        table: &str,
        id: u64,
        field: &str,
        value: impl Into<Value>,
    ) -> DatabaseResult<()> {
        self.table_mut(table)?
            .insert_field(&id.to_string(), field, value.into())?;
        debug!("Added field {} to record {} in table {}", field, id, table);
        self.persist()
    }

    /// Delete the entry stored under `key` in `table`, returning it
    pub fn delete(&mut self, table: &str, key: &str) -> DatabaseResult<Value> {
        let removed = self.table_mut(table)?.remove(key)?;
        debug!("Deleted key {} from table {}", key, table);
        self.persist()?;
        Ok(removed)
    }

    /// Delete a record by id
    pub fn delete_record(&mut self, table: &str, id: u64) -> DatabaseResult<Value> {
        self.delete(table, &id.to_string())
    }

    // ==================== Serialization ====================

    /// Serialize the in-memory document as compact JSON
    pub fn to_json_string(&self) -> DatabaseResult<String> {
        Ok(self.document()?.to_json(false)?)
    }

    /// Write the whole document to the backing file
    fn persist(&self) -> DatabaseResult<()> {
        let text = self.document()?.to_json(self.pretty)?;

        self.channel
            .write(&text)
            .map_err(|source| DatabaseError::Persist {
                path: self.path().to_path_buf(),
                source,
            })
    }
}

/// Read and parse the channel's file
fn read_state(channel: &FileChannel) -> DatabaseResult<DocumentState> {
    let contents = channel.read()?;

    let state =
        DocumentState::from_contents(contents.as_deref()).map_err(|source| DatabaseError::Parse {
            path: PathBuf::from(channel.path()),
            source,
        })?;

    if !state.is_loaded() {
        warn!("Database file {:?} is empty; no document loaded", channel.path());
    }

    Ok(state)
}

//! Database error handling
//!
//! Every public [`Database`](crate::Database) operation returns
//! [`DatabaseResult<T>`]. Precondition failures (missing table, existing
//! field, ...) are reported before anything is touched; [`DatabaseError::Persist`]
//! is the only error raised after the in-memory document has changed.

use std::path::PathBuf;
use thiserror::Error;

use crate::document::DocumentError;
use crate::storage::StorageError;

/// Errors that can occur during database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The backing file could not be opened or read
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A new database file could not be created or initialized
    #[error("Could not create database at '{path}': {source}")]
    Creation {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    /// The file has content, but it is not UTF-8 JSON shaped as an object of objects
    #[error("Invalid document format in '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    /// The backing file was empty when loaded, so there is no document
    #[error("No document loaded: the database file was empty")]
    NoDocument,

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("No record with id {id} in table {table}")]
    RecordNotFound { table: String, id: String },

    #[error("No key '{key}' in table {table}")]
    KeyNotFound { table: String, key: String },

    /// The table's highest integer id is already the largest possible id
    #[error("No ids left to allocate in table {0}")]
    IdsExhausted(String),

    /// Fields are append-only; existing values are never overwritten
    #[error("Field '{field}' already exists on record {id} in table {table}")]
    FieldAlreadyExists {
        table: String,
        id: String,
        field: String,
    },

    /// The in-memory change was applied but could not be written to disk.
    /// Memory is now ahead of the file until the next successful persist
    /// or a [`reload`](crate::Database::reload).
    #[error("Failed to persist document to '{path}': {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    /// A caller value could not be converted to or from a record
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DatabaseError {
    /// True when the database file does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::Storage(StorageError::NotFound { .. }))
    }

    /// The underlying storage error, if any
    pub fn storage(&self) -> Option<&StorageError> {
        match self {
            DatabaseError::Storage(source)
            | DatabaseError::Creation { source, .. }
            | DatabaseError::Persist { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

//! Table views
//!
//! A table is one top-level object of the document. Its keys are record ids,
//! decimal integers starting at `"1"`, each mapped to a record object:
//!
//! ```text
//! {
//!     "1": { "key_name": value, ... },
//!     "2": { ... }
//! }
//! ```
//!
//! Views borrow straight into the database's document. They are built per
//! call and cannot outlive the borrow of the [`Database`](crate::Database)
//! that produced them.

use std::fmt;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{DatabaseError, DatabaseResult};
use crate::record::Record;

/// Read-only view of a single table
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    name: &'a str,
    content: &'a Map<String, Value>,
}

impl<'a> Table<'a> {
    pub(crate) fn new(name: &'a str, content: &'a Map<String, Value>) -> Self {
        Self { name, content }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Look up a top-level key of the table, usually a record id
    ///
    /// A stored JSON `null` is returned as [`Value::Null`]; a missing key
    /// fails with [`DatabaseError::KeyNotFound`].
    pub fn get(&self, key: &str) -> DatabaseResult<&'a Value> {
        self.content
            .get(key)
            .ok_or_else(|| DatabaseError::KeyNotFound {
                table: self.name.to_string(),
                key: key.to_string(),
            })
    }

    /// The record stored under `id`
    pub fn record(&self, id: &str) -> DatabaseResult<&'a Record> {
        self.content
            .get(id)
            .and_then(Value::as_object)
            .ok_or_else(|| DatabaseError::RecordNotFound {
                table: self.name.to_string(),
                id: id.to_string(),
            })
    }

    /// The id the next appended record will receive
    ///
    /// Fails with [`DatabaseError::IdsExhausted`] once the table holds the
    /// largest possible id.
    pub fn next_id(&self) -> DatabaseResult<u64> {
        next_id(self.name, self.content)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Keys in table order
    pub fn keys(&self) -> impl Iterator<Item = &'a str> {
        self.content.keys().map(String::as_str)
    }

    /// Every `(id, record)` pair whose value is an object
    pub fn records(&self) -> impl Iterator<Item = (&'a str, &'a Record)> {
        self.content
            .iter()
            .filter_map(|(id, value)| value.as_object().map(|record| (id.as_str(), record)))
    }

    pub fn content(&self) -> &'a Map<String, Value> {
        self.content
    }
}

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self.content).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Mutable view used by the database to apply changes
pub(crate) struct TableMut<'a> {
    name: &'a str,
    content: &'a mut Map<String, Value>,
}

impl<'a> TableMut<'a> {
    pub(crate) fn new(name: &'a str, content: &'a mut Map<String, Value>) -> Self {
        Self { name, content }
    }

    /// Store `record` under a freshly allocated id and return the id
    pub(crate) fn append(&mut self, record: Record) -> DatabaseResult<u64> {
        let id = next_id(self.name, self.content)?;
        self.content.insert(id.to_string(), Value::Object(record));
        Ok(id)
    }

    /// Add a new field to an existing record, refusing to overwrite
    pub(crate) fn insert_field(&mut self, id: &str, field: &str, value: Value) -> DatabaseResult<()> {
        let record = self
            .content
            .get_mut(id)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| DatabaseError::RecordNotFound {
                table: self.name.to_string(),
                id: id.to_string(),
            })?;

        if record.contains_key(field) {
            return Err(DatabaseError::FieldAlreadyExists {
                table: self.name.to_string(),
                id: id.to_string(),
                field: field.to_string(),
            });
        }

        record.insert(field.to_string(), value);
        Ok(())
    }

    /// Remove a key from the table, returning what was stored there
    pub(crate) fn remove(&mut self, key: &str) -> DatabaseResult<Value> {
        self.content
            .shift_remove(key)
            .ok_or_else(|| DatabaseError::KeyNotFound {
                table: self.name.to_string(),
                key: key.to_string(),
            })
    }
}

/// One more than the largest integer key, or 1 for a table without any
///
/// Gaps left by deletions are never filled. Keys that are not decimal
/// integers do not take part in allocation.
fn next_id(table: &str, content: &Map<String, Value>) -> DatabaseResult<u64> {
    let mut highest: u64 = 0;

    for key in content.keys() {
        match key.parse::<u64>() {
            Ok(id) => highest = highest.max(id),
            Err(_) => warn!("Ignoring non-integer key {:?} in table {}", key, table),
        }
    }

    highest
        .checked_add(1)
        .ok_or_else(|| DatabaseError::IdsExhausted(table.to_string()))
}

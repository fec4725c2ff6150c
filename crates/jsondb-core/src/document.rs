//! Root document handling
//!
//! The whole database file is one JSON object. Each top-level key is a table
//! name and each value is the table's content, itself a JSON object:
//!
//! ```text
//! {
//!     "default": {},
//!     "expenses": {
//!         "1": { "name": "rent", "cost": 100 },
//!         "2": { "name": "car insurance", "cost": 221 }
//!     }
//! }
//! ```
//!
//! Key order is preserved from the file and from insertion.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{DatabaseError, DatabaseResult};

/// Content written to a freshly created database file
pub const DEFAULT_DOCUMENT: &str = "{ \"default\": {} }";

/// Name of the table present in a freshly created database
pub const DEFAULT_TABLE: &str = "default";

/// Errors that can occur while parsing a document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("root must be a JSON object, found {0}")]
    RootNotObject(&'static str),

    #[error("table '{name}' must be a JSON object, found {kind}")]
    TableNotObject { name: String, kind: &'static str },
}

/// The parsed root object: table name to table content
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    root: Map<String, Value>,
}

impl Document {
    /// Parse and validate document text
    ///
    /// Rejects anything that is not an object whose values are all objects.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(root) => Self::from_map(root),
            other => Err(DocumentError::RootNotObject(kind_of(&other))),
        }
    }

    /// Build a document from an already parsed root object
    pub fn from_map(root: Map<String, Value>) -> Result<Self, DocumentError> {
        if let Some((name, value)) = root.iter().find(|(_, v)| !v.is_object()) {
            return Err(DocumentError::TableNotObject {
                name: name.clone(),
                kind: kind_of(value),
            });
        }
        Ok(Self { root })
    }

    /// Table names in document order
    pub fn table_names(&self) -> Vec<String> {
        self.root.keys().cloned().collect()
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    /// Content of the named table
    pub fn table(&self, name: &str) -> Option<&Map<String, Value>> {
        self.root.get(name).and_then(Value::as_object)
    }

    /// Stored table name and content, both borrowed from the document
    pub fn table_entry(&self, name: &str) -> Option<(&str, &Map<String, Value>)> {
        let (key, value) = self.root.get_key_value(name)?;
        Some((key.as_str(), value.as_object()?))
    }

    /// Mutable content of the named table
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Map<String, Value>> {
        self.root.get_mut(name).and_then(Value::as_object_mut)
    }

    /// Add a table; callers check for an existing table first
    pub fn insert_table(&mut self, name: &str, content: Map<String, Value>) {
        self.root.insert(name.to_string(), Value::Object(content));
    }

    /// Remove a table, keeping the order of the remaining ones
    pub fn remove_table(&mut self, name: &str) -> Option<Map<String, Value>> {
        match self.root.shift_remove(name) {
            Some(Value::Object(content)) => Some(content),
            _ => None,
        }
    }

    /// Serialize the whole document
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(&self.root)
        } else {
            serde_json::to_string(&self.root)
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }
}

/// What a database holds after loading its file
///
/// An empty file loads as [`DocumentState::Empty`], which is distinct from a
/// document with zero tables. Every accessor on an empty state fails with
/// [`DatabaseError::NoDocument`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DocumentState {
    #[default]
    Empty,
    Loaded(Document),
}

impl DocumentState {
    /// Interpret file contents as read by the storage channel
    ///
    /// Content must be UTF-8 encoded JSON.
    pub fn from_contents(contents: Option<&[u8]>) -> Result<Self, DocumentError> {
        match contents {
            Some(bytes) => {
                let text = std::str::from_utf8(bytes)?;
                Ok(DocumentState::Loaded(Document::parse(text)?))
            }
            None => Ok(DocumentState::Empty),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, DocumentState::Loaded(_))
    }

    pub fn document(&self) -> DatabaseResult<&Document> {
        match self {
            DocumentState::Loaded(doc) => Ok(doc),
            DocumentState::Empty => Err(DatabaseError::NoDocument),
        }
    }

    pub fn document_mut(&mut self) -> DatabaseResult<&mut Document> {
        match self {
            DocumentState::Loaded(doc) => Ok(doc),
            DocumentState::Empty => Err(DatabaseError::NoDocument),
        }
    }
}

/// JSON type name, for error messages
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

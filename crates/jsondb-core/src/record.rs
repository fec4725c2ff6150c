//! Records and conversion to/from Rust types
//!
//! A record is a JSON object of arbitrary fields. Any type with a serde
//! `Serialize` impl that produces an object (a struct with named fields, a
//! map with string keys) can be stored as a record; the fields written are
//! exactly those the impl exposes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DatabaseError, DatabaseResult};

/// Field name to value
pub type Record = Map<String, Value>;

/// Convert a value into a record
///
/// Fails with [`DatabaseError::Serialization`] if the value does not
/// serialize to a JSON object.
pub fn to_record<T: Serialize + ?Sized>(value: &T) -> DatabaseResult<Record> {
    match serde_json::to_value(value)? {
        Value::Object(record) => Ok(record),
        other => Err(DatabaseError::Serialization(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Convert a record back into a typed value
pub fn from_record<T: DeserializeOwned>(record: &Record) -> DatabaseResult<T> {
    Ok(serde_json::from_value(Value::Object(record.clone()))?)
}

/// Parse record text, e.g. from a command line argument
pub fn parse_record(text: &str) -> DatabaseResult<Record> {
    let value: Value = serde_json::from_str(text)?;
    to_record(&value)
}

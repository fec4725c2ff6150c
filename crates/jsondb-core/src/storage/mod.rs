//! Storage layer
//!
//! Handles whole-file persistence of the JSON document.
//!
//! ## Architecture
//!
//! - **FileChannel**: owns the database path, serializes reads and writes
//! - **StorageError**: I/O failures classified by cause
//!
//! The store never writes part of a file. Each persist serializes the whole
//! document and hands it to the channel, which replaces the file atomically.

pub mod channel;
pub mod error;

pub use channel::FileChannel;
pub use error::{StorageError, StorageResult};

//! Storage error handling
//!
//! Typed errors for the file channel, classified from the underlying
//! `io::Error` so callers can tell a missing file from a full disk.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing the backing file
#[derive(Error, Debug)]
pub enum StorageError {
    /// No file exists at the path (when expected to exist)
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    /// A file already exists at the path (when creating a new one)
    #[error("File already exists: '{path}'")]
    AlreadyExists { path: PathBuf },

    /// Failed to create parent directories
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Classify an I/O error raised while reading `path`
    pub fn from_read(error: io::Error, path: PathBuf) -> Self {
        Self::classify(error, path)
            .unwrap_or_else(|(error, path)| StorageError::ReadError {
                path,
                source: error,
            })
    }

    /// Classify an I/O error raised while writing or creating `path`
    pub fn from_write(error: io::Error, path: PathBuf) -> Self {
        Self::classify(error, path)
            .unwrap_or_else(|(error, path)| StorageError::WriteError {
                path,
                source: error,
            })
    }

    /// Map the error kinds that mean the same thing for reads and writes.
    /// Anything else is handed back for the caller to wrap.
    fn classify(error: io::Error, path: PathBuf) -> Result<Self, (io::Error, PathBuf)> {
        match error.kind() {
            io::ErrorKind::PermissionDenied => Ok(StorageError::PermissionDenied {
                path,
                source: error,
            }),
            io::ErrorKind::NotFound => Ok(StorageError::NotFound { path }),
            io::ErrorKind::AlreadyExists => Ok(StorageError::AlreadyExists { path }),
            // StorageFull is not stable on every toolchain, so check the message too
            _ if is_disk_full_error(&error) => Ok(StorageError::DiskFull {
                path,
                source: error,
            }),
            _ => Err((error, path)),
        }
    }

    /// The path this error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            StorageError::NotFound { path }
            | StorageError::AlreadyExists { path }
            | StorageError::CreateDirectory { path, .. }
            | StorageError::PermissionDenied { path, .. }
            | StorageError::DiskFull { path, .. }
            | StorageError::ReadError { path, .. }
            | StorageError::WriteError { path, .. } => path,
        }
    }

    /// Check if the user can fix this error without code changes
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::DiskFull { .. }
                | StorageError::PermissionDenied { .. }
                | StorageError::AlreadyExists { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions. You may need to run with different permissions or change ownership.")
            }
            StorageError::AlreadyExists { .. } => {
                Some("Open the existing file instead, or choose a different path.")
            }
            StorageError::NotFound { .. } => {
                Some("Create the database first with `jsondb init`.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

//! Storage error types
//!
//! Defines all errors that can occur while reading or writing journal files.

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Compression or decompression failed
    #[error("Compression error: {0}")]
    Compression(String),

    /// Data corruption detected (checksum mismatch, truncated file, etc.)
    #[error("Corrupt data: {0}")]
    Corruption(String),

    /// File is not a journal file
    #[error("Invalid journal file: {0}")]
    InvalidFormat(String),

    /// File was written by a newer format version
    #[error("Unsupported journal format version: {0}")]
    UnsupportedVersion(u16),

    /// No journal file exists for this user
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// User name cannot be turned into a file name
    #[error("Invalid user name: {0:?}")]
    InvalidUserName(String),
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

//! Healthlog Storage
//!
//! Persistence for journals, one file per user:
//!
//! - **format**: versioned file header, checksums, LZ4 payload, legacy upgrade
//! - **directory**: user name → file mapping inside a data directory
//! - **session**: scoped load-at-open / save-at-close access
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Open:
//!   name → path → read → verify header/CRC → decompress → decode → (upgrade v1) → store
//!
//! Close:
//!   prune empty days → encode → compress → header + CRC → overwrite file
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use healthlog::storage::{JournalDirectory, Session};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let directory = JournalDirectory::new("./journals");
//!     let session = Session::open_or_create(&directory, "alex")?;
//!
//!     let summary = session.journal().statistics().summary(6);
//!     println!("{}", summary);
//!
//!     session.close()?;
//!     Ok(())
//! }
//! ```

pub mod directory;
pub mod error;
pub mod format;
pub mod session;

// Re-export commonly used types
pub use directory::{JournalDirectory, DEFAULT_EXTENSION};
pub use error::{StorageError, StorageResult};
pub use format::{
    decode_journal, encode_journal, CompressionType, DecodedJournal, FileHeader, FORMAT_VERSION,
    LEGACY_FORMAT_VERSION,
};
pub use session::Session;

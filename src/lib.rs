//! # Healthlog
//!
//! Personal health journal - a chronological store of daily glucose, meal,
//! activity and mood records with rolling statistics.
//!
//! ## Features
//!
//! - **Chronological store**: out-of-order insertion, date lookup, pruning of
//!   empty days, forward and backward traversal
//! - **Rolling statistics**: glucose, activity, carbs-per-meal and missed-meal
//!   averages with qualitative ratings
//! - **Single-file persistence**: versioned, checksummed, LZ4-compressed
//!   journal files with a one-time legacy upgrade
//! - **Export/Import**: CSV and JSON
//!
//! ## Modules
//!
//! - [`journal`]: Records, days and the chronological store
//! - [`stats`]: Rolling averages and ratings
//! - [`storage`]: Journal files and sessions
//! - [`export`] / [`import`]: CSV and JSON interchange
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use healthlog::{JournalDirectory, Record, Session, TimeSlot};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let directory = JournalDirectory::new("./journals");
//!     let mut session = Session::open_or_create(&directory, "alex")?;
//!
//!     // Record breakfast
//!     let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
//!     let record = Record::builder().glucose(105).meal("oatmeal", 30).build()?;
//!     session
//!         .journal_mut()
//!         .store_mut()
//!         .get_or_insert(date)
//!         .set_record(TimeSlot::Morning, Some(record));
//!
//!     // Averages over the last week
//!     println!("{}", session.journal().statistics().summary(6));
//!
//!     // Prune empty days and write back
//!     session.close()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod export;
pub mod import;
pub mod journal;
pub mod stats;
pub mod storage;

// Re-export top-level types for convenience
pub use journal::{
    ChronologicalStore, Day, Journal, JournalError, JournalResult, Record, RecordBuilder,
    RecordEdit, TimeSlot, ValidationError,
};

pub use stats::{
    rate_carbs_per_meal, rate_glucose, rate_meals_missed, rate_minutes_active, Rating,
    Statistics, StatsSummary, MEALS_PER_DAY,
};

pub use storage::{
    CompressionType, JournalDirectory, Session, StorageError, StorageResult,
};

pub use export::{ExportError, ExportFormat};
pub use import::{CsvImportResult, CsvImporter, ImportError};

pub use config::{Config, ConfigError, LoggingConfig, StatsConfig, StorageConfig};

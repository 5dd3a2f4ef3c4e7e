//! Healthlog Journal
//!
//! The in-memory model of one user's health journal:
//!
//! - **record**: one time slot's measurements (glucose, meal, activity, mood)
//! - **day**: up to three records for a calendar date
//! - **store**: the date-ordered chain of days
//! - **error**: validation and structural errors
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use healthlog::journal::{Journal, Record, TimeSlot};
//!
//! let mut journal = Journal::new("alex");
//! let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
//!
//! let breakfast = Record::builder().glucose(105).meal("oatmeal", 30).build()?;
//! journal
//!     .store_mut()
//!     .get_or_insert(date)
//!     .set_record(TimeSlot::Morning, Some(breakfast));
//!
//! assert_eq!(journal.statistics().average_glucose(0), 105.0);
//! # Ok::<(), healthlog::journal::ValidationError>(())
//! ```

pub mod day;
pub mod error;
pub mod record;
pub mod store;

pub use day::{Day, LegacyDay, TimeSlot, DATE_FORMAT};
pub use error::{JournalError, JournalResult, ValidationError};
pub use record::{Record, RecordBuilder, RecordEdit, TIME_FORMAT};
pub use store::{ChronologicalStore, Iter, WalkBack};

use crate::stats::Statistics;

/// A named user's journal: the user name plus their days
#[derive(Debug, Clone, Default)]
pub struct Journal {
    name: String,
    store: ChronologicalStore,
}

impl Journal {
    /// Create an empty journal
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: ChronologicalStore::new(),
        }
    }

    /// Create a journal around an existing store
    pub fn with_store(name: impl Into<String>, store: ChronologicalStore) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &ChronologicalStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ChronologicalStore {
        &mut self.store
    }

    /// Rolling statistics over this journal's days
    pub fn statistics(&self) -> Statistics<'_> {
        Statistics::new(&self.store)
    }
}

//! Journal sessions
//!
//! A `Session` holds one user's journal for the duration of an editing
//! session. The file is read when the session opens and overwritten when it
//! closes; empty days are pruned before writing. A session that is dropped
//! without being closed or discarded still writes back, so normal exits never
//! lose edits.

use crate::journal::Journal;
use crate::storage::directory::JournalDirectory;
use crate::storage::error::StorageResult;

/// Scoped access to one user's persisted journal
pub struct Session {
    directory: JournalDirectory,
    journal: Journal,
    /// Set once the journal has been written back or discarded
    finished: bool,
}

impl Session {
    /// Open an existing user's journal
    pub fn open(directory: &JournalDirectory, name: &str) -> StorageResult<Self> {
        let journal = directory.load(name)?;
        Ok(Self::start(directory, journal))
    }

    /// Start a session for a new user; nothing is written until close
    pub fn create(directory: &JournalDirectory, name: &str) -> StorageResult<Self> {
        // Reject unusable names before any editing happens
        directory.path_for(name)?;
        tracing::info!(user = %name, "Creating new journal");
        Ok(Self::start(directory, Journal::new(name)))
    }

    /// Open a user's journal, creating it if there is none
    pub fn open_or_create(directory: &JournalDirectory, name: &str) -> StorageResult<Self> {
        if directory.exists(name) {
            Self::open(directory, name)
        } else {
            Self::create(directory, name)
        }
    }

    fn start(directory: &JournalDirectory, journal: Journal) -> Self {
        tracing::debug!(user = %journal.name(), "Session opened");
        Self {
            directory: directory.clone(),
            journal,
            finished: false,
        }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn journal_mut(&mut self) -> &mut Journal {
        &mut self.journal
    }

    /// Prune empty days and write the journal back
    pub fn close(mut self) -> StorageResult<()> {
        let result = self.write_back();
        self.finished = true;
        result
    }

    /// End the session without saving
    pub fn discard(mut self) {
        tracing::debug!(user = %self.journal.name(), "Session discarded");
        self.finished = true;
    }

    fn write_back(&mut self) -> StorageResult<()> {
        let pruned = self.journal.store_mut().prune_empty();

        if let Err(e) = self.journal.store().verify_links() {
            tracing::error!(user = %self.journal.name(), error = %e, "Journal failed integrity check");
        }

        self.directory.save(&self.journal)?;
        tracing::debug!(user = %self.journal.name(), pruned, "Session closed");
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.write_back() {
            tracing::error!(
                user = %self.journal.name(),
                error = %e,
                "Failed to write back journal on drop"
            );
        }
    }
}

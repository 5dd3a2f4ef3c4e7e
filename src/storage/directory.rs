//! Journal directory
//!
//! Maps user names to journal files inside a data directory. Each user has one
//! file named after them with spaces removed, e.g. `Sam Doe` → `SamDoe.dbhat`.

use crate::config::StorageConfig;
use crate::journal::Journal;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::format::{decode_journal, encode_journal, CompressionType};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default journal file extension
pub const DEFAULT_EXTENSION: &str = "dbhat";

/// A data directory holding one journal file per user
#[derive(Debug, Clone)]
pub struct JournalDirectory {
    root: PathBuf,
    extension: String,
    compression: CompressionType,
}

impl JournalDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            compression: CompressionType::Lz4,
        }
    }

    /// Build from the `[storage]` config section
    pub fn from_config(config: &StorageConfig) -> Self {
        let compression = if config.compression {
            CompressionType::Lz4
        } else {
            CompressionType::None
        };

        Self::new(config.data_path())
            .with_extension(&config.extension)
            .with_compression(compression)
    }

    /// Builder: set the file extension (without the dot)
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Builder: set payload compression for saved files
    pub fn with_compression(mut self, compression: CompressionType) -> Self {
        self.compression = compression;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the journal file for a user
    pub fn path_for(&self, name: &str) -> StorageResult<PathBuf> {
        let stem = file_stem(name)?;
        Ok(self.root.join(format!("{}.{}", stem, self.extension)))
    }

    /// Check whether a user has a journal file
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Read a user's journal
    pub fn load(&self, name: &str) -> StorageResult<Journal> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(StorageError::UserNotFound(name.to_string()));
        }

        let bytes = std::fs::read(&path)?;
        let decoded = decode_journal(&bytes)?;

        tracing::info!(
            path = %path.display(),
            days = decoded.journal.store().len(),
            version = decoded.source_version,
            "Loaded journal"
        );

        Ok(decoded.journal)
    }

    /// Overwrite a user's journal file with the journal's current contents
    pub fn save(&self, journal: &Journal) -> StorageResult<()> {
        let path = self.path_for(journal.name())?;
        std::fs::create_dir_all(&self.root)?;

        let bytes = encode_journal(journal, self.compression)?;
        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_all(&bytes)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;

        tracing::info!(
            path = %path.display(),
            days = journal.store().len(),
            bytes = bytes.len(),
            "Saved journal"
        );

        Ok(())
    }

    /// List the file stems of all journals in the directory
    ///
    /// Stems are user names with whitespace removed (`Sam Doe` is listed as
    /// `SamDoe`). A stem resolves to the same file as the name it came from,
    /// so it can be passed back to [`load`](Self::load). The display name is
    /// the one stored inside the file, see [`Journal::name`].
    pub fn list(&self) -> StorageResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut users = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                users.push(stem.to_string());
            }
        }

        users.sort();
        Ok(users)
    }
}

/// File stem for a user name: spaces removed, no path components
fn file_stem(name: &str) -> StorageResult<String> {
    let stem: String = name.chars().filter(|c| !c.is_whitespace()).collect();

    let invalid = stem.is_empty()
        || stem.starts_with('.')
        || stem.contains(|c: char| matches!(c, '/' | '\\' | ':' | '\0'));

    if invalid {
        return Err(StorageError::InvalidUserName(name.to_string()));
    }

    Ok(stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{Day, Record, TimeSlot};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample_journal(name: &str) -> Journal {
        let mut journal = Journal::new(name);
        journal.store_mut().insert(
            Day::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()).with_record(
                TimeSlot::Morning,
                Record::builder().glucose(100).build().unwrap(),
            ),
        );
        journal
    }

    #[test]
    fn test_file_naming() {
        let dir = JournalDirectory::new("/data").with_extension(".log");
        assert_eq!(
            dir.path_for("Sam Doe").unwrap(),
            PathBuf::from("/data/SamDoe.log")
        );

        assert!(matches!(
            dir.path_for("   "),
            Err(StorageError::InvalidUserName(_))
        ));
        assert!(dir.path_for("../etc/passwd").is_err());
        assert!(dir.path_for(".hidden").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempdir().unwrap();
        let dir = JournalDirectory::new(tmp.path());

        assert!(!dir.exists("Sam Doe"));
        dir.save(&sample_journal("Sam Doe")).unwrap();
        assert!(dir.exists("Sam Doe"));
        assert!(tmp.path().join("SamDoe.dbhat").is_file());

        let loaded = dir.load("Sam Doe").unwrap();
        assert_eq!(loaded.name(), "Sam Doe");
        assert_eq!(loaded.store().len(), 1);
        assert_eq!(loaded.statistics().average_glucose(0), 100.0);
    }

    #[test]
    fn test_load_missing_user() {
        let tmp = tempdir().unwrap();
        let dir = JournalDirectory::new(tmp.path());
        assert!(matches!(
            dir.load("nobody"),
            Err(StorageError::UserNotFound(_))
        ));
    }

    #[test]
    fn test_list_users() {
        let tmp = tempdir().unwrap();
        let dir = JournalDirectory::new(tmp.path()).with_compression(CompressionType::None);
        assert!(dir.list().unwrap().is_empty());

        dir.save(&sample_journal("bo")).unwrap();
        dir.save(&sample_journal("al")).unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "x").unwrap();

        assert_eq!(dir.list().unwrap(), vec!["al".to_string(), "bo".to_string()]);
    }

    #[test]
    fn test_listed_stem_loads_named_journal() {
        let tmp = tempdir().unwrap();
        let dir = JournalDirectory::new(tmp.path());
        dir.save(&sample_journal("Sam Doe")).unwrap();

        let users = dir.list().unwrap();
        assert_eq!(users, vec!["SamDoe".to_string()]);

        let loaded = dir.load(&users[0]).unwrap();
        assert_eq!(loaded.name(), "Sam Doe");
    }
}

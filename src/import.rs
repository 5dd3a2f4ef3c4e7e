//! CSV Import
//!
//! Reads records from CSV files in the export column layout. Rows that fail to
//! parse or validate are collected as errors instead of aborting the import.

use crate::export::{ExportRow, EXPORT_DATE_FORMAT};
use crate::journal::{Journal, Record, TimeSlot, DATE_FORMAT, TIME_FORMAT};
use chrono::{NaiveDate, NaiveTime};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors that abort an import
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a CSV import operation
#[derive(Debug, Default)]
pub struct CsvImportResult {
    pub records: Vec<(NaiveDate, TimeSlot, Record)>,
    pub rows_processed: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

impl CsvImportResult {
    /// Place every imported record into the journal, replacing whatever the
    /// slot held. Returns the number of records written.
    pub fn apply(&self, journal: &mut Journal) -> usize {
        let store = journal.store_mut();
        for (date, slot, record) in &self.records {
            store
                .get_or_insert(*date)
                .set_record(*slot, Some(record.clone()));
        }
        self.records.len()
    }
}

/// CSV importer for exported journal rows
#[derive(Debug, Clone)]
pub struct CsvImporter {
    /// Whether the CSV has a header row
    has_header: bool,
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvImporter {
    pub fn new() -> Self {
        Self { has_header: true }
    }

    /// Set whether the CSV has a header row
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Import records from a CSV file
    pub fn import(&self, path: &Path) -> Result<CsvImportResult, ImportError> {
        let file = std::fs::File::open(path)?;
        let result = self.import_reader(file)?;

        tracing::info!(
            path = %path.display(),
            processed = result.rows_processed,
            failed = result.rows_failed,
            "CSV import finished"
        );

        Ok(result)
    }

    /// Import records from any reader
    pub fn import_reader<R: Read>(&self, reader: R) -> Result<CsvImportResult, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_header)
            .from_reader(reader);

        let mut result = CsvImportResult::default();

        for (line_num, row) in reader.deserialize::<ExportRow>().enumerate() {
            let actual_line = if self.has_header {
                line_num + 2
            } else {
                line_num + 1
            };

            let parsed = row
                .map_err(|e| e.to_string())
                .and_then(|row| parse_row(&row));

            match parsed {
                Ok(entry) => {
                    result.records.push(entry);
                    result.rows_processed += 1;
                }
                Err(e) => {
                    tracing::debug!(line = actual_line, error = %e, "Skipping CSV row");
                    result.errors.push(format!("Line {}: {}", actual_line, e));
                    result.rows_failed += 1;
                }
            }
        }

        Ok(result)
    }
}

fn parse_row(row: &ExportRow) -> Result<(NaiveDate, TimeSlot, Record), String> {
    let date = parse_date(&row.date)?;
    let start = row.activity_start.as_deref().map(parse_time).transpose()?;
    let end = row.activity_end.as_deref().map(parse_time).transpose()?;

    let record = Record::new(
        row.glucose as i64,
        row.meal.as_str(),
        row.carbs as i64,
        row.activity.as_str(),
        start,
        end,
        row.mood.as_str(),
    )
    .map_err(|e| e.to_string())?;

    Ok((date, row.slot, record))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    [EXPORT_DATE_FORMAT, DATE_FORMAT]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("Could not parse date: {}", s))
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    let s = s.trim();
    [TIME_FORMAT, "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("Could not parse time: {}", s))
}

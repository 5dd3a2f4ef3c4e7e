//! Journal Export
//!
//! Flattens a journal into one row per record for backup and analysis.
//! CSV rows use the same columns the importer reads back.

use crate::journal::{Journal, Record, TimeSlot, TIME_FORMAT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date format used in exported rows
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Errors that can occur while exporting
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),
}

/// One exported record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportRow {
    pub date: String,
    pub slot: TimeSlot,
    pub glucose: u32,
    pub meal: String,
    pub carbs: u32,
    pub activity: String,
    pub activity_start: Option<String>,
    pub activity_end: Option<String>,
    pub minutes_active: u32,
    pub mood: String,
}

impl ExportRow {
    pub fn new(date: NaiveDate, slot: TimeSlot, record: &Record) -> Self {
        Self {
            date: date.format(EXPORT_DATE_FORMAT).to_string(),
            slot,
            glucose: record.glucose(),
            meal: record.meal().to_string(),
            carbs: record.carbs(),
            activity: record.activity().to_string(),
            activity_start: record
                .activity_start()
                .map(|t| t.format(TIME_FORMAT).to_string()),
            activity_end: record
                .activity_end()
                .map(|t| t.format(TIME_FORMAT).to_string()),
            minutes_active: record.minutes_active(),
            mood: record.mood().to_string(),
        }
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    name: &'a str,
    exported_at: String,
    days: usize,
    records: Vec<ExportRow>,
}

/// All records in chronological order
pub fn rows(journal: &Journal) -> Vec<ExportRow> {
    journal
        .store()
        .iter()
        .flat_map(|day| {
            day.records()
                .map(move |(slot, record)| ExportRow::new(day.date(), slot, record))
        })
        .collect()
}

/// Render a journal as CSV with a header row
pub fn to_csv(journal: &Journal) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows(journal) {
        writer.serialize(row)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Render a journal as pretty-printed JSON
pub fn to_json(journal: &Journal) -> Result<String, ExportError> {
    let export = JsonExport {
        name: journal.name(),
        exported_at: chrono::Utc::now().to_rfc3339(),
        days: journal.store().len(),
        records: rows(journal),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Render a journal in the given format
pub fn export(journal: &Journal, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => to_csv(journal),
        ExportFormat::Json => to_json(journal),
    }
}

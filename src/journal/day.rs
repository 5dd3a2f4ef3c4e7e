//! Day entries
//!
//! A `Day` holds up to three records, one per time slot, for a single
//! calendar date. The date is fixed when the day is created: the store keys
//! and orders days by it, so there is no way to change it afterwards.

use crate::journal::record::Record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display format for dates, e.g. "03/10/2024"
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// The three parts of a day a record can belong to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    /// Get all slots in chronological order
    pub fn all() -> &'static [TimeSlot] {
        &[TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening]
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeSlot::Morning => write!(f, "morning"),
            TimeSlot::Afternoon => write!(f, "afternoon"),
            TimeSlot::Evening => write!(f, "evening"),
        }
    }
}

impl std::str::FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "am" => Ok(TimeSlot::Morning),
            "afternoon" => Ok(TimeSlot::Afternoon),
            "evening" | "pm" => Ok(TimeSlot::Evening),
            other => Err(format!("Unknown time slot: {}", other)),
        }
    }
}

/// All records for one calendar date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Day {
    date: NaiveDate,
    #[serde(default)]
    morning: Option<Record>,
    #[serde(default)]
    afternoon: Option<Record>,
    #[serde(default)]
    evening: Option<Record>,
}

impl Day {
    /// Create an empty day for a date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            morning: None,
            afternoon: None,
            evening: None,
        }
    }

    /// Builder method: fill a slot
    pub fn with_record(mut self, slot: TimeSlot, record: Record) -> Self {
        self.set_record(slot, Some(record));
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn morning(&self) -> Option<&Record> {
        self.morning.as_ref()
    }

    pub fn set_morning(&mut self, record: Option<Record>) {
        self.morning = record;
    }

    pub fn afternoon(&self) -> Option<&Record> {
        self.afternoon.as_ref()
    }

    pub fn set_afternoon(&mut self, record: Option<Record>) {
        self.afternoon = record;
    }

    pub fn evening(&self) -> Option<&Record> {
        self.evening.as_ref()
    }

    pub fn set_evening(&mut self, record: Option<Record>) {
        self.evening = record;
    }

    /// Get the record in a slot
    pub fn record(&self, slot: TimeSlot) -> Option<&Record> {
        match slot {
            TimeSlot::Morning => self.morning.as_ref(),
            TimeSlot::Afternoon => self.afternoon.as_ref(),
            TimeSlot::Evening => self.evening.as_ref(),
        }
    }

    /// Get mutable access to the record in a slot
    pub fn record_mut(&mut self, slot: TimeSlot) -> Option<&mut Record> {
        self.slot_mut(slot).as_mut()
    }

    /// Replace a slot wholesale (None clears it)
    pub fn set_record(&mut self, slot: TimeSlot, record: Option<Record>) {
        *self.slot_mut(slot) = record;
    }

    /// Remove and return the record in a slot
    pub fn take_record(&mut self, slot: TimeSlot) -> Option<Record> {
        self.slot_mut(slot).take()
    }

    fn slot_mut(&mut self, slot: TimeSlot) -> &mut Option<Record> {
        match slot {
            TimeSlot::Morning => &mut self.morning,
            TimeSlot::Afternoon => &mut self.afternoon,
            TimeSlot::Evening => &mut self.evening,
        }
    }

    /// Iterate over the populated slots in chronological order
    pub fn records(&self) -> impl Iterator<Item = (TimeSlot, &Record)> {
        TimeSlot::all()
            .iter()
            .filter_map(move |&slot| self.record(slot).map(|r| (slot, r)))
    }

    /// Sum of glucose readings across present slots
    pub fn aggregate_glucose(&self) -> u64 {
        self.records().map(|(_, r)| r.glucose() as u64).sum()
    }

    /// Sum of active minutes across present slots
    pub fn aggregate_minutes_active(&self) -> u64 {
        self.records().map(|(_, r)| r.minutes_active() as u64).sum()
    }

    /// Sum of carbs across present slots
    pub fn aggregate_carbs(&self) -> u64 {
        self.records().map(|(_, r)| r.carbs() as u64).sum()
    }

    /// Number of slots where a meal was eaten
    pub fn meals_eaten_count(&self) -> usize {
        self.records().filter(|(_, r)| r.meal_eaten()).count()
    }

    /// Number of populated slots (0..=3)
    pub fn record_count(&self) -> usize {
        self.records().count()
    }

    /// A day with no records is eligible for pruning
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Date: {}", self.date.format(DATE_FORMAT))?;

        for &slot in TimeSlot::all() {
            let label = match slot {
                TimeSlot::Morning => "Morning",
                TimeSlot::Afternoon => "Afternoon",
                TimeSlot::Evening => "Evening",
            };
            write!(f, "\n{} record:\n", label)?;
            match self.record(slot) {
                Some(record) => writeln!(f, "{}", record)?,
                None => writeln!(f, "None")?,
            }
        }

        Ok(())
    }
}

/// Day layout written by the first file format version
///
/// Those files had a morning slot followed by two late-day slots, evening and
/// night. Converting to `Day` shifts them into afternoon and evening.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LegacyDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub morning: Option<Record>,
    #[serde(default)]
    pub evening: Option<Record>,
    #[serde(default)]
    pub night: Option<Record>,
}

impl From<LegacyDay> for Day {
    fn from(legacy: LegacyDay) -> Self {
        Self {
            date: legacy.date,
            morning: legacy.morning,
            afternoon: legacy.evening,
            evening: legacy.night,
        }
    }
}

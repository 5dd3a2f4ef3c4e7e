//! Time-slot records
//!
//! A `Record` is the measurement bundle for one part of a day: a glucose
//! reading, the meal eaten (if any) and its carbs, an optional activity window,
//! and a free-form mood.

use crate::journal::error::ValidationError;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Display format for activity times, e.g. "07:30 AM"
pub const TIME_FORMAT: &str = "%I:%M %p";

/// One time slot's measurements
///
/// Glucose and carbs are never negative, and carbs are zero unless a meal is
/// recorded. The activity window is either fully present (end >= start) or
/// fully absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    glucose: u32,
    meal: String,
    carbs: u32,
    activity: String,
    activity_start: Option<NaiveTime>,
    activity_end: Option<NaiveTime>,
    mood: String,
}

impl Record {
    /// Create a fully-formed record, validating every guarded field
    pub fn new(
        glucose: i64,
        meal: impl Into<String>,
        carbs: i64,
        activity: impl Into<String>,
        activity_start: Option<NaiveTime>,
        activity_end: Option<NaiveTime>,
        mood: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let glucose = check_glucose(glucose)?;
        let carbs = check_carbs(carbs)?;
        let meal = meal.into();
        check_meal_carbs(&meal, carbs)?;
        check_window(activity_start, activity_end)?;

        Ok(Self {
            glucose,
            meal,
            carbs,
            activity: activity.into(),
            activity_start,
            activity_end,
            mood: mood.into(),
        })
    }

    /// Start building a record field by field
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    pub fn glucose(&self) -> u32 {
        self.glucose
    }

    /// Set the glucose reading; negative values are rejected
    pub fn set_glucose(&mut self, value: i64) -> Result<(), ValidationError> {
        self.glucose = check_glucose(value)?;
        Ok(())
    }

    pub fn meal(&self) -> &str {
        &self.meal
    }

    /// Set the meal; clearing it also clears the carbs
    pub fn set_meal(&mut self, meal: impl Into<String>) {
        self.meal = meal.into();
        if self.meal.is_empty() {
            self.carbs = 0;
        }
    }

    pub fn carbs(&self) -> u32 {
        self.carbs
    }

    /// Set the carb count; negative values and carbs without a meal are
    /// rejected
    pub fn set_carbs(&mut self, value: i64) -> Result<(), ValidationError> {
        let carbs = check_carbs(value)?;
        check_meal_carbs(&self.meal, carbs)?;
        self.carbs = carbs;
        Ok(())
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    pub fn activity_start(&self) -> Option<NaiveTime> {
        self.activity_start
    }

    pub fn activity_end(&self) -> Option<NaiveTime> {
        self.activity_end
    }

    /// Replace the activity description and its time window together
    pub fn set_activity(
        &mut self,
        activity: impl Into<String>,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> Result<(), ValidationError> {
        check_window(start, end)?;
        self.activity = activity.into();
        self.activity_start = start;
        self.activity_end = end;
        Ok(())
    }

    pub fn mood(&self) -> &str {
        &self.mood
    }

    pub fn set_mood(&mut self, mood: impl Into<String>) {
        self.mood = mood.into();
    }

    /// True if a meal was recorded for this slot
    pub fn meal_eaten(&self) -> bool {
        !self.meal.is_empty()
    }

    /// Minutes spent on the activity, 0 when there is no activity or a time
    /// is missing
    pub fn minutes_active(&self) -> u32 {
        if self.activity.is_empty() {
            return 0;
        }

        match (self.activity_start, self.activity_end) {
            (Some(start), Some(end)) => (end - start).num_minutes().max(0) as u32,
            _ => 0,
        }
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Glucose: {}", self.glucose)?;
        writeln!(f, "Meal: {}", self.meal)?;
        writeln!(f, "Carbs: {}", self.carbs)?;
        writeln!(f, "Activity: {}", self.activity)?;

        match (self.activity_start, self.activity_end) {
            (Some(start), Some(end)) => {
                writeln!(f, "Activity start time: {}", start.format(TIME_FORMAT))?;
                writeln!(f, "Activity end time: {}", end.format(TIME_FORMAT))?;
            }
            _ => {
                writeln!(f, "Activity start time: N/A")?;
                writeln!(f, "Activity end time: N/A")?;
            }
        }

        write!(f, "Mood: {}", self.mood)
    }
}

/// Builder for records collected from a front end one field at a time
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    glucose: i64,
    meal: String,
    carbs: i64,
    activity: String,
    activity_start: Option<NaiveTime>,
    activity_end: Option<NaiveTime>,
    mood: String,
}

impl RecordBuilder {
    pub fn glucose(mut self, glucose: i64) -> Self {
        self.glucose = glucose;
        self
    }

    /// Set the meal and the carbs eaten with it
    pub fn meal(mut self, meal: impl Into<String>, carbs: i64) -> Self {
        self.meal = meal.into();
        self.carbs = carbs;
        self
    }

    pub fn activity(
        mut self,
        activity: impl Into<String>,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> Self {
        self.activity = activity.into();
        self.activity_start = start;
        self.activity_end = end;
        self
    }

    pub fn mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = mood.into();
        self
    }

    /// Validate and produce the record
    pub fn build(self) -> Result<Record, ValidationError> {
        Record::new(
            self.glucose,
            self.meal,
            self.carbs,
            self.activity,
            self.activity_start,
            self.activity_end,
            self.mood,
        )
    }
}

/// A partial change to an existing record
///
/// Fields left as `None` keep their current value. Meal, carbs and the
/// activity window are applied together so a new meal can carry its carbs and
/// a new activity its times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordEdit {
    pub glucose: Option<i64>,
    pub meal: Option<String>,
    pub carbs: Option<i64>,
    pub activity: Option<String>,
    pub activity_start: Option<NaiveTime>,
    pub activity_end: Option<NaiveTime>,
    pub mood: Option<String>,
}

impl RecordEdit {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the edit, leaving the record untouched if any field is rejected.
    /// Returns false when the result equals the original record.
    pub fn apply(&self, record: &mut Record) -> Result<bool, ValidationError> {
        let mut edited = record.clone();

        if let Some(glucose) = self.glucose {
            edited.set_glucose(glucose)?;
        }
        if let Some(meal) = &self.meal {
            edited.set_meal(meal.as_str());
        }
        if let Some(carbs) = self.carbs {
            edited.set_carbs(carbs)?;
        }

        let window_given = self.activity_start.is_some() || self.activity_end.is_some();
        if self.activity.is_some() || window_given {
            let activity = self.activity.as_deref().unwrap_or(record.activity());
            let (start, end) = if activity.is_empty() {
                (None, None)
            } else if window_given {
                (self.activity_start, self.activity_end)
            } else {
                (record.activity_start, record.activity_end)
            };
            edited.set_activity(activity, start, end)?;
        }

        if let Some(mood) = &self.mood {
            edited.set_mood(mood.as_str());
        }

        if edited == *record {
            return Ok(false);
        }
        *record = edited;
        Ok(true)
    }
}

fn check_glucose(value: i64) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeGlucose(value));
    }
    u32::try_from(value).map_err(|_| ValidationError::GlucoseOutOfRange(value))
}

fn check_carbs(value: i64) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeCarbs(value));
    }
    u32::try_from(value).map_err(|_| ValidationError::CarbsOutOfRange(value))
}

fn check_meal_carbs(meal: &str, carbs: u32) -> Result<(), ValidationError> {
    if meal.is_empty() && carbs > 0 {
        return Err(ValidationError::CarbsWithoutMeal(carbs));
    }
    Ok(())
}

fn check_window(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Result<(), ValidationError> {
    match (start, end) {
        (None, None) => Ok(()),
        (Some(start), Some(end)) if end < start => Err(ValidationError::ActivityEndsBeforeStart {
            start: start.format(TIME_FORMAT).to_string(),
            end: end.format(TIME_FORMAT).to_string(),
        }),
        (Some(_), Some(_)) => Ok(()),
        _ => Err(ValidationError::IncompleteActivityWindow),
    }
}

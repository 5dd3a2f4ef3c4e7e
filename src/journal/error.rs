//! Journal error types
//!
//! Errors raised by the in-memory journal: field validation on records and
//! structural checks on the chronological store.

use thiserror::Error;

/// A field value was rejected at the record boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Glucose readings may not be below zero
    #[error("Glucose must be nonnegative, got {0}")]
    NegativeGlucose(i64),

    /// Glucose reading does not fit the stored range
    #[error("Glucose reading {0} is out of range")]
    GlucoseOutOfRange(i64),

    /// Carb counts may not be below zero
    #[error("Carbs must be nonnegative, got {0}")]
    NegativeCarbs(i64),

    /// Carb count does not fit the stored range
    #[error("Carb count {0} is out of range")]
    CarbsOutOfRange(i64),

    /// Carbs were given for a slot with no meal
    #[error("Carbs ({0}) require a meal")]
    CarbsWithoutMeal(u32),

    /// Only one of the activity start/end times was provided
    #[error("Activity start and end times must both be set or both be empty")]
    IncompleteActivityWindow,

    /// Activity ended before it started
    #[error("Activity end time {end} is before start time {start}")]
    ActivityEndsBeforeStart { start: String, end: String },
}

/// Errors that can occur in the journal layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JournalError {
    /// A record field failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The day chain is inconsistent (dangling link, order violation, ...)
    #[error("Structural invariant violated: {0}")]
    StructuralInvariantViolation(String),
}

/// Result type alias for journal operations
pub type JournalResult<T> = Result<T, JournalError>;

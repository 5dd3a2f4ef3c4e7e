//! Qualitative ratings
//!
//! Pure threshold functions turning the rolling averages into labels.

use serde::{Deserialize, Serialize};

/// Glucose below this is low
pub const GLUCOSE_LOW: f64 = 80.0;
/// Glucose at or above this is very high
pub const GLUCOSE_HIGH: f64 = 140.0;

/// Daily activity below this many minutes is too low
pub const ACTIVITY_LOW: f64 = 30.0;
/// Daily activity at or above this many minutes is excellent
pub const ACTIVITY_HIGH: f64 = 60.0;

/// Carbs per meal below this are low
pub const CARBS_LOW: f64 = 15.0;
/// Carbs per meal below this (and at least `CARBS_LOW`) are ideal
pub const CARBS_MID: f64 = 30.0;
/// Carbs per meal at or above this are too high
pub const CARBS_HIGH: f64 = 45.0;

/// A qualitative rating for one statistic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Rating {
    #[serde(rename = "Excellent")]
    Excellent,
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Okay")]
    Okay,
    #[serde(rename = "Poor")]
    Poor,
    #[serde(rename = "Poor (low)")]
    PoorLow,
    #[serde(rename = "Poor (high)")]
    PoorHigh,
    #[serde(rename = "Awful (very high)")]
    AwfulVeryHigh,
}

impl Rating {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::Okay => "Okay",
            Rating::Poor => "Poor",
            Rating::PoorLow => "Poor (low)",
            Rating::PoorHigh => "Poor (high)",
            Rating::AwfulVeryHigh => "Awful (very high)",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Rate an average glucose reading
///
/// The in-range check runs before the low/high checks.
pub fn rate_glucose(value: f64) -> Rating {
    if (GLUCOSE_LOW..GLUCOSE_HIGH).contains(&value) {
        Rating::Excellent
    } else if value < GLUCOSE_LOW {
        Rating::PoorLow
    } else if value < GLUCOSE_HIGH {
        Rating::PoorHigh
    } else {
        Rating::AwfulVeryHigh
    }
}

/// Rate average active minutes per day
pub fn rate_minutes_active(value: f64) -> Rating {
    if value < ACTIVITY_LOW {
        Rating::PoorLow
    } else if value < ACTIVITY_HIGH {
        Rating::Good
    } else {
        Rating::Excellent
    }
}

/// Rate average carbs per meal
pub fn rate_carbs_per_meal(value: f64) -> Rating {
    if (CARBS_LOW..CARBS_MID).contains(&value) {
        Rating::Excellent
    } else if value < CARBS_LOW {
        Rating::PoorLow
    } else if (CARBS_MID..CARBS_HIGH).contains(&value) {
        Rating::Okay
    } else {
        Rating::PoorHigh
    }
}

/// Rate average meals missed per day
pub fn rate_meals_missed(value: f64) -> Rating {
    if value == 0.0 {
        Rating::Excellent
    } else if value <= 1.0 {
        Rating::Okay
    } else {
        Rating::Poor
    }
}

//! Rolling statistics
//!
//! Averages over a window of the most recent days, walking the store backward
//! from its latest day. A window of `days_back = 0` covers only the latest
//! day; the walk stops early at the earliest day.
//!
//! - **rating**: threshold functions classifying each average

pub mod rating;

pub use rating::{
    rate_carbs_per_meal, rate_glucose, rate_meals_missed, rate_minutes_active, Rating,
};

use crate::journal::ChronologicalStore;
use serde::Serialize;

/// Expected number of meals per day
pub const MEALS_PER_DAY: u32 = 3;

/// Sums collected over one backward walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowTotals {
    pub days: usize,
    pub records: usize,
    pub glucose: u64,
    pub minutes_active: u64,
    pub carbs: u64,
    pub meals_eaten: usize,
}

/// Statistics over one store
#[derive(Debug, Clone, Copy)]
pub struct Statistics<'a> {
    store: &'a ChronologicalStore,
}

impl<'a> Statistics<'a> {
    pub fn new(store: &'a ChronologicalStore) -> Self {
        Self { store }
    }

    /// Walk the window once and sum every day-level aggregate
    pub fn totals(&self, days_back: usize) -> WindowTotals {
        self.store
            .walk_back(days_back)
            .fold(WindowTotals::default(), |mut acc, day| {
                acc.days += 1;
                acc.records += day.record_count();
                acc.glucose += day.aggregate_glucose();
                acc.minutes_active += day.aggregate_minutes_active();
                acc.carbs += day.aggregate_carbs();
                acc.meals_eaten += day.meals_eaten_count();
                acc
            })
    }

    /// Mean glucose per record, 0 if the window has no records
    pub fn average_glucose(&self, days_back: usize) -> f64 {
        self.totals(days_back).average_glucose()
    }

    /// Mean active minutes per visited day, 0 if no days were visited
    pub fn average_minutes_active(&self, days_back: usize) -> f64 {
        self.totals(days_back).average_minutes_active()
    }

    /// Mean carbs per meal eaten, 0 if no meals were eaten
    pub fn average_carbs_per_meal(&self, days_back: usize) -> f64 {
        self.totals(days_back).average_carbs_per_meal()
    }

    /// Mean meals missed per day
    ///
    /// The share of records without a meal, scaled to `MEALS_PER_DAY`. With
    /// no records at all every meal counts as missed.
    pub fn average_meals_missed(&self, days_back: usize) -> f64 {
        self.totals(days_back).average_meals_missed()
    }

    /// All four averages with their ratings, from one walk of the window
    pub fn summary(&self, days_back: usize) -> StatsSummary {
        let totals = self.totals(days_back);
        let glucose = totals.average_glucose();
        let minutes_active = totals.average_minutes_active();
        let carbs_per_meal = totals.average_carbs_per_meal();
        let meals_missed = totals.average_meals_missed();

        StatsSummary {
            days_back,
            days_visited: totals.days,
            glucose: RatedValue::new(glucose, rate_glucose(glucose)),
            minutes_active: RatedValue::new(minutes_active, rate_minutes_active(minutes_active)),
            carbs_per_meal: RatedValue::new(carbs_per_meal, rate_carbs_per_meal(carbs_per_meal)),
            meals_missed: RatedValue::new(meals_missed, rate_meals_missed(meals_missed)),
        }
    }
}

impl WindowTotals {
    pub fn average_glucose(&self) -> f64 {
        if self.records == 0 {
            return 0.0;
        }
        self.glucose as f64 / self.records as f64
    }

    pub fn average_minutes_active(&self) -> f64 {
        if self.days == 0 {
            return 0.0;
        }
        self.minutes_active as f64 / self.days as f64
    }

    pub fn average_carbs_per_meal(&self) -> f64 {
        if self.meals_eaten == 0 {
            return 0.0;
        }
        self.carbs as f64 / self.meals_eaten as f64
    }

    pub fn average_meals_missed(&self) -> f64 {
        if self.records == 0 {
            return MEALS_PER_DAY as f64;
        }
        MEALS_PER_DAY as f64 * (1.0 - self.meals_eaten as f64 / self.records as f64)
    }
}

/// An average paired with its rating
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct RatedValue {
    pub value: f64,
    pub rating: Rating,
}

impl RatedValue {
    fn new(value: f64, rating: Rating) -> Self {
        Self { value, rating }
    }
}

/// Report of all rolling averages for one window
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatsSummary {
    pub days_back: usize,
    pub days_visited: usize,
    pub glucose: RatedValue,
    pub minutes_active: RatedValue,
    pub carbs_per_meal: RatedValue,
    pub meals_missed: RatedValue,
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Glucose:      {:>9.1}      Rating: {}",
            self.glucose.value, self.glucose.rating
        )?;
        writeln!(
            f,
            "Activity:     {:>5.1} min    Rating: {}",
            self.minutes_active.value, self.minutes_active.rating
        )?;
        writeln!(
            f,
            "Carbs/meal:   {:>9.1}      Rating: {}",
            self.carbs_per_meal.value, self.carbs_per_meal.rating
        )?;
        write!(
            f,
            "Meals missed: {:>9.2}      Rating: {}",
            self.meals_missed.value, self.meals_missed.rating
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{Day, Record, TimeSlot};
    use chrono::{NaiveDate, NaiveTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_single_record_glucose() {
        let store: ChronologicalStore = std::iter::once(Day::new(date(2024, 1, 1)).with_record(
            TimeSlot::Morning,
            Record::builder().glucose(100).build().unwrap(),
        ))
        .collect();

        let stats = Statistics::new(&store);
        assert_eq!(stats.average_glucose(0), 100.0);
        assert_eq!(rate_glucose(stats.average_glucose(0)), Rating::Excellent);
    }

    #[test]
    fn test_empty_store() {
        let store = ChronologicalStore::new();
        let stats = Statistics::new(&store);

        assert_eq!(stats.average_glucose(0), 0.0);
        assert_eq!(stats.average_minutes_active(7), 0.0);
        assert_eq!(stats.average_carbs_per_meal(7), 0.0);
        assert_eq!(stats.average_meals_missed(0), 3.0);
        assert_eq!(rate_meals_missed(stats.average_meals_missed(0)), Rating::Poor);
    }

    #[test]
    fn test_carbs_per_meal_counts_meals_not_days() {
        let mut store = ChronologicalStore::new();
        store.insert(Day::new(date(2024, 1, 1)).with_record(
            TimeSlot::Morning,
            Record::builder().glucose(90).meal("eggs", 20).build().unwrap(),
        ));
        store.insert(Day::new(date(2024, 1, 2)).with_record(
            TimeSlot::Evening,
            Record::builder().glucose(110).build().unwrap(),
        ));

        let stats = Statistics::new(&store);
        assert_eq!(stats.average_carbs_per_meal(1), 20.0);
    }

    #[test]
    fn test_window_totals_averages() {
        let totals = WindowTotals {
            days: 2,
            records: 4,
            glucose: 440,
            minutes_active: 90,
            carbs: 60,
            meals_eaten: 3,
        };

        assert_eq!(totals.average_glucose(), 110.0);
        assert_eq!(totals.average_minutes_active(), 45.0);
        assert_eq!(totals.average_carbs_per_meal(), 20.0);
        assert!((totals.average_meals_missed() - 0.75).abs() < 1e-9);

        assert_eq!(WindowTotals::default().average_meals_missed(), 3.0);
        assert_eq!(WindowTotals::default().average_glucose(), 0.0);
    }

    #[test]
    fn test_window_limits() {
        let mut store = ChronologicalStore::new();
        for (d, glucose) in [(1, 200), (2, 100), (3, 120)] {
            store.insert(Day::new(date(2024, 1, d)).with_record(
                TimeSlot::Morning,
                Record::builder().glucose(glucose).build().unwrap(),
            ));
        }

        let stats = Statistics::new(&store);
        assert_eq!(stats.average_glucose(0), 120.0);
        assert_eq!(stats.average_glucose(1), 110.0);
        assert_eq!(stats.average_glucose(2), 140.0);
        // Window larger than the store stops at the earliest day
        assert_eq!(stats.average_glucose(30), 140.0);
        assert_eq!(stats.totals(30).days, 3);
    }

    #[test]
    fn test_minutes_active_per_day() {
        let walk = Record::builder()
            .glucose(100)
            .activity("walk", Some(time(9, 0)), Some(time(10, 30)))
            .build()
            .unwrap();

        let mut store = ChronologicalStore::new();
        store.insert(Day::new(date(2024, 1, 1)).with_record(TimeSlot::Morning, walk));
        store.insert(Day::new(date(2024, 1, 2)).with_record(
            TimeSlot::Morning,
            Record::builder().glucose(100).build().unwrap(),
        ));

        let stats = Statistics::new(&store);
        assert_eq!(stats.average_minutes_active(0), 0.0);
        assert_eq!(stats.average_minutes_active(1), 45.0);
        assert_eq!(rate_minutes_active(45.0), Rating::Good);
    }

    #[test]
    fn test_meals_missed() {
        let day = Day::new(date(2024, 1, 1))
            .with_record(
                TimeSlot::Morning,
                Record::builder().meal("toast", 20).build().unwrap(),
            )
            .with_record(
                TimeSlot::Afternoon,
                Record::builder().meal("soup", 25).build().unwrap(),
            )
            .with_record(TimeSlot::Evening, Record::builder().build().unwrap());
        let store: ChronologicalStore = std::iter::once(day).collect();

        let stats = Statistics::new(&store);
        assert!((stats.average_meals_missed(0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary() {
        let day = Day::new(date(2024, 1, 1)).with_record(
            TimeSlot::Morning,
            Record::builder().glucose(100).meal("eggs", 20).build().unwrap(),
        );
        let store: ChronologicalStore = std::iter::once(day).collect();

        let summary = Statistics::new(&store).summary(6);
        assert_eq!(summary.days_visited, 1);
        assert_eq!(summary.glucose.rating, Rating::Excellent);
        assert_eq!(summary.carbs_per_meal.rating, Rating::Excellent);
        assert_eq!(summary.meals_missed.rating, Rating::Excellent);
        assert_eq!(summary.minutes_active.rating, Rating::PoorLow);

        let stats = Statistics::new(&store);
        assert_eq!(summary.glucose.value, stats.average_glucose(6));
        assert_eq!(summary.carbs_per_meal.value, stats.average_carbs_per_meal(6));
        assert_eq!(summary.meals_missed.value, stats.average_meals_missed(6));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["glucose"]["rating"], "Excellent");
        assert!(summary.to_string().contains("Rating: Excellent"));
    }
}

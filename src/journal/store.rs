//! Chronological day store
//!
//! Days live in an arena and are chained in date order through `prev`/`next`
//! indices, giving the same traversal shape as a doubly-linked list without
//! shared mutable references. A `BTreeMap` from date to arena slot answers
//! membership and lookup in O(log n).
//!
//! ```text
//!   head                                tail
//!    │                                    │
//!    ▼                                    ▼
//! [01-05] ⇄ [02-01] ⇄ [02-14] ⇄ ... ⇄ [03-10]
//! ```
//!
//! Invariants:
//! - dates strictly increase from head to tail (no duplicates)
//! - every live node is reachable from head and appears in the date index
//! - freed slots are recycled through the free list

use crate::journal::day::Day;
use crate::journal::error::{JournalError, JournalResult};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Node {
    day: Day,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Date-ordered sequence of days for one journal
#[derive(Debug, Clone, Default)]
pub struct ChronologicalStore {
    /// Arena of nodes; `None` marks a freed slot
    nodes: Vec<Option<Node>>,
    /// Freed slots available for reuse
    free: Vec<usize>,
    /// Date to arena slot lookup
    index: BTreeMap<NaiveDate, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl ChronologicalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of days in the store
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Earliest day
    pub fn head(&self) -> Option<&Day> {
        self.head.map(|idx| &self.node(idx).day)
    }

    /// Latest day
    pub fn tail(&self) -> Option<&Day> {
        self.tail.map(|idx| &self.node(idx).day)
    }

    /// Check whether a day exists for a date
    ///
    /// Dates outside the head..=tail range are rejected without a lookup.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.head(), self.tail()) {
            (Some(head), Some(tail)) => {
                if date < head.date() || date > tail.date() {
                    return false;
                }
                self.index.contains_key(&date)
            }
            _ => false,
        }
    }

    /// Insert a day at its chronological position
    ///
    /// Returns false, leaving the store untouched, if a day with the same date
    /// is already present. Callers then use [`find`](Self::find) to reach the
    /// existing day.
    pub fn insert(&mut self, day: Day) -> bool {
        match self.insert_node(day) {
            Ok(_) => true,
            Err(existing) => {
                tracing::debug!(
                    date = %self.node(existing).day.date(),
                    "Day already present, insert rejected"
                );
                false
            }
        }
    }

    /// Link a new node, or return the slot of the day already holding its date
    fn insert_node(&mut self, day: Day) -> Result<usize, usize> {
        let date = day.date();
        if self.contains(date) {
            return Err(self.index[&date]);
        }

        let idx = self.alloc(day);

        match (self.head, self.tail) {
            (Some(head), Some(tail)) => {
                if date < self.node(head).day.date() {
                    // Prepend
                    self.node_mut(idx).next = Some(head);
                    self.node_mut(head).prev = Some(idx);
                    self.head = Some(idx);
                } else if date > self.node(tail).day.date() {
                    // Append
                    self.node_mut(idx).prev = Some(tail);
                    self.node_mut(tail).next = Some(idx);
                    self.tail = Some(idx);
                } else {
                    // Walk back from the tail to the last day before `date`
                    let mut current = tail;
                    while date < self.node(current).day.date() {
                        match self.node(current).prev {
                            Some(prev) => current = prev,
                            None => break,
                        }
                    }

                    let next = self.node(current).next;
                    self.node_mut(idx).prev = Some(current);
                    self.node_mut(idx).next = next;
                    self.node_mut(current).next = Some(idx);
                    if let Some(next) = next {
                        self.node_mut(next).prev = Some(idx);
                    }
                }
            }
            _ => {
                self.head = Some(idx);
                self.tail = Some(idx);
            }
        }

        self.index.insert(date, idx);
        Ok(idx)
    }

    /// Find the day for a date
    pub fn find(&self, date: NaiveDate) -> Option<&Day> {
        self.index.get(&date).map(|&idx| &self.node(idx).day)
    }

    /// Find the day for a date, mutably
    ///
    /// The date itself cannot be changed through the returned reference.
    pub fn find_mut(&mut self, date: NaiveDate) -> Option<&mut Day> {
        let idx = *self.index.get(&date)?;
        Some(&mut self.node_mut(idx).day)
    }

    /// Get the day for a date, inserting an empty one if it does not exist
    pub fn get_or_insert(&mut self, date: NaiveDate) -> &mut Day {
        let idx = match self.insert_node(Day::new(date)) {
            Ok(idx) | Err(idx) => idx,
        };
        &mut self.node_mut(idx).day
    }

    /// Day immediately before `date` in the chain
    pub fn previous(&self, date: NaiveDate) -> Option<&Day> {
        let idx = *self.index.get(&date)?;
        self.node(idx).prev.map(|prev| &self.node(prev).day)
    }

    /// Day immediately after `date` in the chain
    pub fn next(&self, date: NaiveDate) -> Option<&Day> {
        let idx = *self.index.get(&date)?;
        self.node(idx).next.map(|next| &self.node(next).day)
    }

    /// Remove every day with no records
    ///
    /// Trims the head, then the tail, then sweeps the interior once. Returns
    /// the number of days removed; a second call removes nothing.
    pub fn prune_empty(&mut self) -> usize {
        let mut removed = 0;

        while let Some(head) = self.head {
            if !self.node(head).day.is_empty() {
                break;
            }
            self.unlink(head);
            removed += 1;
        }

        while let Some(tail) = self.tail {
            if !self.node(tail).day.is_empty() {
                break;
            }
            self.unlink(tail);
            removed += 1;
        }

        let mut cursor = self.head.and_then(|head| self.node(head).next);
        while let Some(idx) = cursor {
            if Some(idx) == self.tail {
                break;
            }
            cursor = self.node(idx).next;
            if self.node(idx).day.is_empty() {
                self.unlink(idx);
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::debug!(removed, remaining = self.len(), "Pruned empty days");
        }

        removed
    }

    /// Iterate from the latest day backwards over at most `max_days + 1` days
    pub fn walk_back(&self, max_days: usize) -> WalkBack<'_> {
        WalkBack {
            store: self,
            cursor: self.tail,
            remaining: max_days.saturating_add(1),
        }
    }

    /// Iterate backwards from the day at `anchor` over at most `max_days + 1`
    /// days. Yields nothing if there is no day at `anchor`.
    pub fn walk_back_from(&self, anchor: NaiveDate, max_days: usize) -> WalkBack<'_> {
        WalkBack {
            store: self,
            cursor: self.index.get(&anchor).copied(),
            remaining: max_days.saturating_add(1),
        }
    }

    /// Iterate over all days from earliest to latest
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            store: self,
            cursor: self.head,
        }
    }

    /// Check link integrity and ordering of the whole chain
    pub fn verify_links(&self) -> JournalResult<()> {
        let violation = |msg: String| Err(JournalError::StructuralInvariantViolation(msg));

        let Some(head) = self.head else {
            if self.tail.is_some() || !self.index.is_empty() {
                return violation("store has no head but is not empty".to_string());
            }
            return Ok(());
        };

        if self.node(head).prev.is_some() {
            return violation("head has a previous day".to_string());
        }

        let mut visited = 0usize;
        let mut prev: Option<usize> = None;
        let mut cursor = Some(head);

        while let Some(idx) = cursor {
            let Some(node) = self.nodes.get(idx).and_then(Option::as_ref) else {
                return violation(format!("link to freed slot {}", idx));
            };

            if node.prev != prev {
                return violation(format!(
                    "day {} has a previous link that does not point back",
                    node.day.date()
                ));
            }

            if let Some(p) = prev {
                if self.node(p).day.date() >= node.day.date() {
                    return violation(format!(
                        "day {} does not come after {}",
                        node.day.date(),
                        self.node(p).day.date()
                    ));
                }
            }

            if self.index.get(&node.day.date()) != Some(&idx) {
                return violation(format!("day {} missing from date index", node.day.date()));
            }

            visited += 1;
            if visited > self.index.len() {
                return violation("chain is longer than the date index (cycle?)".to_string());
            }

            prev = Some(idx);
            cursor = node.next;
        }

        if prev != self.tail {
            return violation("chain does not end at the tail".to_string());
        }

        if visited != self.index.len() {
            return violation(format!(
                "{} days reachable but {} indexed",
                visited,
                self.index.len()
            ));
        }

        Ok(())
    }

    fn alloc(&mut self, day: Day) -> usize {
        let node = Node {
            day,
            prev: None,
            next: None,
        };

        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    /// Detach a node from the chain and free its slot
    fn unlink(&mut self, idx: usize) -> Day {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };

        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }

        let node = match self.nodes[idx].take() {
            Some(node) => node,
            None => unreachable!("unlink of freed slot {}", idx),
        };
        self.index.remove(&node.day.date());
        self.free.push(idx);
        node.day
    }

    fn node(&self, idx: usize) -> &Node {
        match &self.nodes[idx] {
            Some(node) => node,
            None => unreachable!("link to freed slot {}", idx),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node {
        match &mut self.nodes[idx] {
            Some(node) => node,
            None => unreachable!("link to freed slot {}", idx),
        }
    }
}

impl FromIterator<Day> for ChronologicalStore {
    /// Build a store from days in any order; repeated dates keep the first day
    fn from_iter<I: IntoIterator<Item = Day>>(iter: I) -> Self {
        let mut store = Self::new();
        for day in iter {
            store.insert(day);
        }
        store
    }
}

impl<'a> IntoIterator for &'a ChronologicalStore {
    type Item = &'a Day;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Backward traversal over a bounded number of days
pub struct WalkBack<'a> {
    store: &'a ChronologicalStore,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for WalkBack<'a> {
    type Item = &'a Day;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.store.node(self.cursor?);
        self.cursor = node.prev;
        self.remaining -= 1;
        Some(&node.day)
    }
}

/// Forward traversal from head to tail
pub struct Iter<'a> {
    store: &'a ChronologicalStore,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Day;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.store.node(self.cursor?);
        self.cursor = node.next;
        Some(&node.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::day::TimeSlot;
    use crate::journal::record::Record;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled(d: NaiveDate, glucose: i64) -> Day {
        Day::new(d).with_record(
            TimeSlot::Morning,
            Record::builder().glucose(glucose).build().unwrap(),
        )
    }

    fn dates(store: &ChronologicalStore) -> Vec<NaiveDate> {
        store.iter().map(Day::date).collect()
    }

    #[test]
    fn test_empty_store() {
        let store = ChronologicalStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.head().is_none());
        assert!(store.tail().is_none());
        assert!(!store.contains(date(2024, 1, 1)));
        assert_eq!(store.walk_back(10).count(), 0);
        store.verify_links().unwrap();
    }

    #[test]
    fn test_out_of_order_insert() {
        let mut store = ChronologicalStore::new();
        assert!(store.insert(filled(date(2024, 3, 10), 100)));
        assert!(store.insert(filled(date(2024, 1, 5), 100)));
        assert!(store.insert(filled(date(2024, 2, 1), 100)));

        assert_eq!(
            dates(&store),
            vec![date(2024, 1, 5), date(2024, 2, 1), date(2024, 3, 10)]
        );
        assert_eq!(store.head().unwrap().date(), date(2024, 1, 5));
        assert_eq!(store.tail().unwrap().date(), date(2024, 3, 10));
        store.verify_links().unwrap();
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut store = ChronologicalStore::new();
        let days = [17u32, 3, 25, 9, 1, 28, 14, 22, 6, 11];
        for d in days {
            assert!(store.insert(Day::new(date(2024, 4, d))));
            store.verify_links().unwrap();
        }

        let all = dates(&store);
        assert_eq!(all.len(), days.len());
        assert!(all.windows(2).all(|w| w[0] < w[1]));

        let back: Vec<_> = store.walk_back(usize::MAX).map(Day::date).collect();
        let mut forward = all.clone();
        forward.reverse();
        assert_eq!(back, forward);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut store = ChronologicalStore::new();
        store.insert(filled(date(2024, 1, 5), 100));
        store.insert(filled(date(2024, 1, 7), 120));
        let before: Vec<Day> = store.iter().cloned().collect();

        assert!(!store.insert(filled(date(2024, 1, 5), 999)));
        assert!(!store.insert(Day::new(date(2024, 1, 7))));

        let after: Vec<Day> = store.iter().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(store.find(date(2024, 1, 5)).unwrap().aggregate_glucose(), 100);
        store.verify_links().unwrap();
    }

    #[test]
    fn test_contains_and_find() {
        let mut store = ChronologicalStore::new();
        store.insert(Day::new(date(2024, 1, 5)));
        store.insert(Day::new(date(2024, 1, 9)));

        assert!(store.contains(date(2024, 1, 5)));
        assert!(store.contains(date(2024, 1, 9)));
        assert!(!store.contains(date(2024, 1, 7)));
        assert!(!store.contains(date(2023, 12, 31)));
        assert!(!store.contains(date(2024, 2, 1)));

        assert!(store.find(date(2024, 1, 7)).is_none());
        store
            .find_mut(date(2024, 1, 9))
            .unwrap()
            .set_evening(Some(Record::builder().glucose(130).build().unwrap()));
        assert_eq!(store.find(date(2024, 1, 9)).unwrap().record_count(), 1);
    }

    #[test]
    fn test_get_or_insert() {
        let mut store = ChronologicalStore::new();
        store.insert(filled(date(2024, 1, 5), 100));

        let day = store.get_or_insert(date(2024, 1, 5));
        assert_eq!(day.aggregate_glucose(), 100);

        let day = store.get_or_insert(date(2024, 1, 3));
        assert!(day.is_empty());
        day.set_afternoon(Some(Record::builder().glucose(90).build().unwrap()));

        assert_eq!(store.len(), 2);
        assert_eq!(store.head().unwrap().date(), date(2024, 1, 3));
        store.verify_links().unwrap();
    }

    #[test]
    fn test_neighbors() {
        let store: ChronologicalStore = [1u32, 5, 9]
            .iter()
            .map(|&d| Day::new(date(2024, 5, d)))
            .collect();

        assert!(store.previous(date(2024, 5, 1)).is_none());
        assert_eq!(store.next(date(2024, 5, 1)).unwrap().date(), date(2024, 5, 5));
        assert_eq!(store.previous(date(2024, 5, 9)).unwrap().date(), date(2024, 5, 5));
        assert!(store.next(date(2024, 5, 9)).is_none());
        assert!(store.next(date(2024, 5, 4)).is_none());
    }

    #[test]
    fn test_prune_empty() {
        let mut store = ChronologicalStore::new();
        store.insert(Day::new(date(2024, 1, 1)));
        store.insert(Day::new(date(2024, 1, 2)));
        store.insert(filled(date(2024, 1, 3), 100));
        store.insert(Day::new(date(2024, 1, 4)));
        store.insert(filled(date(2024, 1, 5), 110));
        store.insert(Day::new(date(2024, 1, 6)));
        store.insert(Day::new(date(2024, 1, 7)));
        store.insert(filled(date(2024, 1, 8), 120));
        store.insert(Day::new(date(2024, 1, 9)));

        assert_eq!(store.prune_empty(), 6);
        assert_eq!(
            dates(&store),
            vec![date(2024, 1, 3), date(2024, 1, 5), date(2024, 1, 8)]
        );
        assert!(store.iter().all(|d| d.record_count() >= 1));
        assert!(!store.contains(date(2024, 1, 4)));
        store.verify_links().unwrap();

        let snapshot: Vec<Day> = store.iter().cloned().collect();
        assert_eq!(store.prune_empty(), 0);
        assert_eq!(store.iter().cloned().collect::<Vec<_>>(), snapshot);
    }

    #[test]
    fn test_prune_all_empty() {
        let mut store = ChronologicalStore::new();
        store.insert(Day::new(date(2024, 1, 1)));
        assert_eq!(store.prune_empty(), 1);
        assert!(store.is_empty());
        store.verify_links().unwrap();

        for d in 1..=4 {
            store.insert(Day::new(date(2024, 2, d)));
        }
        assert_eq!(store.prune_empty(), 4);
        assert!(store.is_empty());
        assert!(store.head().is_none() && store.tail().is_none());
        store.verify_links().unwrap();
    }

    #[test]
    fn test_slots_reused_after_prune() {
        let mut store = ChronologicalStore::new();
        store.insert(Day::new(date(2024, 1, 1)));
        store.insert(filled(date(2024, 1, 2), 100));
        store.prune_empty();

        store.insert(filled(date(2024, 1, 1), 90));
        assert_eq!(store.nodes.len(), 2);
        assert_eq!(dates(&store), vec![date(2024, 1, 1), date(2024, 1, 2)]);
        store.verify_links().unwrap();
    }

    #[test]
    fn test_walk_back_bounds() {
        let store: ChronologicalStore = (1..=5).map(|d| Day::new(date(2024, 6, d))).collect();

        let window: Vec<_> = store.walk_back(0).map(Day::date).collect();
        assert_eq!(window, vec![date(2024, 6, 5)]);

        let window: Vec<_> = store.walk_back(2).map(Day::date).collect();
        assert_eq!(window, vec![date(2024, 6, 5), date(2024, 6, 4), date(2024, 6, 3)]);

        // Stops at the head
        assert_eq!(store.walk_back(50).count(), 5);

        // Restartable
        assert_eq!(store.walk_back(2).count(), 3);

        let window: Vec<_> = store.walk_back_from(date(2024, 6, 2), 5).map(Day::date).collect();
        assert_eq!(window, vec![date(2024, 6, 2), date(2024, 6, 1)]);
        assert_eq!(store.walk_back_from(date(2024, 7, 1), 5).count(), 0);
    }

    #[test]
    fn test_verify_links_detects_corruption() {
        let mut store: ChronologicalStore = (1..=3).map(|d| Day::new(date(2024, 6, d))).collect();
        store.verify_links().unwrap();

        let middle = store.index[&date(2024, 6, 2)];
        store.node_mut(middle).prev = None;

        let err = store.verify_links().unwrap_err();
        assert!(matches!(err, JournalError::StructuralInvariantViolation(_)));
    }
}

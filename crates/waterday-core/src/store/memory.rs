//! In-memory [`WaterStore`].

use chrono::NaiveDateTime;
use std::sync::Mutex;

use super::{IntakeEntry, WaterStore, DEFAULT_DAILY_GOAL_ML};
use crate::error::StoreError;

#[derive(Debug)]
struct MemoryState {
    goal_ml: i64,
    entries: Vec<IntakeEntry>,
    manual_end_until: Option<NaiveDateTime>,
}

/// Mutex-guarded store with no persistence.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_goal(DEFAULT_DAILY_GOAL_ML)
    }

    pub fn with_goal(goal_ml: i64) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                goal_ml,
                entries: Vec::new(),
                manual_end_until: None,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WaterStore for MemoryStore {
    fn daily_goal(&self) -> Result<i64, StoreError> {
        Ok(self.state.lock()?.goal_ml)
    }

    fn set_daily_goal(&self, goal_ml: i64) -> Result<(), StoreError> {
        self.state.lock()?.goal_ml = goal_ml;
        Ok(())
    }

    fn entries_in_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<IntakeEntry>, StoreError> {
        let state = self.state.lock()?;
        let mut entries: Vec<IntakeEntry> = state
            .entries
            .iter()
            .filter(|e| e.timestamp >= start && e.timestamp < end)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    fn add_entry(
        &self,
        amount_ml: i64,
        timestamp: NaiveDateTime,
    ) -> Result<IntakeEntry, StoreError> {
        if amount_ml <= 0 {
            return Err(StoreError::NonPositiveAmount(amount_ml));
        }
        let entry = IntakeEntry::new(amount_ml, timestamp);
        self.state.lock()?.entries.push(entry.clone());
        Ok(entry)
    }

    fn delete_entry(&self, id: &str) -> Result<bool, StoreError> {
        let mut state = self.state.lock()?;
        let before = state.entries.len();
        state.entries.retain(|e| e.id != id);
        Ok(state.entries.len() != before)
    }

    fn manual_end_until(&self) -> Result<Option<NaiveDateTime>, StoreError> {
        Ok(self.state.lock()?.manual_end_until)
    }

    fn set_manual_end_until(&self, until: Option<NaiveDateTime>) -> Result<(), StoreError> {
        self.state.lock()?.manual_end_until = until;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn range_is_half_open_and_ordered() {
        let store = MemoryStore::new();
        store.add_entry(300, at(12, 0)).unwrap();
        store.add_entry(200, at(9, 0)).unwrap();
        store.add_entry(100, at(10, 0)).unwrap();

        let entries = store.entries_in_range(at(9, 0), at(12, 0)).unwrap();
        let amounts: Vec<i64> = entries.iter().map(|e| e.amount_ml).collect();
        assert_eq!(amounts, vec![200, 100]);
    }

    #[test]
    fn negative_amount_does_not_lower_the_total() {
        let store = MemoryStore::new();
        store.add_entry(300, at(9, 0)).unwrap();
        assert!(matches!(
            store.add_entry(-300, at(9, 30)),
            Err(StoreError::NonPositiveAmount(-300))
        ));
        let total: i64 = store
            .entries_for_date(at(0, 0).date())
            .unwrap()
            .iter()
            .map(|e| e.amount_ml)
            .sum();
        assert_eq!(total, 300);
    }

    #[test]
    fn delete_and_goal() {
        let store = MemoryStore::with_goal(1500);
        assert_eq!(store.daily_goal().unwrap(), 1500);

        let entry = store.add_entry(250, at(8, 0)).unwrap();
        assert!(store.delete_entry(&entry.id).unwrap());
        assert!(!store.delete_entry(&entry.id).unwrap());
        assert!(store
            .entries_in_range(at(0, 0), at(0, 0) + Duration::days(1))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn entries_for_date_covers_the_calendar_day() {
        let store = MemoryStore::new();
        store.add_entry(100, at(0, 0)).unwrap();
        store.add_entry(100, at(23, 59)).unwrap();
        store.add_entry(100, at(0, 0) + Duration::days(1)).unwrap();

        let day = at(0, 0).date();
        assert_eq!(store.entries_for_date(day).unwrap().len(), 2);
    }
}

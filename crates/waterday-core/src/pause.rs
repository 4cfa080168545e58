//! "End for today" pause tracking.
//!
//! The pause holds the start of the next water day. Until that instant
//! passes no reminder fires; afterwards it clears itself. Every change is
//! written through to the store.

use chrono::{NaiveDateTime, NaiveTime};

use crate::error::StoreError;
use crate::store::WaterStore;
use crate::window::next_day_start;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseTracker {
    until: Option<NaiveDateTime>,
}

impl PauseTracker {
    pub fn load(store: &dyn WaterStore) -> Result<Self, StoreError> {
        Ok(Self {
            until: store.manual_end_until()?,
        })
    }

    pub fn until(&self) -> Option<NaiveDateTime> {
        self.until
    }

    /// Re-read the stored marker; another process may have changed it.
    pub fn sync(&mut self, store: &dyn WaterStore) -> Result<(), StoreError> {
        self.until = store.manual_end_until()?;
        Ok(())
    }

    /// Suppress reminders until the next day-window start after `now`.
    pub fn end_today(
        &mut self,
        store: &dyn WaterStore,
        now: NaiveDateTime,
        day_start: NaiveTime,
    ) -> Result<NaiveDateTime, StoreError> {
        let until = next_day_start(now, day_start);
        store.set_manual_end_until(Some(until))?;
        self.until = Some(until);
        Ok(until)
    }

    /// True while paused. Clears the pause once `now` reaches it.
    pub fn check_and_clear(
        &mut self,
        store: &dyn WaterStore,
        now: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        match self.until {
            Some(until) if now < until => Ok(true),
            Some(_) => {
                store.set_manual_end_until(None)?;
                self.until = None;
                Ok(false)
            }
            None => Ok(false),
        }
    }

    pub fn reset(&mut self, store: &dyn WaterStore) -> Result<(), StoreError> {
        store.set_manual_end_until(None)?;
        self.until = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, NaiveDate};

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    #[test]
    fn end_today_before_start_pauses_until_today() {
        let store = MemoryStore::new();
        let mut pause = PauseTracker::default();
        let until = pause.end_today(&store, at(10, 7, 0), nine()).unwrap();
        assert_eq!(until, at(10, 9, 0));
        assert_eq!(store.manual_end_until().unwrap(), Some(until));
    }

    #[test]
    fn end_today_after_start_pauses_until_tomorrow() {
        let store = MemoryStore::new();
        let mut pause = PauseTracker::default();
        let until = pause.end_today(&store, at(10, 15, 0), nine()).unwrap();
        assert_eq!(until, at(11, 9, 0));
    }

    #[test]
    fn stays_paused_until_the_exact_instant() {
        let store = MemoryStore::new();
        let mut pause = PauseTracker::default();
        let until = pause.end_today(&store, at(10, 15, 0), nine()).unwrap();

        assert!(pause
            .check_and_clear(&store, until - Duration::seconds(1))
            .unwrap());
        assert_eq!(pause.until(), Some(until));

        assert!(!pause.check_and_clear(&store, until).unwrap());
        assert_eq!(pause.until(), None);
        assert_eq!(store.manual_end_until().unwrap(), None);
    }

    #[test]
    fn sync_picks_up_external_changes() {
        let store = MemoryStore::new();
        let mut pause = PauseTracker::load(&store).unwrap();
        assert_eq!(pause.until(), None);

        store.set_manual_end_until(Some(at(12, 9, 0))).unwrap();
        pause.sync(&store).unwrap();
        assert_eq!(pause.until(), Some(at(12, 9, 0)));

        pause.reset(&store).unwrap();
        assert_eq!(store.manual_end_until().unwrap(), None);
    }
}

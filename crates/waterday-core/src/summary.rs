//! Per-day intake summary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::store::{IntakeEntry, WaterStore};

/// Progress is capped so a runaway log still renders sensibly.
pub const MAX_PERCENT: i64 = 999;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_ml: i64,
    pub goal_ml: i64,
    pub percent: i64,
    pub entries: Vec<IntakeEntry>,
}

impl DailySummary {
    pub fn for_date(store: &dyn WaterStore, date: NaiveDate) -> Result<Self, StoreError> {
        let entries = store.entries_for_date(date)?;
        let goal_ml = store.daily_goal()?;
        let total_ml = entries.iter().map(|e| e.amount_ml).sum();
        Ok(Self {
            date,
            total_ml,
            goal_ml,
            percent: percent_of_goal(total_ml, goal_ml),
            entries,
        })
    }
}

/// Rounded percentage of `goal_ml`, 0 without a goal.
pub fn percent_of_goal(total_ml: i64, goal_ml: i64) -> i64 {
    if goal_ml <= 0 {
        return 0;
    }
    let percent = (total_ml as f64 * 100.0 / goal_ml as f64).round() as i64;
    percent.min(MAX_PERCENT)
}

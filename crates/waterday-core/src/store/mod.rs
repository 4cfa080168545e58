mod config;
pub mod database;
pub mod memory;

pub use config::{Config, DriverConfig, RemindersConfig};
pub use database::WaterDb;
pub use memory::MemoryStore;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::StoreError;

/// Daily goal used until the user sets one.
pub const DEFAULT_DAILY_GOAL_ML: i64 = 2000;

/// A single recorded intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeEntry {
    pub id: String,
    pub amount_ml: i64,
    pub timestamp: NaiveDateTime,
}

impl IntakeEntry {
    pub fn new(amount_ml: i64, timestamp: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            amount_ml,
            timestamp,
        }
    }
}

/// Settings/log store consumed by the scheduler.
///
/// The scheduler treats this as a synchronous read/append interface and
/// re-queries it on every evaluation.
pub trait WaterStore: Send + Sync {
    fn daily_goal(&self) -> Result<i64, StoreError>;

    fn set_daily_goal(&self, goal_ml: i64) -> Result<(), StoreError>;

    /// Entries with `start <= timestamp < end`, ordered by timestamp.
    fn entries_in_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<IntakeEntry>, StoreError>;

    /// Rejects amounts <= 0 with [`StoreError::NonPositiveAmount`].
    fn add_entry(&self, amount_ml: i64, timestamp: NaiveDateTime)
        -> Result<IntakeEntry, StoreError>;

    /// Returns whether an entry was removed.
    fn delete_entry(&self, id: &str) -> Result<bool, StoreError>;

    fn manual_end_until(&self) -> Result<Option<NaiveDateTime>, StoreError>;

    fn set_manual_end_until(&self, until: Option<NaiveDateTime>) -> Result<(), StoreError>;

    /// Entries recorded on a calendar day, ordered by timestamp.
    fn entries_for_date(&self, date: NaiveDate) -> Result<Vec<IntakeEntry>, StoreError> {
        let start = date.and_time(chrono::NaiveTime::MIN);
        self.entries_in_range(start, start + Duration::days(1))
    }
}

/// Returns `$WATERDAY_HOME`, or `~/.config/waterday[-dev]/` based on WATERDAY_ENV.
///
/// Set WATERDAY_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("WATERDAY_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("WATERDAY_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("waterday-dev")
            } else {
                base_dir.join("waterday")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

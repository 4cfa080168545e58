//! Reminder settings held by the evaluator.
//!
//! Inputs are normalized at this boundary instead of rejected: a
//! non-positive interval becomes the 60 minute default and anything shorter
//! than a minute becomes one minute.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_INTERVAL_MINUTES: i64 = 60;

pub fn default_day_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

pub fn default_day_end() -> NaiveTime {
    NaiveTime::from_hms_opt(2, 0, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
    pub enabled: bool,
    /// Always >= 1.
    interval_minutes: i64,
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
}

impl ReminderSettings {
    pub fn new(enabled: bool, interval: Duration, day_start: NaiveTime, day_end: NaiveTime) -> Self {
        Self {
            enabled,
            interval_minutes: normalize_interval(interval).num_minutes(),
            day_start,
            day_end,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::minutes(self.interval_minutes)
    }

    pub fn interval_minutes(&self) -> i64 {
        self.interval_minutes
    }

    /// Copy with a different interval, normalized.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval_minutes = normalize_interval(interval).num_minutes();
        self
    }
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            day_start: default_day_start(),
            day_end: default_day_end(),
        }
    }
}

pub fn normalize_interval(interval: Duration) -> Duration {
    if interval <= Duration::zero() {
        return Duration::minutes(DEFAULT_INTERVAL_MINUTES);
    }
    Duration::minutes(interval.num_minutes().max(1))
}

/// Parse `H`, `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(field: &str, value: &str) -> Result<NaiveTime, ValidationError> {
    let trimmed = value.trim();
    let invalid = || ValidationError::InvalidTimeOfDay {
        field: field.to_string(),
        value: value.to_string(),
    };

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(invalid());
    }

    let mut fields = [0u32; 3];
    for (slot, part) in fields.iter_mut().zip(&parts) {
        if part.is_empty() || part.len() > 2 {
            return Err(invalid());
        }
        *slot = part.parse().map_err(|_| invalid())?;
    }

    NaiveTime::from_hms_opt(fields[0], fields[1], fields[2]).ok_or_else(invalid)
}

pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

//! Water day window resolution.
//!
//! A water day is the recurring local time-of-day interval
//! `[day_start, day_end)` during which reminders may fire. When
//! `day_end <= day_start` the window crosses midnight (equal bounds mean a
//! full 24 hour window).
//!
//! ```text
//! non-crossing  09:00 ─────────── 21:00
//! crossing      09:00 ──────────────────── 24:00 ── 02:00 (next day)
//! ```

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Concrete start/end of the water day relevant to a given "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterDayWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// True when `start <= now < end`.
    pub in_window: bool,
}

impl WaterDayWindow {
    fn at(start: NaiveDateTime, end: NaiveDateTime, now: NaiveDateTime) -> Self {
        let mut window = Self {
            start,
            end,
            in_window: false,
        };
        window.in_window = window.contains(now);
        window
    }

    /// Half-open membership, `start <= t < end`.
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t < self.end
    }

    pub fn crosses_midnight(day_start: NaiveTime, day_end: NaiveTime) -> bool {
        day_end <= day_start
    }
}

/// Resolve the water day containing `now`, or the nearest upcoming one.
///
/// Total over all inputs: always returns a window with `start < end`.
pub fn resolve(now: NaiveDateTime, day_start: NaiveTime, day_end: NaiveTime) -> WaterDayWindow {
    let today = now.date();
    let day = Duration::days(1);

    if !WaterDayWindow::crosses_midnight(day_start, day_end) {
        let start = today.and_time(day_start);
        let end = today.and_time(day_end);

        if now < end {
            // Before or inside today's window.
            return WaterDayWindow::at(start, end, now);
        }
        return WaterDayWindow::at(start + day, end + day, now);
    }

    let yesterday_start = today.and_time(day_start) - day;
    let yesterday_end = today.and_time(day_end);
    if yesterday_start <= now && now < yesterday_end {
        return WaterDayWindow::at(yesterday_start, yesterday_end, now);
    }

    let today_start = today.and_time(day_start);
    let today_end = today.and_time(day_end) + day;
    if now < today_end {
        // Either inside tonight's window or in the gap before it opens.
        return WaterDayWindow::at(today_start, today_end, now);
    }

    WaterDayWindow::at(today_start + day, today_end + day, now)
}

/// First day-window start strictly after `now` (or exactly `today + day_start`
/// when `now` precedes it).
pub fn next_day_start(now: NaiveDateTime, day_start: NaiveTime) -> NaiveDateTime {
    let today_start = now.date().and_time(day_start);
    if now < today_start {
        today_start
    } else {
        today_start + Duration::days(1)
    }
}

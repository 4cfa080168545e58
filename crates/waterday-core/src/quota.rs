//! Per-reminder quota distribution.
//!
//! The volume still owed toward the daily goal is split evenly across the
//! reminder slots left before the window closes, then rounded up to a
//! human-friendly step and clamped so a suggestion never exceeds what
//! remains. Early suggestions are therefore never smaller than later ones
//! and confirmed suggestions never overshoot the goal.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Rounding granularity for suggested amounts.
pub const QUOTA_STEP_ML: i64 = 50;

/// Breakdown of a single suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSuggestion {
    pub remaining_minutes: i64,
    pub reminders_left: i64,
    pub raw_ml: i64,
    pub amount_ml: i64,
}

/// Suggest the amount for the next reminder.
///
/// Returns `None` when there is nothing positive to suggest this cycle.
pub fn suggest(
    remaining_ml: i64,
    now: NaiveDateTime,
    window_end: NaiveDateTime,
    interval_minutes: i64,
) -> Option<QuotaSuggestion> {
    let remaining_minutes = (window_end - now).num_minutes().max(1);
    let interval_minutes = interval_minutes.max(1);
    let reminders_left = div_ceil(remaining_minutes, interval_minutes).max(1);

    let raw_ml = div_ceil(remaining_ml, reminders_left);
    let amount_ml = round_up_to_step(raw_ml, QUOTA_STEP_ML).min(remaining_ml);
    if amount_ml <= 0 {
        return None;
    }

    Some(QuotaSuggestion {
        remaining_minutes,
        reminders_left,
        raw_ml,
        amount_ml,
    })
}

/// `0` for non-positive values, otherwise the next multiple of `step`.
pub fn round_up_to_step(value: i64, step: i64) -> i64 {
    if value <= 0 {
        return 0;
    }
    div_ceil(value, step) * step
}

// Ceiling division for a positive divisor; non-positive numerators floor at 0.
fn div_ceil(numerator: i64, divisor: i64) -> i64 {
    if numerator <= 0 {
        return 0;
    }
    (numerator + divisor - 1) / divisor
}

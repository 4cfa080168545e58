use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::settings::ReminderSettings;
use crate::store::IntakeEntry;

/// Every externally visible scheduler state change produces an Event.
/// The CLI prints them; embedders may forward them to a UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ReminderDue {
        suggested_amount_ml: i64,
        remaining_after_ml: i64,
        daily_goal_ml: i64,
        at: NaiveDateTime,
    },
    ReminderConfirmed {
        amount_ml: i64,
        next_reminder_at: NaiveDateTime,
        at: NaiveDateTime,
    },
    ReminderSkipped {
        skip_minutes: i64,
        next_reminder_at: NaiveDateTime,
        at: NaiveDateTime,
    },
    /// Intake recorded outside the reminder flow.
    IntakeLogged {
        entry: IntakeEntry,
    },
    ManualEndSet {
        until: NaiveDateTime,
        at: NaiveDateTime,
    },
    ManualEndCleared {
        at: NaiveDateTime,
    },
    SettingsApplied {
        settings: ReminderSettings,
        at: NaiveDateTime,
    },
    EvaluationFailed {
        message: String,
        at: NaiveDateTime,
    },
}

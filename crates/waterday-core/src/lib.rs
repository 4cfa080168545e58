//! # Waterday Core Library
//!
//! This library provides the hydration reminder engine behind Waterday.
//! Given a recurring water day window, a daily goal, the intake already
//! logged and a reminder interval, it decides when the next reminder fires
//! and how much to suggest drinking.
//!
//! ## Architecture
//!
//! - **Window resolver** ([`window`]): concrete start/end of the current
//!   water day, including windows that cross midnight
//! - **Quota distributor** ([`quota`]): per-reminder amount, rounded up to a
//!   fixed step and never more than what remains
//! - **Pause tracker** ([`pause`]): "end for today" until the next window
//! - **Evaluator** ([`Evaluator`]): the policy state machine, re-derived from
//!   the store on every evaluation
//! - **Driver** ([`Driver`]): tokio task ticking the evaluator and applying
//!   confirm/skip and settings commands
//! - **Storage**: SQLite intake log ([`WaterDb`]) and TOML configuration
//!   ([`Config`])
//!
//! All times are local wall-clock time.

pub mod clock;
pub mod error;
pub mod events;
pub mod pause;
pub mod quota;
pub mod scheduler;
pub mod settings;
pub mod store;
pub mod summary;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use quota::{QuotaSuggestion, QUOTA_STEP_ML};
pub use scheduler::{
    DebugInfo, Driver, DriverHandle, Evaluation, Evaluator, Notifier, Reminder,
    ReminderResponder, SchedulerState, Status,
};
pub use settings::ReminderSettings;
pub use store::{Config, IntakeEntry, MemoryStore, WaterDb, WaterStore};
pub use summary::DailySummary;
pub use window::WaterDayWindow;

//! Hydration reminder policy.
//!
//! Each evaluation re-derives the water day window and the remaining volume
//! from the store, so a late or missed tick never produces a backlog: at
//! most one reminder is due per evaluation. The only state carried between
//! evaluations is the next reminder deadline and the pause marker.
//!
//! ## Decision order (first match wins)
//!
//! ```text
//! Disabled -> ManuallyPaused -> OutsideWindow -> NoGoal -> GoalMet -> Waiting -> Due
//! ```
//!
//! Ticks, confirm/skip callbacks and settings changes all run inside the
//! same mutex, so none of them interleave.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::pause::PauseTracker;
use crate::quota;
use crate::settings::ReminderSettings;
use crate::store::WaterStore;
use crate::window::{self, next_day_start};

/// Retry delay while no daily goal is configured.
pub const NO_GOAL_RETRY_MINUTES: i64 = 10;

/// Outcome of the most recent evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Nothing evaluated since start or since settings were applied.
    #[default]
    Unknown,
    Disabled,
    ManuallyPaused,
    OutsideWindow,
    NoGoal,
    GoalMet,
    Waiting,
    Due,
    NoSuggestion,
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Unknown => "unknown",
            Status::Disabled => "disabled",
            Status::ManuallyPaused => "manually_paused",
            Status::OutsideWindow => "outside_window",
            Status::NoGoal => "no_goal",
            Status::GoalMet => "goal_met",
            Status::Waiting => "waiting",
            Status::Due => "due",
            Status::NoSuggestion => "no_suggestion",
            Status::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// In-memory scheduler state. Reset whenever settings are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerState {
    pub next_reminder_at: Option<NaiveDateTime>,
    pub last_status: Status,
    pub last_suggested_amount_ml: Option<i64>,
    pub last_error: Option<String>,
}

/// Result of one evaluation.
#[derive(Debug)]
pub struct Evaluation {
    pub status: Status,
    pub next_reminder_at: Option<NaiveDateTime>,
    pub reminder: Option<Reminder>,
}

/// A reminder to show the user.
///
/// Answer it through [`Reminder::confirm`] or [`Reminder::skip`]; both
/// consume it, so each reminder is answered at most once. Dropping it
/// without answering is an implicit skip.
#[derive(Debug)]
pub struct Reminder {
    pub suggested_amount_ml: i64,
    pub remaining_after_ml: i64,
    pub daily_goal_ml: i64,
    pub due_at: NaiveDateTime,
    responder: ReminderResponder,
}

impl Reminder {
    pub fn event(&self) -> Event {
        Event::ReminderDue {
            suggested_amount_ml: self.suggested_amount_ml,
            remaining_after_ml: self.remaining_after_ml,
            daily_goal_ml: self.daily_goal_ml,
            at: self.due_at,
        }
    }

    /// Detach the confirm/skip callbacks, e.g. to hand them to a UI thread.
    pub fn into_responder(self) -> ReminderResponder {
        self.responder
    }

    pub fn confirm(self) -> Result<Event> {
        self.responder.confirm()
    }

    pub fn skip(self) -> Result<Event> {
        self.responder.skip()
    }
}

/// Confirm/skip callbacks bound to the evaluator that emitted a reminder.
#[derive(Debug)]
pub struct ReminderResponder {
    evaluator: Evaluator,
    amount_ml: i64,
    skip_minutes: i64,
}

impl ReminderResponder {
    pub fn amount_ml(&self) -> i64 {
        self.amount_ml
    }

    /// Log the suggested amount and rearm one interval from now.
    pub fn confirm(self) -> Result<Event> {
        self.evaluator.confirm(self.amount_ml)
    }

    /// Rearm after the interval that was in force when the reminder fired.
    pub fn skip(self) -> Result<Event> {
        self.evaluator.skip(self.skip_minutes)
    }
}

/// Read-only diagnostics snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub enabled: bool,
    pub interval_minutes: i64,
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub manual_end_until: Option<NaiveDateTime>,
    pub next_reminder_at: Option<NaiveDateTime>,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub in_window: bool,
    pub daily_goal_ml: i64,
    pub total_today_ml: i64,
    pub remaining_ml: i64,
    /// Seconds until the next reminder, floored at zero.
    pub countdown_secs: Option<i64>,
    pub status: Status,
    pub last_error: Option<String>,
    pub last_suggested_amount_ml: Option<i64>,
    pub now: NaiveDateTime,
}

struct Inner {
    settings: ReminderSettings,
    pause: PauseTracker,
    state: SchedulerState,
}

impl Inner {
    fn settle(&mut self, status: Status, reminder: Option<Reminder>) -> Evaluation {
        self.state.last_status = status;
        self.state.last_error = None;
        debug!(
            %status,
            next_reminder_at = ?self.state.next_reminder_at,
            "hydration evaluation"
        );
        Evaluation {
            status,
            next_reminder_at: self.state.next_reminder_at,
            reminder,
        }
    }
}

struct Shared {
    store: Arc<dyn WaterStore>,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

/// Cheaply clonable handle to the hydration scheduling policy.
#[derive(Clone)]
pub struct Evaluator {
    shared: Arc<Shared>,
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator").finish_non_exhaustive()
    }
}

impl Evaluator {
    /// Create an evaluator on the system clock.
    ///
    /// # Errors
    /// Returns an error if the stored pause marker cannot be read.
    pub fn new(store: Arc<dyn WaterStore>, settings: ReminderSettings) -> Result<Self> {
        Self::with_clock(store, Arc::new(SystemClock), settings)
    }

    pub fn with_clock(
        store: Arc<dyn WaterStore>,
        clock: Arc<dyn Clock>,
        settings: ReminderSettings,
    ) -> Result<Self> {
        let pause = PauseTracker::load(store.as_ref())?;
        Ok(Self {
            shared: Arc::new(Shared {
                store,
                clock,
                inner: Mutex::new(Inner {
                    settings,
                    pause,
                    state: SchedulerState::default(),
                }),
            }),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now(&self) -> NaiveDateTime {
        self.shared.clock.now()
    }

    pub fn state(&self) -> SchedulerState {
        self.lock().state.clone()
    }

    pub fn debug_info(&self) -> Result<DebugInfo> {
        self.debug_info_at(self.now())
    }

    pub fn debug_info_at(&self, now: NaiveDateTime) -> Result<DebugInfo> {
        let inner = self.lock();
        let store = self.shared.store.as_ref();
        let settings = inner.settings;

        let window = window::resolve(now, settings.day_start, settings.day_end);
        let daily_goal_ml = store.daily_goal()?;
        let total_today_ml: i64 = store
            .entries_in_range(window.start, window.end)?
            .iter()
            .map(|e| e.amount_ml)
            .sum();
        let next_reminder_at = inner.state.next_reminder_at;

        Ok(DebugInfo {
            enabled: settings.enabled,
            interval_minutes: settings.interval_minutes(),
            day_start: settings.day_start,
            day_end: settings.day_end,
            manual_end_until: store.manual_end_until()?,
            next_reminder_at,
            window_start: window.start,
            window_end: window.end,
            in_window: window.in_window,
            daily_goal_ml,
            total_today_ml,
            remaining_ml: (daily_goal_ml - total_today_ml).max(0),
            countdown_secs: next_reminder_at.map(|next| (next - now).num_seconds().max(0)),
            status: inner.state.last_status,
            last_error: inner.state.last_error.clone(),
            last_suggested_amount_ml: inner.state.last_suggested_amount_ml,
            now,
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn evaluate(&self) -> Result<Evaluation> {
        self.evaluate_at(self.now())
    }

    /// Run one policy evaluation at `now`.
    ///
    /// A failure is recorded as [`Status::Failed`] before being returned.
    pub fn evaluate_at(&self, now: NaiveDateTime) -> Result<Evaluation> {
        let mut inner = self.lock();
        let result = self.run_policy(&mut inner, now);
        if let Err(e) = &result {
            inner.state.last_status = Status::Failed;
            inner.state.last_error = Some(e.to_string());
        }
        result
    }

    pub fn confirm(&self, amount_ml: i64) -> Result<Event> {
        self.confirm_at(amount_ml, self.now())
    }

    /// Record `amount_ml` as drunk at `now` and rearm one interval later.
    pub fn confirm_at(&self, amount_ml: i64, now: NaiveDateTime) -> Result<Event> {
        if amount_ml <= 0 {
            return Err(ValidationError::NonPositiveAmount(amount_ml).into());
        }
        let mut inner = self.lock();
        self.shared.store.add_entry(amount_ml, now)?;
        let next = now + inner.settings.interval();
        inner.state.next_reminder_at = Some(next);
        info!(amount_ml, %next, "hydration reminder confirmed");
        Ok(Event::ReminderConfirmed {
            amount_ml,
            next_reminder_at: next,
            at: now,
        })
    }

    pub fn skip(&self, skip_minutes: i64) -> Result<Event> {
        self.skip_at(skip_minutes, self.now())
    }

    /// Rearm `skip_minutes` from `now` without logging intake. A
    /// non-positive value falls back to the configured interval.
    pub fn skip_at(&self, skip_minutes: i64, now: NaiveDateTime) -> Result<Event> {
        let mut inner = self.lock();
        let skip_minutes = if skip_minutes > 0 {
            skip_minutes
        } else {
            inner.settings.interval_minutes()
        };
        let next = now + Duration::minutes(skip_minutes);
        inner.state.next_reminder_at = Some(next);
        info!(skip_minutes, %next, "hydration reminder skipped");
        Ok(Event::ReminderSkipped {
            skip_minutes,
            next_reminder_at: next,
            at: now,
        })
    }

    /// Replace the settings and forget every derived deadline.
    pub fn apply_settings(&self, settings: ReminderSettings) -> Event {
        let mut inner = self.lock();
        inner.settings = settings;
        inner.state = SchedulerState::default();
        info!(
            enabled = settings.enabled,
            interval_minutes = settings.interval_minutes(),
            day_start = %settings.day_start,
            day_end = %settings.day_end,
            "hydration settings applied"
        );
        Event::SettingsApplied {
            settings,
            at: self.now(),
        }
    }

    pub fn end_today(&self) -> Result<Event> {
        self.end_today_at(self.now())
    }

    /// Suppress reminders until the next water day starts.
    pub fn end_today_at(&self, now: NaiveDateTime) -> Result<Event> {
        let mut inner = self.lock();
        let day_start = inner.settings.day_start;
        let until = inner
            .pause
            .end_today(self.shared.store.as_ref(), now, day_start)?;
        inner.state.next_reminder_at = Some(until);
        inner.state.last_status = Status::ManuallyPaused;
        info!(%until, "hydration reminders ended for today");
        Ok(Event::ManualEndSet { until, at: now })
    }

    /// Lift a manual end; the next evaluation re-derives everything.
    pub fn reset_manual_end(&self) -> Result<Event> {
        let mut inner = self.lock();
        inner.pause.reset(self.shared.store.as_ref())?;
        inner.state.next_reminder_at = None;
        info!("hydration manual end cleared");
        Ok(Event::ManualEndCleared { at: self.now() })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Everything behind the lock is re-derived on the next evaluation,
        // so a poisoned guard is still usable.
        self.shared
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn run_policy(&self, inner: &mut Inner, now: NaiveDateTime) -> Result<Evaluation> {
        let store = self.shared.store.as_ref();
        let settings = inner.settings;

        if !settings.enabled || settings.interval() <= Duration::zero() {
            inner.state.next_reminder_at = None;
            return Ok(inner.settle(Status::Disabled, None));
        }

        let held_until = inner.pause.until();
        inner.pause.sync(store)?;
        if held_until.is_some()
            && inner.pause.until() != held_until
            && inner.state.next_reminder_at == held_until
        {
            // Pause lifted or moved elsewhere; drop the deadline it set.
            inner.state.next_reminder_at = None;
        }
        if inner.pause.check_and_clear(store, now)? {
            inner.state.next_reminder_at = inner.pause.until();
            return Ok(inner.settle(Status::ManuallyPaused, None));
        }

        let window = window::resolve(now, settings.day_start, settings.day_end);
        if !window.in_window {
            let next = if now < window.start {
                window.start
            } else {
                next_day_start(now, settings.day_start)
            };
            inner.state.next_reminder_at = Some(next);
            return Ok(inner.settle(Status::OutsideWindow, None));
        }

        let goal = store.daily_goal()?;
        if goal <= 0 {
            inner.state.next_reminder_at = Some(now + Duration::minutes(NO_GOAL_RETRY_MINUTES));
            return Ok(inner.settle(Status::NoGoal, None));
        }

        let drunk: i64 = store
            .entries_in_range(window.start, window.end)?
            .iter()
            .map(|e| e.amount_ml)
            .sum();
        let remaining = goal - drunk;
        if remaining <= 0 {
            inner.state.next_reminder_at = Some(next_day_start(now, settings.day_start));
            return Ok(inner.settle(Status::GoalMet, None));
        }

        match inner.state.next_reminder_at {
            None => inner.state.next_reminder_at = Some(now),
            Some(next) if now < next => return Ok(inner.settle(Status::Waiting, None)),
            Some(_) => {}
        }

        // Optimistic rearm; confirm/skip may move it.
        inner.state.next_reminder_at = Some(now + settings.interval());

        let Some(suggestion) =
            quota::suggest(remaining, now, window.end, settings.interval_minutes())
        else {
            return Ok(inner.settle(Status::NoSuggestion, None));
        };

        let amount = suggestion.amount_ml;
        inner.state.last_suggested_amount_ml = Some(amount);
        let reminder = Reminder {
            suggested_amount_ml: amount,
            remaining_after_ml: (remaining - amount).max(0),
            daily_goal_ml: goal,
            due_at: now,
            responder: ReminderResponder {
                evaluator: self.clone(),
                amount_ml: amount,
                skip_minutes: settings.interval_minutes(),
            },
        };
        info!(
            amount_ml = amount,
            remaining_after_ml = reminder.remaining_after_ml,
            reminders_left = suggestion.reminders_left,
            "hydration reminder due"
        );
        Ok(inner.settle(Status::Due, Some(reminder)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{CoreError, StoreError};
    use crate::store::{IntakeEntry, MemoryStore};
    use chrono::NaiveDate;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn tod(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn settings(interval_min: i64, start: NaiveTime, end: NaiveTime) -> ReminderSettings {
        ReminderSettings::new(true, Duration::minutes(interval_min), start, end)
    }

    fn evaluator(store: Arc<MemoryStore>, s: ReminderSettings, now: NaiveDateTime) -> Evaluator {
        Evaluator::with_clock(store, Arc::new(ManualClock::new(now)), s).unwrap()
    }

    #[test]
    fn disabled_clears_deadline() {
        let store = Arc::new(MemoryStore::new());
        let mut s = settings(60, tod(9, 0), tod(21, 0));
        s.enabled = false;
        let ev = evaluator(store, s, at(10, 10, 0));

        let out = ev.evaluate_at(at(10, 10, 0)).unwrap();
        assert_eq!(out.status, Status::Disabled);
        assert!(out.next_reminder_at.is_none());
        assert!(out.reminder.is_none());
    }

    #[test]
    fn outside_window_waits_for_start() {
        let store = Arc::new(MemoryStore::new());
        let ev = evaluator(store, settings(60, tod(9, 0), tod(21, 0)), at(10, 7, 0));

        let out = ev.evaluate_at(at(10, 7, 0)).unwrap();
        assert_eq!(out.status, Status::OutsideWindow);
        assert_eq!(out.next_reminder_at, Some(at(10, 9, 0)));

        let out = ev.evaluate_at(at(10, 22, 0)).unwrap();
        assert_eq!(out.status, Status::OutsideWindow);
        assert_eq!(out.next_reminder_at, Some(at(11, 9, 0)));
    }

    #[test]
    fn no_goal_retries_in_ten_minutes() {
        let store = Arc::new(MemoryStore::with_goal(0));
        let ev = evaluator(store, settings(60, tod(9, 0), tod(21, 0)), at(10, 10, 0));

        let out = ev.evaluate_at(at(10, 10, 0)).unwrap();
        assert_eq!(out.status, Status::NoGoal);
        assert_eq!(out.next_reminder_at, Some(at(10, 10, 10)));
    }

    #[test]
    fn goal_met_waits_for_next_day() {
        let store = Arc::new(MemoryStore::with_goal(1000));
        store.add_entry(600, at(10, 9, 30)).unwrap();
        store.add_entry(400, at(10, 11, 0)).unwrap();
        let ev = evaluator(store, settings(60, tod(9, 0), tod(21, 0)), at(10, 12, 0));

        let out = ev.evaluate_at(at(10, 12, 0)).unwrap();
        assert_eq!(out.status, Status::GoalMet);
        assert_eq!(out.next_reminder_at, Some(at(11, 9, 0)));
    }

    #[test]
    fn first_due_fires_immediately_then_waits() {
        let store = Arc::new(MemoryStore::with_goal(2000));
        let ev = evaluator(store, settings(60, tod(9, 0), tod(11, 0)), at(10, 9, 0));

        let out = ev.evaluate_at(at(10, 9, 0)).unwrap();
        assert_eq!(out.status, Status::Due);
        let reminder = out.reminder.unwrap();
        assert_eq!(reminder.suggested_amount_ml, 1000);
        assert_eq!(reminder.remaining_after_ml, 1000);
        assert_eq!(reminder.daily_goal_ml, 2000);
        assert_eq!(out.next_reminder_at, Some(at(10, 10, 0)));

        let again = ev.evaluate_at(at(10, 9, 0)).unwrap();
        assert_eq!(again.status, Status::Waiting);
        assert!(again.reminder.is_none());
        assert_eq!(again.next_reminder_at, Some(at(10, 10, 0)));
        assert_eq!(ev.state().last_suggested_amount_ml, Some(1000));
    }

    #[test]
    fn confirm_logs_intake_and_rearms() {
        let store = Arc::new(MemoryStore::with_goal(2000));
        let ev = evaluator(store.clone(), settings(90, tod(9, 0), tod(21, 0)), at(10, 9, 0));

        let reminder = ev.evaluate_at(at(10, 9, 0)).unwrap().reminder.unwrap();
        let amount = reminder.suggested_amount_ml;
        let event = ev.confirm_at(amount, at(10, 9, 5)).unwrap();

        assert_eq!(
            event,
            Event::ReminderConfirmed {
                amount_ml: amount,
                next_reminder_at: at(10, 10, 35),
                at: at(10, 9, 5),
            }
        );
        let logged: Vec<IntakeEntry> = store.entries_in_range(at(10, 0, 0), at(11, 0, 0)).unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].amount_ml, amount);
        assert_eq!(ev.state().next_reminder_at, Some(at(10, 10, 35)));
    }

    #[test]
    fn responder_uses_the_evaluator_clock() {
        let store = Arc::new(MemoryStore::with_goal(2000));
        let clock = Arc::new(ManualClock::new(at(10, 9, 0)));
        let ev = Evaluator::with_clock(
            store.clone(),
            clock.clone(),
            settings(60, tod(9, 0), tod(21, 0)),
        )
        .unwrap();

        let reminder = ev.evaluate().unwrap().reminder.unwrap();
        clock.advance(Duration::minutes(20));
        let event = reminder.skip().unwrap();

        assert_eq!(
            event,
            Event::ReminderSkipped {
                skip_minutes: 60,
                next_reminder_at: at(10, 10, 20),
                at: at(10, 9, 20),
            }
        );
        assert!(store.entries_for_date(at(10, 0, 0).date()).unwrap().is_empty());
    }

    #[test]
    fn skip_with_non_positive_minutes_uses_interval() {
        let store = Arc::new(MemoryStore::new());
        let ev = evaluator(store, settings(45, tod(9, 0), tod(21, 0)), at(10, 9, 0));
        ev.skip_at(0, at(10, 9, 0)).unwrap();
        assert_eq!(ev.state().next_reminder_at, Some(at(10, 9, 45)));
    }

    #[test]
    fn confirm_rejects_non_positive_amount() {
        let store = Arc::new(MemoryStore::new());
        let ev = evaluator(store, settings(60, tod(9, 0), tod(21, 0)), at(10, 9, 0));
        assert!(matches!(
            ev.confirm_at(0, at(10, 9, 0)),
            Err(CoreError::Validation(ValidationError::NonPositiveAmount(0)))
        ));
    }

    #[test]
    fn manual_end_suppresses_then_falls_through() {
        let store = Arc::new(MemoryStore::with_goal(2000));
        let ev = evaluator(store.clone(), settings(60, tod(9, 0), tod(21, 0)), at(10, 12, 0));

        let event = ev.end_today_at(at(10, 12, 0)).unwrap();
        assert_eq!(
            event,
            Event::ManualEndSet {
                until: at(11, 9, 0),
                at: at(10, 12, 0)
            }
        );

        let out = ev.evaluate_at(at(11, 8, 59)).unwrap();
        assert_eq!(out.status, Status::ManuallyPaused);
        assert_eq!(out.next_reminder_at, Some(at(11, 9, 0)));

        let out = ev.evaluate_at(at(11, 9, 0)).unwrap();
        assert_eq!(out.status, Status::Due);
        assert!(out.reminder.is_some());
        assert_eq!(store.manual_end_until().unwrap(), None);
    }

    #[test]
    fn reset_manual_end_rederives() {
        let store = Arc::new(MemoryStore::with_goal(2000));
        let ev = evaluator(store.clone(), settings(60, tod(9, 0), tod(21, 0)), at(10, 12, 0));

        ev.end_today_at(at(10, 12, 0)).unwrap();
        ev.reset_manual_end().unwrap();
        assert_eq!(store.manual_end_until().unwrap(), None);

        let out = ev.evaluate_at(at(10, 12, 1)).unwrap();
        assert_eq!(out.status, Status::Due);
    }

    #[test]
    fn external_manual_end_is_honoured() {
        let store = Arc::new(MemoryStore::with_goal(2000));
        let ev = evaluator(store.clone(), settings(60, tod(9, 0), tod(21, 0)), at(10, 12, 0));

        store.set_manual_end_until(Some(at(11, 9, 0))).unwrap();
        let out = ev.evaluate_at(at(10, 12, 0)).unwrap();
        assert_eq!(out.status, Status::ManuallyPaused);
    }

    #[test]
    fn external_resume_rederives_immediately() {
        let store = Arc::new(MemoryStore::with_goal(2000));
        let ev = evaluator(store.clone(), settings(60, tod(9, 0), tod(21, 0)), at(10, 12, 0));

        store.set_manual_end_until(Some(at(11, 9, 0))).unwrap();
        let out = ev.evaluate_at(at(10, 12, 0)).unwrap();
        assert_eq!(out.status, Status::ManuallyPaused);
        assert_eq!(out.next_reminder_at, Some(at(11, 9, 0)));

        // Another process lifts the pause.
        store.set_manual_end_until(None).unwrap();
        let out = ev.evaluate_at(at(10, 12, 1)).unwrap();
        assert_eq!(out.status, Status::Due);
        assert!(out.reminder.is_some());
        assert_eq!(out.next_reminder_at, Some(at(10, 13, 1)));
    }

    #[test]
    fn external_pause_expires_into_due() {
        let store = Arc::new(MemoryStore::with_goal(2000));
        let ev = evaluator(store.clone(), settings(60, tod(9, 0), tod(21, 0)), at(10, 9, 0));
        ev.evaluate_at(at(10, 9, 0)).unwrap();

        store.set_manual_end_until(Some(at(10, 9, 30))).unwrap();
        assert_eq!(
            ev.evaluate_at(at(10, 9, 10)).unwrap().status,
            Status::ManuallyPaused
        );
        // The pause runs out on its own; its deadline is the next due time.
        let out = ev.evaluate_at(at(10, 9, 30)).unwrap();
        assert_eq!(out.status, Status::Due);
    }

    #[test]
    fn apply_settings_resets_state() {
        let store = Arc::new(MemoryStore::with_goal(2000));
        let ev = evaluator(store, settings(60, tod(9, 0), tod(21, 0)), at(10, 9, 0));
        ev.evaluate_at(at(10, 9, 0)).unwrap();
        assert!(ev.state().next_reminder_at.is_some());

        ev.apply_settings(settings(30, tod(9, 0), tod(21, 0)));
        assert_eq!(ev.state(), SchedulerState::default());

        let out = ev.evaluate_at(at(10, 9, 10)).unwrap();
        assert_eq!(out.status, Status::Due);
        assert_eq!(out.next_reminder_at, Some(at(10, 9, 40)));
    }

    #[test]
    fn manual_entry_between_ticks_is_seen() {
        let store = Arc::new(MemoryStore::with_goal(1000));
        let ev = evaluator(store.clone(), settings(60, tod(9, 0), tod(21, 0)), at(10, 9, 0));
        ev.evaluate_at(at(10, 9, 0)).unwrap();

        store.add_entry(1000, at(10, 9, 30)).unwrap();
        let out = ev.evaluate_at(at(10, 10, 0)).unwrap();
        assert_eq!(out.status, Status::GoalMet);
    }

    struct BrokenStore;

    impl WaterStore for BrokenStore {
        fn daily_goal(&self) -> Result<i64, StoreError> {
            Err(StoreError::Locked)
        }
        fn set_daily_goal(&self, _: i64) -> Result<(), StoreError> {
            Err(StoreError::Locked)
        }
        fn entries_in_range(
            &self,
            _: NaiveDateTime,
            _: NaiveDateTime,
        ) -> Result<Vec<IntakeEntry>, StoreError> {
            Err(StoreError::Locked)
        }
        fn add_entry(&self, _: i64, _: NaiveDateTime) -> Result<IntakeEntry, StoreError> {
            Err(StoreError::Locked)
        }
        fn delete_entry(&self, _: &str) -> Result<bool, StoreError> {
            Err(StoreError::Locked)
        }
        fn manual_end_until(&self) -> Result<Option<NaiveDateTime>, StoreError> {
            Ok(None)
        }
        fn set_manual_end_until(&self, _: Option<NaiveDateTime>) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn store_failure_is_recorded_as_status() {
        let ev = Evaluator::with_clock(
            Arc::new(BrokenStore),
            Arc::new(ManualClock::new(at(10, 10, 0))),
            settings(60, tod(9, 0), tod(21, 0)),
        )
        .unwrap();

        assert!(ev.evaluate_at(at(10, 10, 0)).is_err());
        let state = ev.state();
        assert_eq!(state.last_status, Status::Failed);
        assert_eq!(
            state.last_error.as_deref(),
            Some("Store error: Database is locked")
        );
    }

    #[test]
    fn debug_info_reports_window_and_progress() {
        let store = Arc::new(MemoryStore::with_goal(2000));
        store.add_entry(500, at(10, 9, 30)).unwrap();
        let ev = evaluator(store, settings(60, tod(9, 0), tod(2, 0)), at(10, 10, 0));
        ev.evaluate_at(at(10, 10, 0)).unwrap();

        let info = ev.debug_info_at(at(10, 10, 15)).unwrap();
        assert!(info.enabled);
        assert!(info.in_window);
        assert_eq!(info.window_start, at(10, 9, 0));
        assert_eq!(info.window_end, at(11, 2, 0));
        assert_eq!(info.total_today_ml, 500);
        assert_eq!(info.remaining_ml, 1500);
        assert_eq!(info.status, Status::Due);
        assert_eq!(info.next_reminder_at, Some(at(10, 11, 0)));
        assert_eq!(info.countdown_secs, Some(45 * 60));
        assert_eq!(info.last_suggested_amount_ml, Some(100));
    }
}

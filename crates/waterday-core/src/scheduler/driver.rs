//! Driver loop.
//!
//! Spawns a tokio task that ticks the [`Evaluator`] on a fixed cadence and
//! processes commands (confirm, skip, settings, manual end) from a channel.
//! An evaluation failure is logged and reported; the loop keeps running and
//! the next tick retries from current state.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::evaluator::{DebugInfo, Evaluator, Reminder};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::settings::ReminderSettings;

/// Default interval between evaluations.
pub const DEFAULT_TICK: Duration = Duration::from_secs(30);

/// Receives reminders (and, optionally, every other event) from the driver.
pub trait Notifier: Send + Sync + 'static {
    /// Show a due reminder. Exactly one of confirm/skip may be called on it.
    fn notify(&self, reminder: Reminder);

    fn event(&self, _event: &Event) {}
}

impl<F> Notifier for F
where
    F: Fn(Reminder) + Send + Sync + 'static,
{
    fn notify(&self, reminder: Reminder) {
        self(reminder)
    }
}

enum Command {
    Tick,
    Confirm { amount_ml: i64 },
    Skip { minutes: i64 },
    ApplySettings(ReminderSettings),
    EndToday,
    ResetManualEnd,
    DebugInfo(oneshot::Sender<Result<DebugInfo>>),
}

pub struct Driver {
    evaluator: Evaluator,
    notifier: Arc<dyn Notifier>,
    tick: Duration,
}

impl Driver {
    pub fn new(evaluator: Evaluator, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            evaluator,
            notifier,
            tick: DEFAULT_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(Duration::from_millis(1));
        self
    }

    /// Start the driver loop. The first evaluation runs immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> DriverHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let join = tokio::spawn(self.run(rx));
        DriverHandle { tx, join }
    }

    async fn run(self, mut rx: mpsc::UnboundedReceiver<Command>) {
        info!(tick_ms = self.tick.as_millis() as u64, "hydration driver started");
        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick(),
                cmd = rx.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
            }
        }
        info!("hydration driver stopped");
    }

    fn tick(&self) {
        match self.evaluator.evaluate() {
            Ok(evaluation) => {
                if let Some(reminder) = evaluation.reminder {
                    self.notifier.event(&reminder.event());
                    self.notifier.notify(reminder);
                }
            }
            Err(e) => {
                warn!("hydration evaluation failed: {e}");
                self.notifier.event(&Event::EvaluationFailed {
                    message: e.to_string(),
                    at: self.evaluator.now(),
                });
            }
        }
    }

    fn handle(&self, cmd: Command) {
        match cmd {
            Command::Tick => self.tick(),
            Command::Confirm { amount_ml } => {
                let result = self.evaluator.confirm(amount_ml);
                self.report("confirm", result);
            }
            Command::Skip { minutes } => {
                let result = self.evaluator.skip(minutes);
                self.report("skip", result);
            }
            Command::ApplySettings(settings) => {
                let event = self.evaluator.apply_settings(settings);
                self.notifier.event(&event);
                self.tick();
            }
            Command::EndToday => {
                let result = self.evaluator.end_today();
                self.report("end today", result);
                self.tick();
            }
            Command::ResetManualEnd => {
                let result = self.evaluator.reset_manual_end();
                self.report("reset manual end", result);
                self.tick();
            }
            Command::DebugInfo(reply) => {
                if reply.send(self.evaluator.debug_info()).is_err() {
                    debug!("debug info requester went away");
                }
            }
        }
    }

    fn report(&self, what: &str, result: Result<Event>) {
        match result {
            Ok(event) => self.notifier.event(&event),
            Err(e) => warn!("hydration {what} failed: {e}"),
        }
    }
}

/// Control handle for a running [`Driver`].
pub struct DriverHandle {
    tx: mpsc::UnboundedSender<Command>,
    join: JoinHandle<()>,
}

impl DriverHandle {
    fn send(&self, cmd: Command) -> Result<()> {
        self.tx
            .send(cmd)
            .map_err(|_| CoreError::Custom("hydration driver stopped".into()))
    }

    /// Evaluate now instead of waiting for the next tick.
    pub fn tick(&self) -> Result<()> {
        self.send(Command::Tick)
    }

    pub fn confirm(&self, amount_ml: i64) -> Result<()> {
        self.send(Command::Confirm { amount_ml })
    }

    pub fn skip(&self, minutes: i64) -> Result<()> {
        self.send(Command::Skip { minutes })
    }

    pub fn apply_settings(&self, settings: ReminderSettings) -> Result<()> {
        self.send(Command::ApplySettings(settings))
    }

    pub fn end_today(&self) -> Result<()> {
        self.send(Command::EndToday)
    }

    pub fn reset_manual_end(&self) -> Result<()> {
        self.send(Command::ResetManualEnd)
    }

    pub async fn debug_info(&self) -> Result<DebugInfo> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::DebugInfo(reply))?;
        rx.await
            .map_err(|_| CoreError::Custom("hydration driver stopped".into()))?
    }

    /// Close the command channel and wait for the loop to finish.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.join.await {
            warn!("hydration driver task ended abnormally: {e}");
        }
    }
}

use clap::Subcommand;
use std::io::BufRead;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use waterday_core::{
    Config, Driver, DriverHandle, Evaluator, Event, Notifier, Reminder, ReminderResponder, WaterDb,
};

use crate::common::{print_json, CliResult};

#[derive(Subcommand)]
pub enum RemindAction {
    /// Window, progress and pause state as JSON
    ///
    /// Read-only: no evaluation runs, so status reads "unknown" and
    /// next_reminder_at is null. Type `status` into a running `remind run`
    /// for its live schedule.
    Status,
    /// Stop reminders until the next water day starts
    EndToday,
    /// Lift an earlier end-today
    Resume,
    /// Run the reminder loop in the foreground
    ///
    /// Reminders are printed as JSON lines. Answer with c/confirm or s/skip;
    /// status prints diagnostics and q/quit exits.
    Run {
        /// Seconds between evaluations (default: driver.tick_secs)
        #[arg(long)]
        tick_secs: Option<u64>,
        /// Log every suggested amount without asking
        #[arg(long)]
        auto_confirm: bool,
        /// Log scheduler decisions to stderr
        #[arg(long, short)]
        verbose: bool,
    },
}

pub fn run(action: RemindAction) -> CliResult {
    let config = Config::load()?;
    let evaluator = Evaluator::new(Arc::new(WaterDb::open()?), config.reminder_settings())?;

    match action {
        RemindAction::Status => {
            print_json(&evaluator.debug_info()?)?;
        }
        RemindAction::EndToday => {
            print_json(&evaluator.end_today()?)?;
        }
        RemindAction::Resume => {
            print_json(&evaluator.reset_manual_end()?)?;
        }
        RemindAction::Run {
            tick_secs,
            auto_confirm,
            ..
        } => {
            let tick = tick_secs
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or_else(|| config.tick_interval());
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(foreground(evaluator, tick, auto_confirm));
        }
    }
    Ok(())
}

async fn foreground(evaluator: Evaluator, tick: Duration, auto_confirm: bool) {
    let notifier = Arc::new(TerminalNotifier::new(auto_confirm));
    let handle = Driver::new(evaluator, notifier.clone())
        .with_tick(tick)
        .spawn();
    let mut input = spawn_stdin_reader();

    while let Some(line) = input.recv().await {
        match line.trim() {
            "" => {}
            "c" | "confirm" => notifier.answer(true),
            "s" | "skip" => notifier.answer(false),
            "status" => print_status(&handle).await,
            "q" | "quit" => break,
            other => eprintln!("unknown input '{other}' (c/confirm, s/skip, status, q/quit)"),
        }
    }
    handle.shutdown().await;
}

async fn print_status(handle: &DriverHandle) {
    match handle.debug_info().await {
        Ok(info) => {
            if let Err(e) = print_json(&info) {
                eprintln!("error: {e}");
            }
        }
        Err(e) => eprintln!("error: {e}"),
    }
}

/// Lines from stdin; the channel closes at EOF.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Prints events as JSON lines and holds the unanswered reminder.
struct TerminalNotifier {
    auto_confirm: bool,
    pending: Mutex<Option<ReminderResponder>>,
}

impl TerminalNotifier {
    fn new(auto_confirm: bool) -> Self {
        Self {
            auto_confirm,
            pending: Mutex::new(None),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Option<ReminderResponder>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn answer(&self, confirm: bool) {
        let Some(responder) = self.pending().take() else {
            eprintln!("no reminder pending");
            return;
        };
        let result = if confirm {
            responder.confirm()
        } else {
            responder.skip()
        };
        match result {
            Ok(event) => self.event(&event),
            Err(e) => eprintln!("error: {e}"),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, reminder: Reminder) {
        let due = reminder.event();
        if self.auto_confirm {
            print_event(&due);
            match reminder.confirm() {
                Ok(event) => print_event(&event),
                Err(e) => warn!("auto-confirm failed: {e}"),
            }
            return;
        }

        let responder = reminder.into_responder();
        let amount_ml = responder.amount_ml();
        // Store before printing so an answer typed right after the line
        // finds the responder.
        if self.pending().replace(responder).is_some() {
            info!("unanswered reminder superseded");
        }
        print_event(&due);
        eprintln!("drink {amount_ml} ml? [c]onfirm / [s]kip");
    }

    fn event(&self, event: &Event) {
        // Due reminders are printed by notify.
        if !matches!(event, Event::ReminderDue { .. }) {
            print_event(event);
        }
    }
}

fn print_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!("could not serialize event: {e}"),
    }
}

mod driver;
mod evaluator;

pub use driver::{Driver, DriverHandle, Notifier, DEFAULT_TICK};
pub use evaluator::{
    DebugInfo, Evaluation, Evaluator, Reminder, ReminderResponder, SchedulerState, Status,
    NO_GOAL_RETRY_MINUTES,
};

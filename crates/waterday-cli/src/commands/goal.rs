use clap::Subcommand;
use serde_json::json;
use waterday_core::{ValidationError, WaterDb, WaterStore};

use crate::common::{print_json, CliResult};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Show the daily goal
    Show,
    /// Set the daily goal
    Set {
        /// Goal in millilitres
        goal_ml: i64,
    },
}

pub fn run(action: GoalAction) -> CliResult {
    let db = WaterDb::open()?;

    match action {
        GoalAction::Show => {
            print_json(&json!({ "daily_goal_ml": db.daily_goal()? }))?;
        }
        GoalAction::Set { goal_ml } => {
            if goal_ml <= 0 {
                return Err(ValidationError::InvalidValue {
                    field: "daily_goal_ml".to_string(),
                    message: format!("must be positive, got {goal_ml}"),
                }
                .into());
            }
            db.set_daily_goal(goal_ml)?;
            print_json(&json!({ "daily_goal_ml": goal_ml }))?;
        }
    }
    Ok(())
}

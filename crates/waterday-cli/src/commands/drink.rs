use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Subcommand;
use waterday_core::{DailySummary, Event, ValidationError, WaterDb, WaterStore};

use crate::common::{parse_at, parse_date, print_json, today, CliResult};

#[derive(Subcommand)]
pub enum DrinkAction {
    /// Log an intake
    Add {
        /// Amount in millilitres
        amount_ml: i64,
        /// When it was drunk (default: now)
        #[arg(long, value_parser = parse_at)]
        at: Option<NaiveDateTime>,
    },
    /// List intakes for a calendar day
    List {
        /// Day to list (default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Delete an intake by id
    Delete {
        id: String,
    },
    /// Total, goal and progress for a calendar day
    Summary {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

pub fn run(action: DrinkAction) -> CliResult {
    let db = WaterDb::open()?;

    match action {
        DrinkAction::Add { amount_ml, at } => {
            if amount_ml <= 0 {
                return Err(ValidationError::NonPositiveAmount(amount_ml).into());
            }
            let at = at.unwrap_or_else(|| Local::now().naive_local());
            let entry = db.add_entry(amount_ml, at)?;
            print_json(&Event::IntakeLogged { entry })?;
        }
        DrinkAction::List { date } => {
            let entries = db.entries_for_date(date.unwrap_or_else(today))?;
            print_json(&entries)?;
        }
        DrinkAction::Delete { id } => {
            if !db.delete_entry(&id)? {
                return Err(format!("no intake with id {id}").into());
            }
            println!("deleted {id}");
        }
        DrinkAction::Summary { date } => {
            let summary = DailySummary::for_date(&db, date.unwrap_or_else(today))?;
            print_json(&summary)?;
        }
    }
    Ok(())
}

//! Shared helpers for CLI commands.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Parse `YYYY-MM-DD HH:MM` (seconds optional), as typed on the command line.
pub fn parse_at(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| format!("invalid timestamp '{value}', expected YYYY-MM-DD HH:MM"))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

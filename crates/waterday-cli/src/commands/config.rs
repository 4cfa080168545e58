use clap::Subcommand;
use waterday_core::Config;

use crate::common::{print_json, CliResult};

/// Settable keys and what they control.
const KEYS: &[(&str, &str)] = &[
    ("reminders.enabled", "true/false, hydration reminders on or off"),
    ("reminders.interval_minutes", "minutes between reminders"),
    ("reminders.day_start", "start of the water day, HH:MM"),
    (
        "reminders.day_end",
        "end of the water day, HH:MM; earlier than day_start runs past midnight",
    ),
    ("driver.tick_secs", "seconds between evaluations in `remind run`"),
];

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value, e.g. `config get reminders.day_start`
    Get { key: String },
    /// Change one value and write config.toml
    ///
    /// Reminder settings take effect the next time `remind run` starts.
    Set { key: String, value: String },
    /// Print the whole configuration as JSON
    List,
    /// List settable keys with a short description
    Keys,
    /// Overwrite config.toml with the defaults
    Reset,
}

fn key_hint() -> String {
    KEYS.iter().map(|(k, _)| *k).collect::<Vec<_>>().join(", ")
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or_else(|| format!("unknown key '{key}' (one of: {})", key_hint()))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {value}");
        }
        ConfigAction::List => print_json(&Config::load()?)?,
        ConfigAction::Keys => {
            for (key, about) in KEYS {
                println!("{key:<28} {about}");
            }
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("wrote defaults to {}", Config::path()?.display());
        }
    }
    Ok(())
}

//! SQLite-based intake log and scheduler settings.
//!
//! Provides persistent storage for:
//! - Recorded water intake entries
//! - Key-value store for the daily goal and the manual end marker
//!
//! Timestamps are local wall-clock strings with a fixed width, so lexical
//! order in SQL matches chronological order.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::{data_dir, IntakeEntry, WaterStore, DEFAULT_DAILY_GOAL_ML};
use crate::error::StoreError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const GOAL_KEY: &str = "daily_goal_ml";
const MANUAL_END_KEY: &str = "manual_end_until";

fn encode_ts(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn decode_ts(raw: &str) -> Result<NaiveDateTime, StoreError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| StoreError::InvalidTimestamp(raw.to_string()))
}

/// SQLite database for the intake log.
pub struct WaterDb {
    conn: Mutex<Connection>,
}

impl WaterDb {
    /// Open the database at `<data_dir>/waterday.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Self::open_at(dir.join("waterday.db"))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS entries (
            id          TEXT PRIMARY KEY,
            amount_ml   INTEGER NOT NULL,
            recorded_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_entries_recorded_at ON entries(recorded_at);",
    )
}

impl WaterStore for WaterDb {
    fn daily_goal(&self) -> Result<i64, StoreError> {
        match self.kv_get(GOAL_KEY)? {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|e| StoreError::QueryFailed(format!("bad {GOAL_KEY} '{raw}': {e}"))),
            None => Ok(DEFAULT_DAILY_GOAL_ML),
        }
    }

    fn set_daily_goal(&self, goal_ml: i64) -> Result<(), StoreError> {
        self.kv_set(GOAL_KEY, &goal_ml.to_string())
    }

    fn entries_in_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<IntakeEntry>, StoreError> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, amount_ml, recorded_at
             FROM entries
             WHERE recorded_at >= ?1 AND recorded_at < ?2
             ORDER BY recorded_at, rowid",
        )?;
        let rows = stmt.query_map(params![encode_ts(start), encode_ts(end)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, amount_ml, recorded_at) = row?;
            entries.push(IntakeEntry {
                id,
                amount_ml,
                timestamp: decode_ts(&recorded_at)?,
            });
        }
        Ok(entries)
    }

    fn add_entry(
        &self,
        amount_ml: i64,
        timestamp: NaiveDateTime,
    ) -> Result<IntakeEntry, StoreError> {
        if amount_ml <= 0 {
            return Err(StoreError::NonPositiveAmount(amount_ml));
        }
        let entry = IntakeEntry::new(amount_ml, timestamp);
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO entries (id, amount_ml, recorded_at) VALUES (?1, ?2, ?3)",
            params![entry.id, entry.amount_ml, encode_ts(entry.timestamp)],
        )?;
        Ok(entry)
    }

    fn delete_entry(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock()?;
        let removed = conn.execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn manual_end_until(&self) -> Result<Option<NaiveDateTime>, StoreError> {
        self.kv_get(MANUAL_END_KEY)?
            .map(|raw| decode_ts(&raw))
            .transpose()
    }

    fn set_manual_end_until(&self, until: Option<NaiveDateTime>) -> Result<(), StoreError> {
        match until {
            Some(ts) => self.kv_set(MANUAL_END_KEY, &encode_ts(ts)),
            None => self.kv_delete(MANUAL_END_KEY),
        }
    }
}

//! SQLite-backed challenge storage.
//!
//! Provides persistent storage for:
//! - The challenge singleton (start date, freeze window)
//! - One log per calendar day

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::data_dir;
use super::migrations;
use super::repository::ChallengeRepository;
use crate::challenge::{ChallengeState, DayLog, LogRating, LogStatus};
use crate::error::{DatabaseError, Result};

const LOG_COLUMNS: &str =
    "date, target_minutes, completed_minutes, status, rating, note";

fn row_to_log(row: &Row<'_>) -> rusqlite::Result<DayLog> {
    let status: String = row.get(3)?;
    let rating: Option<String> = row.get(4)?;
    Ok(DayLog {
        date: row.get(0)?,
        target_minutes: row.get(1)?,
        completed_minutes: row.get(2)?,
        status: LogStatus::parse_lenient(&status),
        rating: rating.as_deref().and_then(LogRating::parse_lenient),
        note: row.get(5)?,
    })
}

/// SQLite database holding the challenge record and day logs.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/donothing.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("donothing.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Number of stored logs.
    pub fn log_count(&self) -> Result<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM day_logs", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl ChallengeRepository for Database {
    fn state(&self) -> Result<Option<ChallengeState>> {
        let state = self
            .conn
            .query_row(
                "SELECT start_date, freeze_until FROM challenge_state WHERE id = 1",
                [],
                |row| {
                    Ok(ChallengeState {
                        start_date: row.get::<_, Option<NaiveDate>>(0)?,
                        freeze_until: row.get::<_, Option<NaiveDate>>(1)?,
                    })
                },
            )
            .optional()?;
        Ok(state)
    }

    fn save_state(&mut self, state: &ChallengeState) -> Result<()> {
        self.conn.execute(
            "INSERT INTO challenge_state (id, start_date, freeze_until) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                start_date = excluded.start_date,
                freeze_until = excluded.freeze_until",
            params![state.start_date, state.freeze_until],
        )?;
        Ok(())
    }

    fn logs(&self) -> Result<Vec<DayLog>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOG_COLUMNS} FROM day_logs ORDER BY date DESC"
        ))?;
        let logs = stmt
            .query_map([], row_to_log)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(logs)
    }

    fn log_for(&self, date: NaiveDate) -> Result<Option<DayLog>> {
        let log = self
            .conn
            .query_row(
                &format!("SELECT {LOG_COLUMNS} FROM day_logs WHERE date = ?1"),
                params![date],
                row_to_log,
            )
            .optional()?;
        Ok(log)
    }

    fn upsert_log(&mut self, log: &DayLog) -> Result<()> {
        self.conn.execute(
            "INSERT INTO day_logs (date, target_minutes, completed_minutes, status, rating, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(date) DO UPDATE SET
                target_minutes = excluded.target_minutes,
                completed_minutes = excluded.completed_minutes,
                status = excluded.status,
                rating = excluded.rating,
                note = excluded.note",
            params![
                log.date,
                log.target_minutes,
                log.completed_minutes,
                log.status.as_str(),
                log.rating.map(|r| r.as_str()),
                log.note,
            ],
        )?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM day_logs;
             DELETE FROM challenge_state;",
        )?;
        Ok(())
    }

    /// `BEGIN IMMEDIATE` takes the write lock up front, so two processes
    /// evaluating a freeze at once cannot both write it.
    fn atomically<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
        Self: Sized,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    #[test]
    fn empty_database_has_no_state() {
        let db = Database::open_memory().unwrap();
        assert!(db.state().unwrap().is_none());
        assert!(db.logs().unwrap().is_empty());
    }

    #[test]
    fn state_roundtrip() {
        let mut db = Database::open_memory().unwrap();
        let state = ChallengeState {
            start_date: Some(day(1)),
            freeze_until: Some(day(20)),
        };
        db.save_state(&state).unwrap();
        assert_eq!(db.state().unwrap(), Some(state));

        let cleared = ChallengeState::started_on(day(2));
        db.save_state(&cleared).unwrap();
        assert_eq!(db.state().unwrap(), Some(cleared));
    }

    #[test]
    fn upsert_replaces_log_for_same_day() {
        let mut db = Database::open_memory().unwrap();
        db.upsert_log(&DayLog::new(day(3), 10)).unwrap();
        let edited = DayLog::completed(day(3), 10)
            .with_rating(Some(LogRating::Hard))
            .with_note(Some("restless"));
        db.upsert_log(&edited).unwrap();

        assert_eq!(db.log_count().unwrap(), 1);
        assert_eq!(db.log_for(day(3)).unwrap(), Some(edited));
    }

    #[test]
    fn logs_are_newest_first() {
        let mut db = Database::open_memory().unwrap();
        for d in [4, 1, 9] {
            db.upsert_log(&DayLog::new(day(d), 5)).unwrap();
        }
        let dates: Vec<_> = db.logs().unwrap().into_iter().map(|l| l.date).collect();
        assert_eq!(dates, vec![day(9), day(4), day(1)]);
    }

    #[test]
    fn unknown_status_reads_as_missed() {
        let db = Database::open_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO day_logs (date, target_minutes, status, rating) VALUES ('2025-05-07', 5, 'abandoned', 'weird')",
                [],
            )
            .unwrap();
        let log = db.log_for(day(7)).unwrap().unwrap();
        assert_eq!(log.status, LogStatus::Missed);
        assert_eq!(log.rating, None);
    }

    #[test]
    fn clear_inside_transaction_commits() {
        let mut db = Database::open_memory().unwrap();
        db.save_state(&ChallengeState::started_on(day(1))).unwrap();
        db.upsert_log(&DayLog::completed(day(1), 5)).unwrap();

        db.atomically(|db| {
            db.clear()?;
            db.save_state(&ChallengeState::default())
        })
        .unwrap();

        assert_eq!(db.state().unwrap(), Some(ChallengeState::default()));
        assert_eq!(db.log_count().unwrap(), 0);
    }

    #[test]
    fn atomically_rolls_back_on_error() {
        let mut db = Database::open_memory().unwrap();
        let result: Result<()> = db.atomically(|db| {
            db.save_state(&ChallengeState::started_on(day(1)))?;
            Err(CoreError::Custom("boom".into()))
        });
        assert!(result.is_err());
        assert!(db.state().unwrap().is_none());
    }

    #[test]
    fn open_at_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("challenge.db");
        {
            let mut db = Database::open_at(&path).unwrap();
            db.save_state(&ChallengeState::started_on(day(1))).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.state().unwrap().unwrap().start_date, Some(day(1)));
    }
}

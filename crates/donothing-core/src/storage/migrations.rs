//! Database schema migrations.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: challenge singleton and day logs.
///
/// `challenge_state` is pinned to a single row via `CHECK (id = 1)`.
/// `day_logs.date` is an ISO `YYYY-MM-DD` string and the primary key, which
/// enforces one log per calendar day.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS challenge_state (
            id           INTEGER PRIMARY KEY CHECK (id = 1),
            start_date   TEXT,
            freeze_until TEXT
        );

        CREATE TABLE IF NOT EXISTS day_logs (
            date              TEXT PRIMARY KEY,
            target_minutes    INTEGER NOT NULL,
            completed_minutes INTEGER NOT NULL DEFAULT 0,
            status            TEXT NOT NULL DEFAULT 'missed',
            rating            TEXT,
            note              TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_day_logs_rating ON day_logs(rating);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    tracing::debug!(version = 1, "applied schema migration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_sets_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), CURRENT_VERSION);
    }

    #[test]
    fn migrate_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), CURRENT_VERSION);
    }

    #[test]
    fn state_table_rejects_second_row() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn.execute("INSERT INTO challenge_state (id) VALUES (1)", [])
            .unwrap();
        assert!(conn
            .execute("INSERT INTO challenge_state (id) VALUES (2)", [])
            .is_err());
    }
}

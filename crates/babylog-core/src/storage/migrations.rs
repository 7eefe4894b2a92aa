//! Database schema migrations for babylog.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const CURRENT_VERSION: i32 = 3;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v3(conn)?;
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

/// Returns 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    }) {
        Ok(v) => Ok(v),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: babies, feedings, sleeps and the key-value table.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS babies (
            id        TEXT PRIMARY KEY,
            name      TEXT NOT NULL,
            birthday  TEXT NOT NULL,
            gender    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS feedings (
            id                  TEXT PRIMARY KEY,
            baby_id             TEXT NOT NULL REFERENCES babies(id) ON DELETE CASCADE,
            timestamp           TEXT NOT NULL,
            method              TEXT NOT NULL,
            left_duration_secs  INTEGER,
            right_duration_secs INTEGER,
            notes               TEXT
        );

        CREATE TABLE IF NOT EXISTS sleeps (
            id          TEXT PRIMARY KEY,
            baby_id     TEXT NOT NULL REFERENCES babies(id) ON DELETE CASCADE,
            start_time  TEXT NOT NULL,
            end_time    TEXT,
            notes       TEXT
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_feedings_baby_time ON feedings(baby_id, timestamp);
        CREATE INDEX IF NOT EXISTS idx_sleeps_baby_time ON sleeps(baby_id, start_time);",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: bottle volume on feedings.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch("ALTER TABLE feedings ADD COLUMN amount_ml REAL;")?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}

/// Migration v3: diaper changes and growth measurements.
fn migrate_v3(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS diapers (
            id          TEXT PRIMARY KEY,
            baby_id     TEXT NOT NULL REFERENCES babies(id) ON DELETE CASCADE,
            timestamp   TEXT NOT NULL,
            has_wet     INTEGER NOT NULL,
            has_dirty   INTEGER NOT NULL,
            color       TEXT,
            consistency TEXT,
            notes       TEXT
        );

        CREATE TABLE IF NOT EXISTS growth (
            id                    TEXT PRIMARY KEY,
            baby_id               TEXT NOT NULL REFERENCES babies(id) ON DELETE CASCADE,
            timestamp             TEXT NOT NULL,
            weight_g              REAL,
            height_cm             REAL,
            head_circumference_cm REAL,
            temperature_c         REAL,
            notes                 TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_diapers_baby_time ON diapers(baby_id, timestamp);
        CREATE INDEX IF NOT EXISTS idx_growth_baby_time ON growth(baby_id, timestamp);",
    )?;
    set_schema_version(&tx, 3)?;
    tx.commit()
}

//! SQLite-based record storage.
//!
//! Provides persistent storage for:
//! - Baby profiles
//! - Feeding, sleep, diaper and growth records
//! - Key-value store for application state (parked timers, legacy prefs)

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{data_dir, migrations};
use crate::error::{DatabaseError, Result, ValidationError};
use crate::records::{Baby, DiaperRecord, FeedingRecord, GrowthRecord, SleepRecord};

/// Per-day totals for one baby.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub feedings: u64,
    pub feeding_secs: u64,
    pub bottle_ml: f64,
    pub sleeps: u64,
    pub sleep_secs: u64,
    pub diapers: u64,
    pub wet_diapers: u64,
    pub dirty_diapers: u64,
}

/// SQLite database for record storage.
pub struct Database {
    conn: Connection,
}

type FeedingRow = (
    String,
    String,
    String,
    String,
    Option<i64>,
    Option<i64>,
    Option<f64>,
    Option<String>,
);
type SleepRow = (String, String, String, Option<String>, Option<String>);
type DiaperRow = (
    String,
    String,
    String,
    bool,
    bool,
    Option<String>,
    Option<String>,
    Option<String>,
);
type GrowthRow = (
    String,
    String,
    String,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<String>,
);

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/babylog.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("babylog.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) the database at `path`.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, DatabaseError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Run `f` inside one transaction; it commits only when `f` returns `Ok`.
    pub fn in_transaction<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DatabaseError>,
    {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(DatabaseError::from)?;
        let value = f(self)?;
        tx.commit().map_err(DatabaseError::from)?;
        Ok(value)
    }

    // ── Babies ───────────────────────────────────────────────────────

    pub fn add_baby(&self, baby: &Baby) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO babies (id, name, birthday, gender) VALUES (?1, ?2, ?3, ?4)",
            params![
                baby.id.to_string(),
                baby.name,
                baby.birthday.to_string(),
                baby.gender.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn list_babies(&self) -> Result<Vec<Baby>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, birthday, gender FROM babies ORDER BY birthday, name")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        rows.map(|row| baby_from_row(row?)).collect()
    }

    pub fn get_baby(&self, id: Uuid) -> Result<Option<Baby>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, birthday, gender FROM babies WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;
        row.map(baby_from_row).transpose()
    }

    // ── Records ──────────────────────────────────────────────────────

    /// Insert a feeding record.
    ///
    /// # Errors
    /// [`ValidationError::UnknownBaby`] if the baby does not exist, or
    /// [`ValidationError::InvalidValue`] for a negative or non-finite amount.
    pub fn record_feeding(&self, record: &FeedingRecord) -> Result<()> {
        self.require_baby(record.baby_id)?;
        if let Some(ml) = record.amount_ml {
            if !ml.is_finite() || ml < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: "amount_ml".into(),
                    message: format!("{ml} is not a valid volume"),
                }
                .into());
            }
        }
        self.conn.execute(
            "INSERT INTO feedings
                (id, baby_id, timestamp, method, left_duration_secs, right_duration_secs, amount_ml, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.id.to_string(),
                record.baby_id.to_string(),
                sql_time(record.timestamp),
                record.method.as_str(),
                record.left_duration_secs.map(secs_to_sql),
                record.right_duration_secs.map(secs_to_sql),
                record.amount_ml,
                record.notes,
            ],
        )?;
        Ok(())
    }

    /// Insert a sleep record.
    ///
    /// # Errors
    /// [`ValidationError::UnknownBaby`] if the baby does not exist, or
    /// [`ValidationError::InvalidTimeRange`] if it ends before it starts.
    pub fn record_sleep(&self, record: &SleepRecord) -> Result<()> {
        self.require_baby(record.baby_id)?;
        if let Some(end) = record.end_time {
            if end < record.start_time {
                return Err(ValidationError::InvalidTimeRange {
                    start: record.start_time,
                    end,
                }
                .into());
            }
        }
        self.conn.execute(
            "INSERT INTO sleeps (id, baby_id, start_time, end_time, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id.to_string(),
                record.baby_id.to_string(),
                sql_time(record.start_time),
                record.end_time.map(sql_time),
                record.notes,
            ],
        )?;
        Ok(())
    }

    /// Insert a diaper change.
    pub fn record_diaper(&self, record: &DiaperRecord) -> Result<()> {
        self.require_baby(record.baby_id)?;
        self.conn.execute(
            "INSERT INTO diapers (id, baby_id, timestamp, has_wet, has_dirty, color, consistency, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.id.to_string(),
                record.baby_id.to_string(),
                sql_time(record.timestamp),
                record.has_wet,
                record.has_dirty,
                record.color.map(|c| c.as_str()),
                record.consistency.map(|c| c.as_str()),
                record.notes,
            ],
        )?;
        Ok(())
    }

    /// Insert a growth measurement.
    ///
    /// # Errors
    /// [`ValidationError::InvalidValue`] when nothing was measured or a
    /// measurement is not a positive finite number.
    pub fn record_growth(&self, record: &GrowthRecord) -> Result<()> {
        self.require_baby(record.baby_id)?;
        if !record.has_measurement() {
            return Err(ValidationError::InvalidValue {
                field: "measurements".into(),
                message: "at least one measurement is required".into(),
            }
            .into());
        }
        for (field, value) in record.measurements() {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(ValidationError::InvalidValue {
                        field: field.into(),
                        message: format!("{v} is not a valid measurement"),
                    }
                    .into());
                }
            }
        }
        self.conn.execute(
            "INSERT INTO growth
                (id, baby_id, timestamp, weight_g, height_cm, head_circumference_cm, temperature_c, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.id.to_string(),
                record.baby_id.to_string(),
                sql_time(record.timestamp),
                record.weight_g,
                record.height_cm,
                record.head_circumference_cm,
                record.temperature_c,
                record.notes,
            ],
        )?;
        Ok(())
    }

    /// Feedings for `baby_id`, newest first.
    pub fn feedings_for(
        &self,
        baby_id: Uuid,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<FeedingRecord>, DatabaseError> {
        self.feedings_between(baby_id, since, None, limit)
    }

    /// Sleeps for `baby_id`, newest first.
    pub fn sleeps_for(
        &self,
        baby_id: Uuid,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<SleepRecord>, DatabaseError> {
        self.sleeps_between(baby_id, since, None, limit)
    }

    /// Diaper changes for `baby_id`, newest first.
    pub fn diapers_for(
        &self,
        baby_id: Uuid,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<DiaperRecord>, DatabaseError> {
        self.diapers_between(baby_id, since, None, limit)
    }

    /// Growth measurements for `baby_id`, newest first.
    pub fn growth_for(
        &self,
        baby_id: Uuid,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<GrowthRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, baby_id, timestamp, weight_g, height_cm, head_circumference_cm, temperature_c, notes
             FROM growth
             WHERE baby_id = ?1
               AND (?2 IS NULL OR timestamp >= ?2)
             ORDER BY timestamp DESC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![baby_id.to_string(), since.map(sql_time), sql_limit(limit)],
            |row| -> rusqlite::Result<GrowthRow> {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ))
            },
        )?;
        rows.map(|row| growth_from_row(row?)).collect()
    }

    /// Totals for the UTC calendar day `day`. Sleeps count toward the day
    /// they started on; open sleeps are counted but contribute no time.
    pub fn daily_summary(&self, baby_id: Uuid, day: NaiveDate) -> Result<DailySummary, DatabaseError> {
        let start = day.and_time(NaiveTime::MIN).and_utc();
        let end = start + chrono::Duration::days(1);

        let mut summary = DailySummary::default();
        for feeding in self.feedings_between(baby_id, Some(start), Some(end), None)? {
            summary.feedings += 1;
            summary.feeding_secs += feeding.total_duration_secs();
            summary.bottle_ml += feeding.amount_ml.unwrap_or(0.0);
        }
        for sleep in self.sleeps_between(baby_id, Some(start), Some(end), None)? {
            summary.sleeps += 1;
            if sleep.end_time.is_some() {
                summary.sleep_secs +=
                    u64::try_from(sleep.duration_at(end).num_seconds()).unwrap_or(0);
            }
        }
        for diaper in self.diapers_between(baby_id, Some(start), Some(end), None)? {
            summary.diapers += 1;
            summary.wet_diapers += u64::from(diaper.has_wet);
            summary.dirty_diapers += u64::from(diaper.has_dirty);
        }
        Ok(summary)
    }

    fn feedings_between(
        &self,
        baby_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<FeedingRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, baby_id, timestamp, method, left_duration_secs, right_duration_secs, amount_ml, notes
             FROM feedings
             WHERE baby_id = ?1
               AND (?2 IS NULL OR timestamp >= ?2)
               AND (?3 IS NULL OR timestamp < ?3)
             ORDER BY timestamp DESC
             LIMIT ?4",
        )?;
        let rows = stmt.query_map(
            params![
                baby_id.to_string(),
                from.map(sql_time),
                to.map(sql_time),
                sql_limit(limit),
            ],
            |row| -> rusqlite::Result<FeedingRow> {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ))
            },
        )?;
        rows.map(|row| feeding_from_row(row?)).collect()
    }

    fn sleeps_between(
        &self,
        baby_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<SleepRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, baby_id, start_time, end_time, notes
             FROM sleeps
             WHERE baby_id = ?1
               AND (?2 IS NULL OR start_time >= ?2)
               AND (?3 IS NULL OR start_time < ?3)
             ORDER BY start_time DESC
             LIMIT ?4",
        )?;
        let rows = stmt.query_map(
            params![
                baby_id.to_string(),
                from.map(sql_time),
                to.map(sql_time),
                sql_limit(limit),
            ],
            |row| -> rusqlite::Result<SleepRow> {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            },
        )?;
        rows.map(|row| sleep_from_row(row?)).collect()
    }

    fn diapers_between(
        &self,
        baby_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<DiaperRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, baby_id, timestamp, has_wet, has_dirty, color, consistency, notes
             FROM diapers
             WHERE baby_id = ?1
               AND (?2 IS NULL OR timestamp >= ?2)
               AND (?3 IS NULL OR timestamp < ?3)
             ORDER BY timestamp DESC
             LIMIT ?4",
        )?;
        let rows = stmt.query_map(
            params![
                baby_id.to_string(),
                from.map(sql_time),
                to.map(sql_time),
                sql_limit(limit),
            ],
            |row| -> rusqlite::Result<DiaperRow> {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ))
            },
        )?;
        rows.map(|row| diaper_from_row(row?)).collect()
    }

    fn require_baby(&self, id: Uuid) -> Result<()> {
        if self.get_baby(id)?.is_none() {
            return Err(ValidationError::UnknownBaby(id.to_string()).into());
        }
        Ok(())
    }

    // ── Key-value ────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key; missing keys are not an error.
    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

// ── Row decoding ─────────────────────────────────────────────────────

fn corrupt(table: &str, message: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::CorruptRow {
        table: table.to_string(),
        message: message.to_string(),
    }
}

fn parse_uuid(table: &str, raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| corrupt(table, e))
}

fn parse_time(table: &str, raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt(table, e))
}

fn parse_secs(table: &str, raw: Option<i64>) -> Result<Option<u64>, DatabaseError> {
    raw.map(|v| u64::try_from(v).map_err(|e| corrupt(table, e)))
        .transpose()
}

/// Fixed-width UTC timestamps so range filters can compare text.
fn sql_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn secs_to_sql(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}

/// SQLite treats a negative LIMIT as "no limit".
fn sql_limit(limit: Option<usize>) -> i64 {
    limit.and_then(|l| i64::try_from(l).ok()).unwrap_or(-1)
}

fn baby_from_row(
    (id, name, birthday, gender): (String, String, String, String),
) -> Result<Baby, DatabaseError> {
    Ok(Baby {
        id: parse_uuid("babies", &id)?,
        name,
        birthday: birthday
            .parse::<NaiveDate>()
            .map_err(|e| corrupt("babies", e))?,
        gender: gender.parse().map_err(|e: String| corrupt("babies", e))?,
    })
}

fn feeding_from_row(row: FeedingRow) -> Result<FeedingRecord, DatabaseError> {
    let (id, baby_id, timestamp, method, left, right, amount_ml, notes) = row;
    Ok(FeedingRecord {
        id: parse_uuid("feedings", &id)?,
        baby_id: parse_uuid("feedings", &baby_id)?,
        timestamp: parse_time("feedings", &timestamp)?,
        method: method.parse().map_err(|e: String| corrupt("feedings", e))?,
        left_duration_secs: parse_secs("feedings", left)?,
        right_duration_secs: parse_secs("feedings", right)?,
        amount_ml,
        notes,
    })
}

fn sleep_from_row(row: SleepRow) -> Result<SleepRecord, DatabaseError> {
    let (id, baby_id, start_time, end_time, notes) = row;
    Ok(SleepRecord {
        id: parse_uuid("sleeps", &id)?,
        baby_id: parse_uuid("sleeps", &baby_id)?,
        start_time: parse_time("sleeps", &start_time)?,
        end_time: end_time
            .as_deref()
            .map(|t| parse_time("sleeps", t))
            .transpose()?,
        notes,
    })
}

fn diaper_from_row(row: DiaperRow) -> Result<DiaperRecord, DatabaseError> {
    let (id, baby_id, timestamp, has_wet, has_dirty, color, consistency, notes) = row;
    Ok(DiaperRecord {
        id: parse_uuid("diapers", &id)?,
        baby_id: parse_uuid("diapers", &baby_id)?,
        timestamp: parse_time("diapers", &timestamp)?,
        has_wet,
        has_dirty,
        color: color
            .map(|c| c.parse().map_err(|e: String| corrupt("diapers", e)))
            .transpose()?,
        consistency: consistency
            .map(|c| c.parse().map_err(|e: String| corrupt("diapers", e)))
            .transpose()?,
        notes,
    })
}

fn growth_from_row(row: GrowthRow) -> Result<GrowthRecord, DatabaseError> {
    let (id, baby_id, timestamp, weight_g, height_cm, head_circumference_cm, temperature_c, notes) =
        row;
    Ok(GrowthRecord {
        id: parse_uuid("growth", &id)?,
        baby_id: parse_uuid("growth", &baby_id)?,
        timestamp: parse_time("growth", &timestamp)?,
        weight_g,
        height_cm,
        head_circumference_cm,
        temperature_c,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::records::{FeedingMethod, Gender, StoolColor, StoolConsistency};
    use chrono::{Duration, TimeZone};

    fn baby(db: &Database) -> Baby {
        let baby = Baby::new(
            "Mia",
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            Gender::Female,
        );
        db.add_baby(&baby).unwrap();
        baby
    }

    #[test]
    fn babies_roundtrip() {
        let db = Database::open_memory().unwrap();
        let mia = baby(&db);
        assert_eq!(db.list_babies().unwrap(), vec![mia.clone()]);
        assert_eq!(db.get_baby(mia.id).unwrap(), Some(mia));
        assert!(db.get_baby(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn record_and_query_feedings() {
        let db = Database::open_memory().unwrap();
        let mia = baby(&db);
        let t = Utc.with_ymd_and_hms(2026, 2, 10, 6, 0, 0).unwrap();

        let mut first = FeedingRecord::new(mia.id, t, FeedingMethod::Breastfeeding);
        first.left_duration_secs = Some(300);
        first.right_duration_secs = Some(420);
        let mut second = FeedingRecord::new(mia.id, t + Duration::hours(3), FeedingMethod::Bottle);
        second.amount_ml = Some(90.0);
        second.notes = Some("after bath".into());
        db.record_feeding(&first).unwrap();
        db.record_feeding(&second).unwrap();

        let all = db.feedings_for(mia.id, None, None).unwrap();
        assert_eq!(all, vec![second.clone(), first.clone()]);

        let latest = db.feedings_for(mia.id, None, Some(1)).unwrap();
        assert_eq!(latest, vec![second.clone()]);

        let since = db
            .feedings_for(mia.id, Some(t + Duration::hours(1)), None)
            .unwrap();
        assert_eq!(since, vec![second]);
    }

    #[test]
    fn feeding_for_unknown_baby_is_rejected() {
        let db = Database::open_memory().unwrap();
        let record = FeedingRecord::new(Uuid::new_v4(), Utc::now(), FeedingMethod::Bottle);
        assert!(matches!(
            db.record_feeding(&record),
            Err(CoreError::Validation(ValidationError::UnknownBaby(_)))
        ));
    }

    #[test]
    fn sleep_ending_before_start_is_rejected() {
        let db = Database::open_memory().unwrap();
        let mia = baby(&db);
        let t = Utc::now();
        let mut record = SleepRecord::new(mia.id, t);
        record.end_time = Some(t - Duration::minutes(1));
        assert!(matches!(
            db.record_sleep(&record),
            Err(CoreError::Validation(ValidationError::InvalidTimeRange { .. }))
        ));
    }

    #[test]
    fn daily_summary_totals() {
        let db = Database::open_memory().unwrap();
        let mia = baby(&db);
        let day = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let t = day.and_hms_opt(6, 0, 0).unwrap().and_utc();

        let mut feed = FeedingRecord::new(mia.id, t, FeedingMethod::Breastfeeding);
        feed.left_duration_secs = Some(600);
        feed.right_duration_secs = Some(300);
        db.record_feeding(&feed).unwrap();
        let mut bottle = FeedingRecord::new(mia.id, t + Duration::hours(2), FeedingMethod::Bottle);
        bottle.amount_ml = Some(120.0);
        db.record_feeding(&bottle).unwrap();
        // Next day; excluded.
        db.record_feeding(&FeedingRecord::new(
            mia.id,
            t + Duration::days(1),
            FeedingMethod::Bottle,
        ))
        .unwrap();

        let mut nap = SleepRecord::new(mia.id, t + Duration::hours(4));
        nap.end_time = Some(t + Duration::hours(5) + Duration::minutes(30));
        db.record_sleep(&nap).unwrap();
        db.record_sleep(&SleepRecord::new(mia.id, t + Duration::hours(10)))
            .unwrap();

        let summary = db.daily_summary(mia.id, day).unwrap();
        assert_eq!(summary.feedings, 2);
        assert_eq!(summary.feeding_secs, 900);
        assert_eq!(summary.bottle_ml, 120.0);
        assert_eq!(summary.sleeps, 2);
        assert_eq!(summary.sleep_secs, 90 * 60);
        assert_eq!(summary.diapers, 0);
    }

    #[test]
    fn negative_bottle_amount_is_rejected() {
        let db = Database::open_memory().unwrap();
        let mia = baby(&db);
        let mut record = FeedingRecord::new(mia.id, Utc::now(), FeedingMethod::Bottle);
        record.amount_ml = Some(-5.0);
        assert!(matches!(
            db.record_feeding(&record),
            Err(CoreError::Validation(ValidationError::InvalidValue { .. }))
        ));
        assert!(db.feedings_for(mia.id, None, None).unwrap().is_empty());
    }

    #[test]
    fn diapers_roundtrip_and_count_toward_the_day() {
        let db = Database::open_memory().unwrap();
        let mia = baby(&db);
        let day = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let t = day.and_hms_opt(7, 0, 0).unwrap().and_utc();

        let mut dirty = DiaperRecord::new(mia.id, t, true, true);
        dirty.color = Some(StoolColor::Yellow);
        dirty.consistency = Some(StoolConsistency::Loose);
        dirty.notes = Some("after feed".into());
        db.record_diaper(&dirty).unwrap();
        db.record_diaper(&DiaperRecord::new(mia.id, t + Duration::hours(2), true, false))
            .unwrap();
        db.record_diaper(&DiaperRecord::new(mia.id, t + Duration::hours(4), true, false))
            .unwrap();
        db.record_diaper(&DiaperRecord::new(mia.id, t + Duration::hours(6), false, true))
            .unwrap();
        db.record_diaper(&DiaperRecord::new(mia.id, t + Duration::days(1), true, false))
            .unwrap();

        let all = db.diapers_for(mia.id, None, None).unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all.last(), Some(&dirty));

        let summary = db.daily_summary(mia.id, day).unwrap();
        assert_eq!(summary.diapers, 4);
        assert_eq!(summary.wet_diapers, 3);
        assert_eq!(summary.dirty_diapers, 2);
    }

    #[test]
    fn growth_roundtrip_and_validation() {
        let db = Database::open_memory().unwrap();
        let mia = baby(&db);
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();

        let mut visit = GrowthRecord::new(mia.id, t);
        visit.weight_g = Some(4_850.0);
        visit.height_cm = Some(56.5);
        visit.temperature_c = Some(36.9);
        db.record_growth(&visit).unwrap();
        assert_eq!(db.growth_for(mia.id, None, None).unwrap(), vec![visit]);

        let empty = GrowthRecord::new(mia.id, t);
        assert!(matches!(
            db.record_growth(&empty),
            Err(CoreError::Validation(ValidationError::InvalidValue { .. }))
        ));

        let mut negative = GrowthRecord::new(mia.id, t);
        negative.height_cm = Some(-1.0);
        assert!(matches!(
            db.record_growth(&negative),
            Err(CoreError::Validation(ValidationError::InvalidValue { field, .. })) if field == "height_cm"
        ));
        assert_eq!(db.growth_for(mia.id, None, None).unwrap().len(), 1);
    }

    #[test]
    fn transaction_commits_on_ok() {
        let db = Database::open_memory().unwrap();
        let mia = baby(&db);
        let record = FeedingRecord::new(mia.id, Utc::now(), FeedingMethod::Bottle);
        db.in_transaction(|db| -> Result<()> {
            db.record_feeding(&record)?;
            db.kv_set("feeding_timer", "{}")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(db.feedings_for(mia.id, None, None).unwrap().len(), 1);
        assert_eq!(db.kv_get("feeding_timer").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn transaction_rolls_back_every_write_on_err() {
        let db = Database::open_memory().unwrap();
        let mia = baby(&db);
        db.kv_set("feeding_timer", "stopped").unwrap();
        let record = FeedingRecord::new(mia.id, Utc::now(), FeedingMethod::Bottle);

        let result = db.in_transaction(|db| -> Result<()> {
            db.record_feeding(&record)?;
            db.kv_set("feeding_timer", "idle")?;
            Err(DatabaseError::Locked.into())
        });
        assert!(result.is_err());
        assert!(db.feedings_for(mia.id, None, None).unwrap().is_empty());
        assert_eq!(db.kv_get("feeding_timer").unwrap().as_deref(), Some("stopped"));
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn reopen_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("babylog.db");
        let id = {
            let db = Database::open_at(&path).unwrap();
            baby(&db).id
        };
        let db = Database::open_at(&path).unwrap();
        assert!(db.get_baby(id).unwrap().is_some());
    }
}

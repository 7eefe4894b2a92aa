//! Integration tests across timers, records and on-disk storage.

use std::sync::Arc;

use babylog_core::auth::{
    AuthGate, ConfigAuthSettings, DatabaseLegacyStore, LegacyPreferenceStore,
    MemoryCredentialStore, UnavailableBiometrics, LEGACY_PASSCODE_KEY,
};
use babylog_core::{
    Baby, Config, Database, FeedingMethod, FeedingRecord, Gender, Side, SleepRecord, SleepTimer,
    TimerEngine,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};

fn setup_db() -> (tempfile::TempDir, Database, Baby) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(&dir.path().join("babylog.db")).unwrap();
    let baby = Baby::new("Noah", NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(), Gender::Male);
    db.add_baby(&baby).unwrap();
    (dir, db, baby)
}

#[test]
fn test_feeding_session_saved_as_record() {
    let (_dir, db, baby) = setup_db();
    let t0 = Utc.with_ymd_and_hms(2026, 2, 14, 3, 0, 0).unwrap();

    let mut engine = TimerEngine::new();
    engine.start_at(Side::Right, t0);
    engine.switch_side_at(t0 + Duration::minutes(7));
    engine.stop_at(t0 + Duration::minutes(12) + Duration::milliseconds(400));

    let session = engine.finish().unwrap();
    let record = FeedingRecord::from_session(baby.id, &session);
    db.record_feeding(&record).unwrap();

    let stored = db.feedings_for(baby.id, None, None).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].timestamp, t0);
    assert_eq!(stored[0].method, FeedingMethod::Breastfeeding);
    assert_eq!(stored[0].right_duration_secs, Some(420));
    assert_eq!(stored[0].left_duration_secs, Some(300));

    let summary = db.daily_summary(baby.id, t0.date_naive()).unwrap();
    assert_eq!(summary.feedings, 1);
    assert_eq!(summary.feeding_secs, 720);
}

#[test]
fn test_sleep_session_saved_as_record() {
    let (_dir, db, baby) = setup_db();
    let t0 = Utc.with_ymd_and_hms(2026, 2, 14, 13, 0, 0).unwrap();

    let mut sleep = SleepTimer::new();
    sleep.start_at(t0);
    sleep.pause_at(t0 + Duration::minutes(30));
    sleep.resume_at(t0 + Duration::minutes(40));
    sleep.stop_at(t0 + Duration::minutes(70));

    let record = SleepRecord::from_session(baby.id, &sleep.finish().unwrap());
    db.record_sleep(&record).unwrap();

    let stored = db.sleeps_for(baby.id, None, None).unwrap();
    assert_eq!(stored, vec![record]);
    assert_eq!(stored[0].end_time, Some(t0 + Duration::minutes(60)));

    let summary = db.daily_summary(baby.id, t0.date_naive()).unwrap();
    assert_eq!(summary.sleeps, 1);
    assert_eq!(summary.sleep_secs, 3_600);
}

#[test]
fn test_parked_timer_roundtrips_through_kv() {
    let (_dir, db, _baby) = setup_db();
    let t0 = Utc.with_ymd_and_hms(2026, 2, 14, 5, 0, 0).unwrap();

    let mut engine = TimerEngine::new();
    engine.start_at(Side::Left, t0);
    db.kv_set("feeding_timer", &serde_json::to_string(&engine).unwrap())
        .unwrap();

    let raw = db.kv_get("feeding_timer").unwrap().unwrap();
    let restored: TimerEngine = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        restored.current_duration_ms_at(Side::Left, t0 + Duration::seconds(90)),
        90_000
    );
}

#[test]
fn test_gate_with_on_disk_stores() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("babylog.db");
    let config_path = dir.path().join("config.toml");

    {
        let db = Database::open_at(&db_path).unwrap();
        db.kv_set(LEGACY_PASSCODE_KEY, "5678").unwrap();
    }
    let mut config = Config::default();
    config.security.lock_enabled = true;
    config.security.use_passcode = true;
    config.timer.refresh_interval_ms = 250;
    config.save_to(&config_path).unwrap();

    let legacy = Arc::new(DatabaseLegacyStore::open_at(&db_path).unwrap());
    let credentials = Arc::new(MemoryCredentialStore::new());
    let mut gate = AuthGate::new(
        credentials.clone(),
        legacy.clone(),
        Arc::new(UnavailableBiometrics),
        Arc::new(ConfigAuthSettings::new(&config_path)),
    )
    .unwrap();

    assert!(gate.verify_passcode("5678").unwrap());
    assert!(legacy.get_string(LEGACY_PASSCODE_KEY).unwrap().is_none());
    assert_eq!(credentials.len(), 1);

    gate.remove_passcode().unwrap();
    let reloaded = Config::load_from(&config_path).unwrap();
    assert!(reloaded.security.lock_enabled);
    assert!(!reloaded.security.use_passcode);
    // Other sections are untouched by lock changes.
    assert_eq!(reloaded.timer.refresh_interval_ms, 250);
    assert!(credentials.is_empty());
}

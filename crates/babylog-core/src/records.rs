//! Record types handed to persistence.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::format::{format_clock, format_hours_minutes};
use crate::timer::CompletedSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baby {
    pub id: Uuid,
    pub name: String,
    pub birthday: NaiveDate,
    pub gender: Gender,
}

impl Baby {
    pub fn new(name: impl Into<String>, birthday: NaiveDate, gender: Gender) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            birthday,
            gender,
        }
    }

    /// Whole days since birth; zero for a birthday in the future.
    pub fn age_in_days(&self, today: NaiveDate) -> u32 {
        u32::try_from((today - self.birthday).num_days()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedingMethod {
    Breastfeeding,
    Bottle,
    Mixed,
}

impl FeedingMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedingMethod::Breastfeeding => "breastfeeding",
            FeedingMethod::Bottle => "bottle",
            FeedingMethod::Mixed => "mixed",
        }
    }
}

impl std::str::FromStr for FeedingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breastfeeding" => Ok(FeedingMethod::Breastfeeding),
            "bottle" => Ok(FeedingMethod::Bottle),
            "mixed" => Ok(FeedingMethod::Mixed),
            other => Err(format!("unknown feeding method '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingRecord {
    pub id: Uuid,
    pub baby_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub method: FeedingMethod,
    pub left_duration_secs: Option<u64>,
    pub right_duration_secs: Option<u64>,
    pub amount_ml: Option<f64>,
    pub notes: Option<String>,
}

impl FeedingRecord {
    pub fn new(baby_id: Uuid, timestamp: DateTime<Utc>, method: FeedingMethod) -> Self {
        Self {
            id: Uuid::new_v4(),
            baby_id,
            timestamp,
            method,
            left_duration_secs: None,
            right_duration_secs: None,
            amount_ml: None,
            notes: None,
        }
    }

    /// Breastfeeding record from a stopped timer. Seconds are truncated.
    pub fn from_session(baby_id: Uuid, session: &CompletedSession) -> Self {
        let mut record = Self::new(baby_id, session.started_at, FeedingMethod::Breastfeeding);
        record.left_duration_secs = Some(session.durations.left_ms / 1000);
        record.right_duration_secs = Some(session.durations.right_ms / 1000);
        record
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.left_duration_secs.unwrap_or(0) + self.right_duration_secs.unwrap_or(0)
    }

    pub fn duration_text(&self) -> String {
        format_clock(self.total_duration_secs() * 1000)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepRecord {
    pub id: Uuid,
    pub baby_id: Uuid,
    pub start_time: DateTime<Utc>,
    /// `None` while the baby is still asleep.
    pub end_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl SleepRecord {
    pub fn new(baby_id: Uuid, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            baby_id,
            start_time,
            end_time: None,
            notes: None,
        }
    }

    /// Record from a stopped sleep timer.
    ///
    /// The end is placed at start + timed duration, so paused stretches do
    /// not count as sleep.
    pub fn from_session(baby_id: Uuid, session: &CompletedSession) -> Self {
        let timed = Duration::milliseconds(
            i64::try_from(session.durations.total_ms()).unwrap_or(i64::MAX),
        );
        let mut record = Self::new(baby_id, session.started_at);
        record.end_time = Some(session.started_at + timed);
        record
    }

    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Open records run until `now`.
    pub fn duration_at(&self, now: DateTime<Utc>) -> Duration {
        let end = self.end_time.unwrap_or(now);
        (end - self.start_time).max(Duration::zero())
    }

    pub fn duration_text_at(&self, now: DateTime<Utc>) -> String {
        let ms = u64::try_from(self.duration_at(now).num_milliseconds()).unwrap_or(0);
        format_hours_minutes(ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoolColor {
    Yellow,
    Green,
    Brown,
    Black,
    White,
}

impl StoolColor {
    pub fn as_str(self) -> &'static str {
        match self {
            StoolColor::Yellow => "yellow",
            StoolColor::Green => "green",
            StoolColor::Brown => "brown",
            StoolColor::Black => "black",
            StoolColor::White => "white",
        }
    }
}

impl std::str::FromStr for StoolColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yellow" => Ok(StoolColor::Yellow),
            "green" => Ok(StoolColor::Green),
            "brown" => Ok(StoolColor::Brown),
            "black" => Ok(StoolColor::Black),
            "white" => Ok(StoolColor::White),
            other => Err(format!("unknown stool color '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoolConsistency {
    Watery,
    Loose,
    Normal,
    Hard,
}

impl StoolConsistency {
    pub fn as_str(self) -> &'static str {
        match self {
            StoolConsistency::Watery => "watery",
            StoolConsistency::Loose => "loose",
            StoolConsistency::Normal => "normal",
            StoolConsistency::Hard => "hard",
        }
    }
}

impl std::str::FromStr for StoolConsistency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "watery" => Ok(StoolConsistency::Watery),
            "loose" => Ok(StoolConsistency::Loose),
            "normal" => Ok(StoolConsistency::Normal),
            "hard" => Ok(StoolConsistency::Hard),
            other => Err(format!("unknown stool consistency '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaperRecord {
    pub id: Uuid,
    pub baby_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub has_wet: bool,
    pub has_dirty: bool,
    pub color: Option<StoolColor>,
    pub consistency: Option<StoolConsistency>,
    pub notes: Option<String>,
}

impl DiaperRecord {
    pub fn new(baby_id: Uuid, timestamp: DateTime<Utc>, has_wet: bool, has_dirty: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            baby_id,
            timestamp,
            has_wet,
            has_dirty,
            color: None,
            consistency: None,
            notes: None,
        }
    }

    pub fn type_description(&self) -> &'static str {
        match (self.has_wet, self.has_dirty) {
            (true, true) => "wet + dirty",
            (false, true) => "dirty",
            (true, false) => "wet",
            (false, false) => "dry",
        }
    }
}

/// Body temperature bands used for warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureStatus {
    Low,
    Normal,
    Elevated,
    Fever,
}

impl TemperatureStatus {
    pub fn classify(celsius: f64) -> Self {
        if celsius < 35.5 {
            TemperatureStatus::Low
        } else if celsius < 37.5 {
            TemperatureStatus::Normal
        } else if celsius < 38.0 {
            TemperatureStatus::Elevated
        } else {
            TemperatureStatus::Fever
        }
    }
}

/// A measurement visit. Any subset of the measurements may be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRecord {
    pub id: Uuid,
    pub baby_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub weight_g: Option<f64>,
    pub height_cm: Option<f64>,
    pub head_circumference_cm: Option<f64>,
    pub temperature_c: Option<f64>,
    pub notes: Option<String>,
}

impl GrowthRecord {
    pub fn new(baby_id: Uuid, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            baby_id,
            timestamp,
            weight_g: None,
            height_cm: None,
            head_circumference_cm: None,
            temperature_c: None,
            notes: None,
        }
    }

    pub fn has_measurement(&self) -> bool {
        self.weight_g.is_some()
            || self.height_cm.is_some()
            || self.head_circumference_cm.is_some()
            || self.temperature_c.is_some()
    }

    /// Outside 1-15 kg.
    pub fn weight_is_abnormal(&self) -> bool {
        self.weight_g
            .is_some_and(|g| !(1_000.0..=15_000.0).contains(&g))
    }

    pub fn temperature_status(&self) -> Option<TemperatureStatus> {
        self.temperature_c.map(TemperatureStatus::classify)
    }

    /// Measurements as `(field, value)` pairs, for validation.
    pub fn measurements(&self) -> [(&'static str, Option<f64>); 4] {
        [
            ("weight_g", self.weight_g),
            ("height_cm", self.height_cm),
            ("head_circumference_cm", self.head_circumference_cm),
            ("temperature_c", self.temperature_c),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SideDurations;
    use chrono::TimeZone;

    fn session(left_ms: u64, right_ms: u64) -> CompletedSession {
        let start = Utc.with_ymd_and_hms(2026, 2, 10, 6, 0, 0).unwrap();
        CompletedSession {
            durations: SideDurations { left_ms, right_ms },
            started_at: start,
            ended_at: start + Duration::hours(3),
        }
    }

    #[test]
    fn feeding_from_session_truncates_seconds() {
        let baby = Uuid::new_v4();
        let record = FeedingRecord::from_session(baby, &session(300_999, 420_500));
        assert_eq!(record.baby_id, baby);
        assert_eq!(record.method, FeedingMethod::Breastfeeding);
        assert_eq!(record.left_duration_secs, Some(300));
        assert_eq!(record.right_duration_secs, Some(420));
        assert_eq!(record.total_duration_secs(), 720);
        assert_eq!(record.duration_text(), "12:00");
    }

    #[test]
    fn bottle_feeding_has_no_duration() {
        let record = FeedingRecord::new(Uuid::new_v4(), Utc::now(), FeedingMethod::Bottle);
        assert_eq!(record.total_duration_secs(), 0);
    }

    #[test]
    fn sleep_from_session_uses_timed_duration() {
        let s = session(90 * 60_000, 0);
        let record = SleepRecord::from_session(Uuid::new_v4(), &s);
        assert!(!record.is_active());
        assert_eq!(record.end_time, Some(s.started_at + Duration::minutes(90)));
        assert_eq!(record.duration_text_at(Utc::now()), "1:30");
    }

    #[test]
    fn open_sleep_runs_until_now() {
        let start = Utc.with_ymd_and_hms(2026, 2, 10, 20, 0, 0).unwrap();
        let record = SleepRecord::new(Uuid::new_v4(), start);
        assert!(record.is_active());
        assert_eq!(
            record.duration_at(start + Duration::minutes(45)),
            Duration::minutes(45)
        );
        assert_eq!(record.duration_at(start - Duration::minutes(5)), Duration::zero());
    }

    #[test]
    fn baby_age() {
        let baby = Baby::new(
            "Mia",
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            Gender::Female,
        );
        assert_eq!(baby.age_in_days(NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()), 40);
        assert_eq!(baby.age_in_days(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()), 0);
    }

    #[test]
    fn diaper_description() {
        let baby = Uuid::new_v4();
        let now = Utc::now();
        assert_eq!(DiaperRecord::new(baby, now, true, true).type_description(), "wet + dirty");
        assert_eq!(DiaperRecord::new(baby, now, false, true).type_description(), "dirty");
        assert_eq!(DiaperRecord::new(baby, now, true, false).type_description(), "wet");
        assert_eq!(DiaperRecord::new(baby, now, false, false).type_description(), "dry");
    }

    #[test]
    fn temperature_bands() {
        assert_eq!(TemperatureStatus::classify(35.0), TemperatureStatus::Low);
        assert_eq!(TemperatureStatus::classify(36.8), TemperatureStatus::Normal);
        assert_eq!(TemperatureStatus::classify(37.5), TemperatureStatus::Elevated);
        assert_eq!(TemperatureStatus::classify(38.5), TemperatureStatus::Fever);
    }

    #[test]
    fn weight_warnings() {
        let mut record = GrowthRecord::new(Uuid::new_v4(), Utc::now());
        assert!(!record.has_measurement());
        assert!(!record.weight_is_abnormal());

        record.weight_g = Some(5_800.0);
        assert!(record.has_measurement());
        assert!(!record.weight_is_abnormal());
        record.weight_g = Some(500.0);
        assert!(record.weight_is_abnormal());
        record.weight_g = Some(20_000.0);
        assert!(record.weight_is_abnormal());
    }

    #[test]
    fn enums_parse() {
        assert_eq!("F".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(
            "bottle".parse::<FeedingMethod>().unwrap(),
            FeedingMethod::Bottle
        );
        assert!("formula".parse::<FeedingMethod>().is_err());
        assert_eq!("Green".parse::<StoolColor>().unwrap(), StoolColor::Green);
        assert_eq!(
            "watery".parse::<StoolConsistency>().unwrap(),
            StoolConsistency::Watery
        );
        assert!("purple".parse::<StoolColor>().is_err());
    }
}

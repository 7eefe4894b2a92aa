//! Single-track timer for sleep sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::engine::{CompletedSession, Side, TimerEngine, TimerState};
use crate::events::Event;

const TRACK: Side = Side::Left;

/// Sleep timer: the two-sided engine pinned to a single track.
///
/// Side switching is not exposed; every reading is the one track's total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SleepTimer {
    engine: TimerEngine,
}

impl SleepTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.engine.first_started_at()
    }

    pub fn duration_ms_at(&self, now: DateTime<Utc>) -> u64 {
        self.engine.current_duration_ms_at(TRACK, now)
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms_at(Utc::now())
    }

    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Event {
        self.engine.snapshot_at(now)
    }

    pub fn finish(&self) -> Option<CompletedSession> {
        self.engine.finish()
    }

    pub fn start_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.engine.start_at(TRACK, now)
    }

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(Utc::now())
    }

    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.engine.pause_at(now)
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(Utc::now())
    }

    pub fn resume_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.engine.resume_at(now)
    }

    pub fn resume(&mut self) -> Option<Event> {
        self.resume_at(Utc::now())
    }

    pub fn toggle_pause_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.engine.toggle_pause_at(now)
    }

    pub fn toggle_pause(&mut self) -> Option<Event> {
        self.toggle_pause_at(Utc::now())
    }

    pub fn stop_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.engine.stop_at(now)
    }

    pub fn stop(&mut self) -> Option<Event> {
        self.stop_at(Utc::now())
    }

    pub fn reset_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.engine.reset_at(now)
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.reset_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn sleep_accumulates_across_pauses() {
        let t0 = Utc.with_ymd_and_hms(2026, 2, 10, 20, 0, 0).unwrap();
        let mut timer = SleepTimer::new();
        timer.start_at(t0);
        timer.pause_at(t0 + Duration::minutes(50));
        timer.resume_at(t0 + Duration::minutes(55));
        assert_eq!(
            timer.duration_ms_at(t0 + Duration::minutes(125)),
            120 * 60_000
        );
        timer.stop_at(t0 + Duration::minutes(125));
        let session = timer.finish().unwrap();
        assert_eq!(session.durations.total_ms(), 120 * 60_000);
        assert_eq!(session.durations.right_ms, 0);
        assert_eq!(session.started_at, t0);
    }

    #[test]
    fn serializes_as_bare_engine() {
        let timer = SleepTimer::new();
        let json = serde_json::to_value(&timer).unwrap();
        assert_eq!(json["has_started"], false);
    }
}

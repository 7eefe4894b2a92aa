//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine tracking elapsed
//! time on two independent sides. It does not use internal threads and it
//! does not count ticks: every reading is computed from the stored
//! timestamps at query time, so the engine stays correct across process
//! suspension and across any UI refresh interval.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running(side) <-> Paused -> Stopped -> (reset) Idle
//! ```
//!
//! Commands issued in the wrong state are ignored and return `None`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new();
//! engine.start(Side::Left);
//! engine.switch_side();
//! engine.stop();
//! let session = engine.finish().unwrap();
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// One of the two independently timed tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Side::Left),
            "right" | "r" => Ok(Side::Right),
            other => Err(format!("unknown side '{other}' (expected left or right)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Timing finished; readings stay available until `reset()`.
    Stopped,
}

/// Closed-interval totals per side, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideDurations {
    pub left_ms: u64,
    pub right_ms: u64,
}

impl SideDurations {
    pub fn get(&self, side: Side) -> u64 {
        match side {
            Side::Left => self.left_ms,
            Side::Right => self.right_ms,
        }
    }

    fn add(&mut self, side: Side, ms: u64) {
        match side {
            Side::Left => self.left_ms = self.left_ms.saturating_add(ms),
            Side::Right => self.right_ms = self.right_ms.saturating_add(ms),
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.left_ms.saturating_add(self.right_ms)
    }
}

/// Final readings of a stopped timer, handed to persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub durations: SideDurations,
    /// When the very first `start` happened.
    pub started_at: DateTime<Utc>,
    /// When `stop` happened.
    pub ended_at: DateTime<Utc>,
}

/// Core timer engine.
///
/// Operates on wall-clock deltas -- no internal thread, no tick counter.
/// Every command has an `_at` form taking an explicit `now`; the plain form
/// uses `Utc::now()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimerEngine {
    current_side: Side,
    is_running: bool,
    has_started: bool,
    #[serde(default)]
    is_stopped: bool,
    /// Timestamp of the first `start`, kept for the saved record.
    #[serde(default)]
    first_started_at: Option<DateTime<Utc>>,
    /// Start of the currently open interval. `Some` iff running.
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    stopped_at: Option<DateTime<Utc>>,
    /// Excludes the open interval while running.
    accumulated: SideDurations,
    /// Value of `accumulated[current_side]` when the open interval began.
    #[serde(default)]
    paused_baseline_ms: u64,
}

impl TimerEngine {
    /// Create an engine in the `Idle` state with both sides at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        if !self.has_started {
            TimerState::Idle
        } else if self.is_stopped {
            TimerState::Stopped
        } else if self.is_running {
            TimerState::Running
        } else {
            TimerState::Paused
        }
    }

    pub fn current_side(&self) -> Side {
        self.current_side
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    pub fn first_started_at(&self) -> Option<DateTime<Utc>> {
        self.first_started_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Closed-interval totals, not including the open interval.
    pub fn accumulated(&self) -> SideDurations {
        self.accumulated
    }

    pub fn paused_baseline_ms(&self) -> u64 {
        self.paused_baseline_ms
    }

    /// Live reading for `side`, including the open interval if that side is
    /// the one running.
    pub fn current_duration_ms_at(&self, side: Side, now: DateTime<Utc>) -> u64 {
        let closed = self.accumulated.get(side);
        match self.started_at {
            Some(started) if self.is_running && side == self.current_side => {
                closed.saturating_add(elapsed_ms(started, now))
            }
            _ => closed,
        }
    }

    pub fn current_duration_ms(&self, side: Side) -> u64 {
        self.current_duration_ms_at(side, Utc::now())
    }

    pub fn total_duration_ms_at(&self, now: DateTime<Utc>) -> u64 {
        self.current_duration_ms_at(Side::Left, now)
            .saturating_add(self.current_duration_ms_at(Side::Right, now))
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms_at(Utc::now())
    }

    pub fn left_duration_ms(&self) -> u64 {
        self.current_duration_ms(Side::Left)
    }

    pub fn right_duration_ms(&self) -> u64 {
        self.current_duration_ms(Side::Right)
    }

    /// Readings at `now` for both sides.
    pub fn durations_at(&self, now: DateTime<Utc>) -> SideDurations {
        SideDurations {
            left_ms: self.current_duration_ms_at(Side::Left, now),
            right_ms: self.current_duration_ms_at(Side::Right, now),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Event {
        let durations = self.durations_at(now);
        Event::StateSnapshot {
            state: self.state(),
            current_side: self.current_side,
            left_ms: durations.left_ms,
            right_ms: durations.right_ms,
            total_ms: durations.total_ms(),
            started_at: self.first_started_at,
            at: now,
        }
    }

    pub fn snapshot(&self) -> Event {
        self.snapshot_at(Utc::now())
    }

    /// Final readings, available only once the timer is stopped.
    pub fn finish(&self) -> Option<CompletedSession> {
        if self.state() != TimerState::Stopped {
            return None;
        }
        Some(CompletedSession {
            durations: self.accumulated,
            started_at: self.first_started_at?,
            ended_at: self.stopped_at?,
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin timing on `side`. Only valid from `Idle`; the first start wins.
    pub fn start_at(&mut self, side: Side, now: DateTime<Utc>) -> Option<Event> {
        if self.has_started {
            return None;
        }
        self.has_started = true;
        self.current_side = side;
        self.first_started_at = Some(now);
        self.open_interval(now);
        tracing::debug!(side = side.as_str(), "timer started");
        Some(Event::TimerStarted { side, at: now })
    }

    pub fn start(&mut self, side: Side) -> Option<Event> {
        self.start_at(side, Utc::now())
    }

    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.close_interval(now);
        tracing::debug!(side = self.current_side.as_str(), "timer paused");
        Some(Event::TimerPaused {
            side: self.current_side,
            side_ms: self.accumulated.get(self.current_side),
            total_ms: self.accumulated.total_ms(),
            at: now,
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(Utc::now())
    }

    pub fn resume_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.has_started || self.is_running || self.is_stopped {
            return None;
        }
        self.open_interval(now);
        tracing::debug!(side = self.current_side.as_str(), "timer resumed");
        Some(Event::TimerResumed {
            side: self.current_side,
            side_ms: self.paused_baseline_ms,
            at: now,
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        self.resume_at(Utc::now())
    }

    /// Move timing to the other side.
    ///
    /// While running this closes the interval on the old side and opens one
    /// on the new side at the same instant, so no time is lost or gained at
    /// the boundary. While paused it only changes which side a later resume
    /// will time.
    pub fn switch_side_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.has_started || self.is_stopped {
            return None;
        }
        let from = self.current_side;
        let was_running = self.is_running;
        if was_running {
            self.close_interval(now);
        }
        self.current_side = from.other();
        if was_running {
            self.open_interval(now);
        }
        tracing::debug!(from = from.as_str(), to = self.current_side.as_str(), "side switched");
        Some(Event::SideSwitched {
            from,
            to: self.current_side,
            from_ms: self.accumulated.get(from),
            to_ms: self.accumulated.get(self.current_side),
            running: was_running,
            at: now,
        })
    }

    pub fn switch_side(&mut self) -> Option<Event> {
        self.switch_side_at(Utc::now())
    }

    pub fn toggle_pause_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.is_running {
            self.pause_at(now)
        } else {
            self.resume_at(now)
        }
    }

    pub fn toggle_pause(&mut self) -> Option<Event> {
        self.toggle_pause_at(Utc::now())
    }

    /// Finish timing. Valid from `Running` or `Paused`; readings remain
    /// queryable until `reset()`.
    pub fn stop_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.has_started || self.is_stopped {
            return None;
        }
        if self.is_running {
            self.close_interval(now);
        }
        self.is_stopped = true;
        self.stopped_at = Some(now);
        tracing::debug!(total_ms = self.accumulated.total_ms(), "timer stopped");
        Some(Event::TimerStopped {
            left_ms: self.accumulated.left_ms,
            right_ms: self.accumulated.right_ms,
            total_ms: self.accumulated.total_ms(),
            at: now,
        })
    }

    pub fn stop(&mut self) -> Option<Event> {
        self.stop_at(Utc::now())
    }

    /// Return to the `Idle` defaults.
    pub fn reset_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        *self = Self::default();
        Some(Event::TimerReset { at: now })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.reset_at(Utc::now())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn open_interval(&mut self, now: DateTime<Utc>) {
        self.paused_baseline_ms = self.accumulated.get(self.current_side);
        self.started_at = Some(now);
        self.is_running = true;
    }

    fn close_interval(&mut self, now: DateTime<Utc>) {
        if let Some(started) = self.started_at.take() {
            self.accumulated.add(self.current_side, elapsed_ms(started, now));
        }
        self.is_running = false;
    }
}

/// Milliseconds from `from` to `to`; zero if the clock went backwards.
fn elapsed_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_milliseconds()).unwrap_or(0)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Side, TimerState};

/// Every applied timer transition produces an Event.
/// Front-ends re-render from these; ignored commands produce none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        side: Side,
        at: DateTime<Utc>,
    },
    TimerPaused {
        side: Side,
        side_ms: u64,
        total_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        side: Side,
        /// Baseline the new interval accrues onto.
        side_ms: u64,
        at: DateTime<Utc>,
    },
    SideSwitched {
        from: Side,
        to: Side,
        from_ms: u64,
        to_ms: u64,
        /// Whether timing continued on the new side.
        running: bool,
        at: DateTime<Utc>,
    },
    TimerStopped {
        left_ms: u64,
        right_ms: u64,
        total_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        current_side: Side,
        left_ms: u64,
        right_ms: u64,
        total_ms: u64,
        started_at: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
}

mod engine;
pub mod format;
mod sleep;

pub use engine::{CompletedSession, Side, SideDurations, TimerEngine, TimerState};
pub use sleep::SleepTimer;

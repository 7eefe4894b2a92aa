//! # Babylog Core Library
//!
//! This library provides the core logic for Babylog, a feeding and sleep
//! journal for newborns. All operations are available through the `babylog`
//! CLI binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based two-sided state machine. It never
//!   ticks on its own; readings are derived from timestamps on demand
//! - **App Lock**: Biometric-or-passcode gate with salted, hashed passcode
//!   storage and migration of legacy plaintext passcodes
//! - **Storage**: SQLite-based record storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Breastfeeding timer with per-side durations
//! - [`SleepTimer`]: Single-sided timer for naps and nights
//! - [`AuthGate`]: App lock decisions and passcode lifecycle
//! - [`Database`]: Babies, feedings, sleeps, diapers, growth and a key-value store
//! - [`Config`]: Application configuration management

pub mod auth;
pub mod error;
pub mod events;
pub mod records;
pub mod storage;
pub mod timer;

pub use auth::{AuthConfig, AuthGate, AuthMethod, AuthResult, AuthSessionState};
pub use error::{
    AuthError, BiometricError, ConfigError, CoreError, DatabaseError, StoreError, ValidationError,
};
pub use events::Event;
pub use records::{
    Baby, DiaperRecord, FeedingMethod, FeedingRecord, Gender, GrowthRecord, SleepRecord, StoolColor,
    StoolConsistency, TemperatureStatus,
};
pub use storage::{Config, DailySummary, Database};
pub use timer::{CompletedSession, Side, SideDurations, SleepTimer, TimerEngine, TimerState};

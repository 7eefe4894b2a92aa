use babylog_core::error::ValidationError;
use babylog_core::storage::Database;
use babylog_core::timer::format::{format_clock, format_long};
use babylog_core::{Config, Event, SleepRecord, SleepTimer};
use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use uuid::Uuid;

use super::{load_parked, park, print_json, watch};

const TIMER_KEY: &str = "sleep_timer";

#[derive(Subcommand)]
pub enum SleepAction {
    /// Start a sleep timer
    Start,
    /// Pause (baby woke briefly)
    Pause,
    /// Resume after a pause
    Resume,
    /// Pause if running, resume if paused
    Toggle,
    /// Stop timing; reading stays until save or reset
    Stop,
    /// Print current timer state as JSON
    Status {
        /// Keep printing one line per timer.refresh_interval_ms
        #[arg(long)]
        watch: bool,
        /// Stop watching after this many lines
        #[arg(long, requires = "watch", value_parser = clap::value_parser!(u64).range(1..))]
        ticks: Option<u64>,
    },
    /// Discard the timer
    Reset,
    /// Save a stopped timer as a sleep record
    Save {
        /// Baby ID
        #[arg(long)]
        baby: Uuid,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Serialize)]
struct SleepStatus {
    #[serde(flatten)]
    snapshot: Event,
    elapsed: String,
}

fn status(timer: &SleepTimer, long_format: bool) -> SleepStatus {
    let now = Utc::now();
    let ms = timer.duration_ms_at(now);
    SleepStatus {
        snapshot: timer.snapshot_at(now),
        elapsed: if long_format {
            format_long(ms)
        } else {
            format_clock(ms)
        },
    }
}

pub fn run(action: SleepAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut timer: SleepTimer = load_parked(&db, TIMER_KEY)?;

    let event = match action {
        SleepAction::Start => timer.start(),
        SleepAction::Pause => timer.pause(),
        SleepAction::Resume => timer.resume(),
        SleepAction::Toggle => timer.toggle_pause(),
        SleepAction::Stop => timer.stop(),
        SleepAction::Reset => timer.reset(),
        SleepAction::Status { watch: false, .. } => {
            let long_format = Config::load()?.display.long_format_for_sleep;
            print_json(&status(&timer, long_format))?;
            return Ok(());
        }
        SleepAction::Status { watch: true, ticks } => {
            let long_format = Config::load()?.display.long_format_for_sleep;
            return watch(ticks, || {
                let timer: SleepTimer = load_parked(&db, TIMER_KEY)?;
                Ok(status(&timer, long_format))
            });
        }
        SleepAction::Save { baby, notes } => {
            let session = timer.finish().ok_or(ValidationError::TimerNotStopped)?;
            let mut record = SleepRecord::from_session(baby, &session);
            record.notes = notes;
            timer.reset();
            db.in_transaction(|db| -> Result<(), Box<dyn std::error::Error>> {
                db.record_sleep(&record)?;
                park(db, TIMER_KEY, &timer)
            })?;
            tracing::info!(id = %record.id, "sleep saved");
            print_json(&record)?;
            return Ok(());
        }
    };

    match event {
        Some(event) => print_json(&event)?,
        None => {
            eprintln!("ignored: timer is {:?}", timer.state());
            let long_format = Config::load()?.display.long_format_for_sleep;
            print_json(&status(&timer, long_format))?;
        }
    }
    park(&db, TIMER_KEY, &timer)?;
    Ok(())
}

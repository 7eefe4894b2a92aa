use babylog_core::error::ValidationError;
use babylog_core::storage::Database;
use babylog_core::timer::format::format_clock;
use babylog_core::{Config, Event, FeedingMethod, FeedingRecord, Side, TimerEngine};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Serialize;
use uuid::Uuid;

use super::{load_parked, park, print_json, watch};

const ENGINE_KEY: &str = "feeding_timer";

#[derive(Subcommand)]
pub enum FeedAction {
    /// Start timing on a side
    Start {
        /// left or right; defaults to timer.default_side
        #[arg(long)]
        side: Option<Side>,
    },
    /// Pause the running side
    Pause,
    /// Resume the current side
    Resume,
    /// Pause if running, resume if paused
    Toggle,
    /// Switch to the other side
    Switch,
    /// Stop timing; readings stay until save or reset
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
    /// Save a stopped timer as a feeding record
    Save {
        /// Baby ID
        #[arg(long)]
        baby: Uuid,
        /// Bottle top-up in ml
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Record a feeding that was not timed
    Log {
        /// Baby ID
        #[arg(long)]
        baby: Uuid,
        /// Bottle feeding; needs --amount
        #[arg(long, requires = "amount", conflicts_with_all = ["left_min", "right_min"])]
        bottle: bool,
        /// Minutes on the left side
        #[arg(long)]
        left_min: Option<u64>,
        /// Minutes on the right side
        #[arg(long)]
        right_min: Option<u64>,
        /// Volume in ml
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
        /// When the feeding started (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

#[derive(Serialize)]
struct FeedStatus {
    #[serde(flatten)]
    snapshot: Event,
    left: String,
    right: String,
    total: String,
}

fn status(engine: &TimerEngine) -> FeedStatus {
    let now = Utc::now();
    let durations = engine.durations_at(now);
    FeedStatus {
        snapshot: engine.snapshot_at(now),
        left: format_clock(durations.left_ms),
        right: format_clock(durations.right_ms),
        total: format_clock(durations.total_ms()),
    }
}

/// Bottle when `--bottle`, mixed when minutes come with an amount,
/// breastfeeding otherwise.
fn logged_feeding(
    baby: Uuid,
    at: DateTime<Utc>,
    bottle: bool,
    left_min: Option<u64>,
    right_min: Option<u64>,
    amount: Option<f64>,
    notes: Option<String>,
) -> Result<FeedingRecord, Box<dyn std::error::Error>> {
    let timed = left_min.is_some() || right_min.is_some();
    let method = match (bottle, timed, amount) {
        (true, _, _) => FeedingMethod::Bottle,
        (false, true, Some(_)) => FeedingMethod::Mixed,
        (false, true, None) => FeedingMethod::Breastfeeding,
        (false, false, _) => {
            return Err("nothing to log: pass --bottle --amount, or --left-min/--right-min".into())
        }
    };
    let to_secs = |minutes: u64| {
        minutes.checked_mul(60).ok_or_else(|| ValidationError::InvalidValue {
            field: "minutes".into(),
            message: format!("{minutes} is too large"),
        })
    };

    let mut record = FeedingRecord::new(baby, at, method);
    record.left_duration_secs = left_min.map(to_secs).transpose()?;
    record.right_duration_secs = right_min.map(to_secs).transpose()?;
    record.amount_ml = amount;
    record.notes = notes;
    Ok(record)
}

pub fn run(action: FeedAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut engine: TimerEngine = load_parked(&db, ENGINE_KEY)?;

    let event = match action {
        FeedAction::Start { side } => {
            let side = match side {
                Some(side) => side,
                None => Config::load()?.timer.default_side,
            };
            engine.start(side)
        }
        FeedAction::Pause => engine.pause(),
        FeedAction::Resume => engine.resume(),
        FeedAction::Toggle => engine.toggle_pause(),
        FeedAction::Switch => engine.switch_side(),
        FeedAction::Stop => engine.stop(),
        FeedAction::Reset => engine.reset(),
        FeedAction::Status { watch: false, .. } => {
            print_json(&status(&engine))?;
            return Ok(());
        }
        FeedAction::Status { watch: true, ticks } => {
            return watch(ticks, || {
                let engine: TimerEngine = load_parked(&db, ENGINE_KEY)?;
                Ok(status(&engine))
            });
        }
        FeedAction::Save {
            baby,
            amount,
            notes,
        } => {
            let session = engine.finish().ok_or(ValidationError::TimerNotStopped)?;
            let mut record = FeedingRecord::from_session(baby, &session);
            if let Some(ml) = amount {
                record.method = FeedingMethod::Mixed;
                record.amount_ml = Some(ml);
            }
            record.notes = notes;
            // The record and the cleared timer land together or not at all.
            engine.reset();
            db.in_transaction(|db| -> Result<(), Box<dyn std::error::Error>> {
                db.record_feeding(&record)?;
                park(db, ENGINE_KEY, &engine)
            })?;
            tracing::info!(id = %record.id, "feeding saved");
            print_json(&record)?;
            return Ok(());
        }
        FeedAction::Log {
            baby,
            bottle,
            left_min,
            right_min,
            amount,
            notes,
            at,
        } => {
            let at = at.unwrap_or_else(Utc::now);
            let record = logged_feeding(baby, at, bottle, left_min, right_min, amount, notes)?;
            db.record_feeding(&record)?;
            tracing::info!(id = %record.id, method = record.method.as_str(), "feeding logged");
            print_json(&record)?;
            return Ok(());
        }
    };

    match event {
        Some(event) => print_json(&event)?,
        None => {
            eprintln!("ignored: timer is {:?}", engine.state());
            print_json(&status(&engine))?;
        }
    }
    park(&db, ENGINE_KEY, &engine)?;
    Ok(())
}

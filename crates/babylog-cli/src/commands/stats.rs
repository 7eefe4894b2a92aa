use babylog_core::error::ValidationError;
use babylog_core::storage::Database;
use babylog_core::timer::format::format_hours_minutes;
use babylog_core::DailySummary;
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use serde::Serialize;
use uuid::Uuid;

use super::print_json;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Totals for today (UTC), or for --date
    Today {
        /// Baby ID
        #[arg(long)]
        baby: Uuid,
        /// Day to summarize (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Serialize)]
struct DayReport {
    date: NaiveDate,
    #[serde(flatten)]
    summary: DailySummary,
    feeding_time: String,
    sleep_time: String,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Today { baby, date } => {
            if db.get_baby(baby)?.is_none() {
                return Err(ValidationError::UnknownBaby(baby.to_string()).into());
            }
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let summary = db.daily_summary(baby, date)?;
            let report = DayReport {
                date,
                feeding_time: format_hours_minutes(summary.feeding_secs * 1000),
                sleep_time: format_hours_minutes(summary.sleep_secs * 1000),
                summary,
            };
            print_json(&report)?;
        }
    }
    Ok(())
}

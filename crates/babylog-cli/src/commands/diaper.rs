use babylog_core::storage::Database;
use babylog_core::{DiaperRecord, StoolColor, StoolConsistency};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use uuid::Uuid;

use super::print_json;

#[derive(Subcommand)]
pub enum DiaperAction {
    /// Record a diaper change
    Add {
        /// Baby ID
        #[arg(long)]
        baby: Uuid,
        #[arg(long)]
        wet: bool,
        #[arg(long)]
        dirty: bool,
        /// yellow, green, brown, black or white
        #[arg(long, requires = "dirty")]
        color: Option<StoolColor>,
        /// watery, loose, normal or hard
        #[arg(long, requires = "dirty")]
        consistency: Option<StoolConsistency>,
        #[arg(long)]
        notes: Option<String>,
        /// When the change happened (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

pub fn run(action: DiaperAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        DiaperAction::Add {
            baby,
            wet,
            dirty,
            color,
            consistency,
            notes,
            at,
        } => {
            if !wet && !dirty {
                return Err("pass --wet, --dirty or both".into());
            }
            let mut record = DiaperRecord::new(baby, at.unwrap_or_else(Utc::now), wet, dirty);
            record.color = color;
            record.consistency = consistency;
            record.notes = notes;
            db.record_diaper(&record)?;
            tracing::info!(id = %record.id, kind = record.type_description(), "diaper saved");
            print_json(&record)?;
        }
    }
    Ok(())
}

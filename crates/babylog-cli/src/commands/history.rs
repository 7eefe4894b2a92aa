use babylog_core::error::ValidationError;
use babylog_core::storage::Database;
use chrono::Utc;
use clap::Subcommand;
use uuid::Uuid;

use super::print_json;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Saved feedings, newest first
    Feedings {
        /// Baby ID
        #[arg(long)]
        baby: Uuid,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Saved sleeps, newest first
    Sleeps {
        /// Baby ID
        #[arg(long)]
        baby: Uuid,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Diaper changes, newest first
    Diapers {
        /// Baby ID
        #[arg(long)]
        baby: Uuid,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Growth measurements, newest first
    Growth {
        /// Baby ID
        #[arg(long)]
        baby: Uuid,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

fn require_baby(db: &Database, id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
    if db.get_baby(id)?.is_none() {
        return Err(ValidationError::UnknownBaby(id.to_string()).into());
    }
    Ok(())
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        HistoryAction::Feedings { baby, limit } => {
            require_baby(&db, baby)?;
            let feedings = db.feedings_for(baby, None, Some(limit))?;
            print_json(&feedings)?;
        }
        HistoryAction::Sleeps { baby, limit } => {
            require_baby(&db, baby)?;
            let now = Utc::now();
            let sleeps: Vec<serde_json::Value> = db
                .sleeps_for(baby, None, Some(limit))?
                .into_iter()
                .map(|sleep| {
                    let duration = sleep.duration_text_at(now);
                    let mut value = serde_json::to_value(&sleep)?;
                    value["duration"] = serde_json::Value::String(duration);
                    Ok(value)
                })
                .collect::<Result<_, serde_json::Error>>()?;
            print_json(&sleeps)?;
        }
        HistoryAction::Diapers { baby, limit } => {
            require_baby(&db, baby)?;
            let diapers: Vec<serde_json::Value> = db
                .diapers_for(baby, None, Some(limit))?
                .into_iter()
                .map(|diaper| {
                    let kind = diaper.type_description();
                    let mut value = serde_json::to_value(&diaper)?;
                    value["type"] = serde_json::Value::String(kind.to_string());
                    Ok(value)
                })
                .collect::<Result<_, serde_json::Error>>()?;
            print_json(&diapers)?;
        }
        HistoryAction::Growth { baby, limit } => {
            require_baby(&db, baby)?;
            print_json(&db.growth_for(baby, None, Some(limit))?)?;
        }
    }
    Ok(())
}

use babylog_core::storage::Database;
use babylog_core::{GrowthRecord, TemperatureStatus};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Serialize;
use uuid::Uuid;

use super::print_json;

#[derive(Subcommand)]
pub enum GrowthAction {
    /// Record measurements; at least one is required
    Add {
        /// Baby ID
        #[arg(long)]
        baby: Uuid,
        #[arg(long)]
        weight_g: Option<f64>,
        #[arg(long)]
        height_cm: Option<f64>,
        /// Head circumference in cm
        #[arg(long)]
        head_cm: Option<f64>,
        #[arg(long)]
        temperature_c: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
        /// When the measurement was taken (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

#[derive(Serialize)]
struct SavedGrowth {
    #[serde(flatten)]
    record: GrowthRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature_status: Option<TemperatureStatus>,
    warnings: Vec<String>,
}

fn warnings(record: &GrowthRecord) -> Vec<String> {
    let mut warnings = Vec::new();
    if record.weight_is_abnormal() {
        warnings.push("weight is outside 1-15 kg; check the value".to_string());
    }
    match record.temperature_status() {
        Some(TemperatureStatus::Low) => warnings.push("temperature is low".to_string()),
        Some(TemperatureStatus::Elevated) => warnings.push("temperature is elevated".to_string()),
        Some(TemperatureStatus::Fever) => warnings.push("fever".to_string()),
        Some(TemperatureStatus::Normal) | None => {}
    }
    warnings
}

pub fn run(action: GrowthAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        GrowthAction::Add {
            baby,
            weight_g,
            height_cm,
            head_cm,
            temperature_c,
            notes,
            at,
        } => {
            let mut record = GrowthRecord::new(baby, at.unwrap_or_else(Utc::now));
            record.weight_g = weight_g;
            record.height_cm = height_cm;
            record.head_circumference_cm = head_cm;
            record.temperature_c = temperature_c;
            record.notes = notes;
            db.record_growth(&record)?;
            tracing::info!(id = %record.id, "growth saved");

            let warnings = warnings(&record);
            for warning in &warnings {
                eprintln!("warning: {warning}");
            }
            print_json(&SavedGrowth {
                temperature_status: record.temperature_status(),
                record,
                warnings,
            })?;
        }
    }
    Ok(())
}

use babylog_core::records::{Baby, Gender};
use babylog_core::storage::Database;
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use serde::Serialize;

use super::print_json;

#[derive(Subcommand)]
pub enum BabyAction {
    /// Add a baby profile
    Add {
        #[arg(long)]
        name: String,
        /// Birthday (YYYY-MM-DD)
        #[arg(long)]
        birthday: NaiveDate,
        /// male, female or other
        #[arg(long, default_value = "other")]
        gender: Gender,
    },
    /// List baby profiles
    List,
}

#[derive(Serialize)]
struct BabyEntry<'a> {
    #[serde(flatten)]
    baby: &'a Baby,
    age_days: u32,
}

pub fn run(action: BabyAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        BabyAction::Add {
            name,
            birthday,
            gender,
        } => {
            if name.trim().is_empty() {
                return Err("name must not be empty".into());
            }
            let baby = Baby::new(name.trim(), birthday, gender);
            db.add_baby(&baby)?;
            print_json(&baby)?;
        }
        BabyAction::List => {
            let today = Utc::now().date_naive();
            let babies = db.list_babies()?;
            let entries: Vec<BabyEntry<'_>> = babies
                .iter()
                .map(|baby| BabyEntry {
                    baby,
                    age_days: baby.age_in_days(today),
                })
                .collect();
            print_json(&entries)?;
        }
    }
    Ok(())
}

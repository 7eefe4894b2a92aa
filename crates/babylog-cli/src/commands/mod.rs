pub mod baby;
pub mod config;
pub mod diaper;
pub mod feed;
pub mod growth;
pub mod history;
pub mod lock;
pub mod sleep;
pub mod stats;

use std::time::Duration;

use babylog_core::storage::Database;
use babylog_core::Config;
use serde::de::DeserializeOwned;
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Load a timer parked in the kv table, or a fresh one.
fn load_parked<T: DeserializeOwned + Default>(
    db: &Database,
    key: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    let Some(json) = db.kv_get(key)? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&json) {
        Ok(timer) => Ok(timer),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable parked timer");
            Ok(T::default())
        }
    }
}

fn park<T: Serialize>(db: &Database, key: &str, timer: &T) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(timer)?;
    db.kv_set(key, &json)?;
    Ok(())
}

/// Print one compact JSON line from `render` every `timer.refresh_interval_ms`.
/// Runs until interrupted, or for `ticks` lines when given.
fn watch<T, F>(ticks: Option<u64>, mut render: F) -> Result<(), Box<dyn std::error::Error>>
where
    T: Serialize,
    F: FnMut() -> Result<T, Box<dyn std::error::Error>>,
{
    let interval_ms = Config::load()?.timer.refresh_interval_ms.max(1);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(async {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
        let mut printed = 0u64;
        while ticks.map_or(true, |n| printed < n) {
            interval.tick().await;
            println!("{}", serde_json::to_string(&render()?)?);
            printed += 1;
        }
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

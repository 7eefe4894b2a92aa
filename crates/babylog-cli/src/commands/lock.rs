use std::sync::Arc;

use babylog_core::auth::{
    AuthGate, ConfigAuthSettings, DatabaseLegacyStore, KeyringCredentialStore,
    UnavailableBiometrics,
};
use babylog_core::storage::data_dir;
use babylog_core::{AuthResult, Config};
use clap::Subcommand;
use serde::Serialize;

use super::print_json;

#[derive(Subcommand)]
pub enum LockAction {
    /// Print lock settings as JSON
    Status,
    /// Require authentication before showing data
    Enable,
    /// Turn the lock off (passcode is kept)
    Disable,
    /// Set a new passcode and enable the lock
    SetPasscode {
        /// New passcode (at least 4 characters)
        new_passcode: String,
    },
    /// Replace the passcode after confirming the current one
    ChangePasscode {
        current: String,
        new_passcode: String,
    },
    /// Delete the passcode, keeping the lock flag
    RemovePasscode,
    /// Delete the passcode and turn the lock off
    Remove,
    /// Check a passcode without unlocking anything else
    Verify { passcode: String },
    /// Run the full unlock flow
    Unlock,
}

#[derive(Serialize)]
struct LockStatus {
    lock_enabled: bool,
    use_passcode: bool,
    /// `None` when the credential store cannot be read.
    passcode_stored: Option<bool>,
}

fn build_gate() -> Result<AuthGate, Box<dyn std::error::Error>> {
    let db_path = data_dir()?.join("babylog.db");
    let gate = AuthGate::new(
        Arc::new(KeyringCredentialStore),
        Arc::new(DatabaseLegacyStore::open_at(&db_path)?),
        Arc::new(UnavailableBiometrics),
        Arc::new(ConfigAuthSettings::default_location()?),
    )?;
    Ok(gate)
}

/// Run `authenticate`, then fall back to `passcode` if the gate asks for it.
fn unlock(gate: &mut AuthGate, passcode: Option<&str>) -> Result<AuthResult, Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let result = runtime.block_on(gate.authenticate());
    tracing::debug!(?result, "authenticate finished");

    match (result, passcode) {
        (AuthResult::PasscodeRequired, Some(passcode)) => {
            if gate.verify_passcode(passcode)? {
                Ok(AuthResult::Granted(babylog_core::AuthMethod::Passcode))
            } else {
                Ok(AuthResult::PasscodeRequired)
            }
        }
        (result, _) => Ok(result),
    }
}

fn explain(result: AuthResult) -> Box<dyn std::error::Error> {
    match result {
        AuthResult::PasscodeRequired => "journal is locked; pass --passcode".into(),
        AuthResult::Denied => "access denied".into(),
        AuthResult::Granted(_) => "access granted".into(),
    }
}

/// Gate for data commands. A no-op while the lock is disabled.
pub fn require_access(passcode: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    if !Config::load()?.security.lock_enabled {
        return Ok(());
    }
    let mut gate = build_gate()?;
    match unlock(&mut gate, passcode)? {
        AuthResult::Granted(_) => Ok(()),
        other => Err(explain(other)),
    }
}

pub fn run(action: LockAction, passcode: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut gate = build_gate()?;

    match action {
        LockAction::Status => {
            let config = gate.config();
            print_json(&LockStatus {
                lock_enabled: config.lock_enabled,
                use_passcode: config.use_passcode,
                passcode_stored: gate.has_stored_passcode().ok(),
            })?;
        }
        LockAction::Verify { passcode } => {
            let ok = gate.verify_passcode(&passcode)?;
            print_json(&serde_json::json!({ "verified": ok }))?;
            if !ok {
                return Err("incorrect passcode".into());
            }
        }
        LockAction::Unlock => {
            let result = unlock(&mut gate, passcode)?;
            print_json(&result)?;
            if !matches!(result, AuthResult::Granted(_)) {
                return Err(explain(result));
            }
        }
        changing => {
            // Changing the lock needs the same access as reading data.
            match unlock(&mut gate, passcode)? {
                AuthResult::Granted(_) => {}
                other => return Err(explain(other)),
            }
            match changing {
                LockAction::Enable => {
                    gate.set_lock_enabled(true)?;
                    if !gate.config().use_passcode {
                        eprintln!("warning: no passcode set; without biometrics the lock grants access");
                    }
                }
                LockAction::Disable => gate.set_lock_enabled(false)?,
                LockAction::SetPasscode { new_passcode } => gate.set_passcode(&new_passcode)?,
                LockAction::ChangePasscode {
                    current,
                    new_passcode,
                } => {
                    if !gate.change_passcode(&current, &new_passcode)? {
                        return Err("incorrect passcode".into());
                    }
                }
                LockAction::RemovePasscode => gate.remove_passcode()?,
                LockAction::Remove => gate.remove_authentication()?,
                LockAction::Status | LockAction::Verify { .. } | LockAction::Unlock => {}
            }
            print_json(&gate.config())?;
        }
    }
    Ok(())
}

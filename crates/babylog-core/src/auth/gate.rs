//! App lock gate.
//!
//! Decides at launch and resume whether the user may see any data, and owns
//! the passcode credential lifecycle. Collaborators are injected so the gate
//! holds no global state.
//!
//! ## Flow
//!
//! ```text
//! lock disabled                  -> Granted(LockDisabled)
//! biometrics ok                  -> Granted(Biometric)
//! biometrics failed, passcode    -> PasscodeRequired
//! biometrics failed, no passcode -> Denied
//! no biometrics, passcode        -> PasscodeRequired
//! no biometrics, no passcode     -> Granted(NoSecondFactor)   (fail-open)
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::biometric::BiometricAuthenticator;
use super::passcode::{self, PasscodeRecord, MIN_PASSCODE_LEN};
use super::settings::{AuthConfig, AuthSettingsStore};
use super::store::{CredentialStore, LegacyPreferenceStore};
use crate::error::{AuthError, BiometricError};

pub const CREDENTIAL_SERVICE: &str = "babylog";
pub const CREDENTIAL_ACCOUNT: &str = "passcode";
/// Key the plaintext passcode was kept under by older versions.
pub const LEGACY_PASSCODE_KEY: &str = "passcode";
pub const BIOMETRIC_REASON: &str = "Unlock baby journal";

const WRONG_PASSCODE: &str = "Incorrect passcode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    LockDisabled,
    Biometric,
    Passcode,
    /// Nothing to verify against; access granted by policy.
    NoSecondFactor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "method", rename_all = "snake_case")]
pub enum AuthResult {
    Granted(AuthMethod),
    /// Show the passcode prompt and call `verify_passcode`.
    PasscodeRequired,
    Denied,
}

/// In-memory only; reset on process restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthSessionState {
    pub is_authenticated: bool,
    /// User-visible message from the last failed attempt.
    pub last_error: Option<String>,
}

pub struct AuthGate {
    credentials: Arc<dyn CredentialStore>,
    legacy: Arc<dyn LegacyPreferenceStore>,
    biometrics: Arc<dyn BiometricAuthenticator>,
    settings: Arc<dyn AuthSettingsStore>,
    config: AuthConfig,
    session: AuthSessionState,
}

impl AuthGate {
    /// Build a gate, loading the persisted lock flags.
    ///
    /// # Errors
    /// Returns an error if the settings store cannot be read.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        legacy: Arc<dyn LegacyPreferenceStore>,
        biometrics: Arc<dyn BiometricAuthenticator>,
        settings: Arc<dyn AuthSettingsStore>,
    ) -> Result<Self, AuthError> {
        let config = settings
            .load()
            .map_err(|e| AuthError::CredentialStoreReadFailed(e.to_string()))?;
        Ok(Self {
            credentials,
            legacy,
            biometrics,
            settings,
            config,
            session: AuthSessionState::default(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> AuthConfig {
        self.config
    }

    pub fn session(&self) -> &AuthSessionState {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated
    }

    /// Whether any passcode (hashed or legacy) is on file.
    pub fn has_stored_passcode(&self) -> Result<bool, AuthError> {
        if self.load_record()?.is_some() {
            return Ok(true);
        }
        let legacy = self
            .legacy
            .get_string(LEGACY_PASSCODE_KEY)
            .map_err(|e| AuthError::CredentialStoreReadFailed(e.to_string()))?;
        Ok(legacy.is_some_and(|p| !p.is_empty()))
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Decide whether the user may proceed without typing a passcode.
    ///
    /// Session state is only touched after the biometric prompt resolves,
    /// so dropping this future mid-prompt leaves the gate unchanged.
    pub async fn authenticate(&mut self) -> AuthResult {
        if !self.config.lock_enabled {
            return self.grant(AuthMethod::LockDisabled);
        }

        let biometric_ran = if self.biometrics.can_evaluate() {
            let outcome = self.biometrics.evaluate(BIOMETRIC_REASON).await;
            match outcome {
                Ok(true) => return self.grant(AuthMethod::Biometric),
                Ok(false) => {
                    self.fail(BiometricError::Failed("not recognized".into()).to_string());
                    true
                }
                Err(BiometricError::Unavailable) => false,
                Err(e) => {
                    tracing::warn!(error = %e, "biometric authentication failed");
                    self.fail(e.to_string());
                    true
                }
            }
        } else {
            false
        };

        if self.config.use_passcode {
            return AuthResult::PasscodeRequired;
        }
        if biometric_ran {
            self.session.is_authenticated = false;
            return AuthResult::Denied;
        }
        tracing::warn!("lock enabled but no biometrics or passcode available; granting access");
        self.grant(AuthMethod::NoSecondFactor)
    }

    /// Check a typed passcode.
    ///
    /// Returns `Ok(true)` without checking anything when the passcode gate
    /// is off. A plaintext passcode left by an older version is migrated to
    /// a hashed record on its first successful use.
    ///
    /// # Errors
    /// Store read failures, a corrupt record, or a failed migration write.
    pub fn verify_passcode(&mut self, candidate: &str) -> Result<bool, AuthError> {
        if !self.config.use_passcode {
            return Ok(true);
        }

        let verified = match self.load_record()? {
            Some(record) => record.verify(candidate),
            None => self.migrate_legacy(candidate)?,
        };

        if verified {
            self.grant(AuthMethod::Passcode);
        } else {
            self.fail(WRONG_PASSCODE.to_string());
        }
        Ok(verified)
    }

    /// Drop the authenticated flag, e.g. when the app goes to background.
    pub fn lock(&mut self) {
        self.session.is_authenticated = false;
    }

    // ── Credential lifecycle ─────────────────────────────────────────

    /// Store a new passcode under a fresh salt and turn the lock on.
    ///
    /// # Errors
    /// [`AuthError::PasscodeTooShort`], or a store write failure. On any
    /// error the previously stored passcode (if any) is still the one in
    /// effect.
    pub fn set_passcode(&mut self, new_passcode: &str) -> Result<(), AuthError> {
        if !passcode::is_acceptable(new_passcode) {
            return Err(AuthError::PasscodeTooShort {
                min: MIN_PASSCODE_LEN,
            });
        }

        let previous = self
            .credentials
            .get(CREDENTIAL_SERVICE, CREDENTIAL_ACCOUNT)
            .map_err(|e| AuthError::CredentialStoreReadFailed(e.to_string()))?;
        let record = PasscodeRecord::new(new_passcode);
        self.credentials
            .set(&record.encode(), CREDENTIAL_SERVICE, CREDENTIAL_ACCOUNT)
            .map_err(|e| AuthError::CredentialStoreWriteFailed(e.to_string()))?;

        if let Err(e) = self.save_config(AuthConfig {
            lock_enabled: true,
            use_passcode: true,
        }) {
            self.restore_credential(previous.as_deref());
            return Err(e);
        }
        self.clear_legacy();
        tracing::info!("passcode set");
        Ok(())
    }

    /// Replace the passcode after confirming the current one.
    ///
    /// Returns `Ok(false)` if `current` is wrong.
    pub fn change_passcode(&mut self, current: &str, new_passcode: &str) -> Result<bool, AuthError> {
        if !passcode::is_acceptable(new_passcode) {
            return Err(AuthError::PasscodeTooShort {
                min: MIN_PASSCODE_LEN,
            });
        }
        if !self.verify_passcode(current)? {
            return Ok(false);
        }
        self.set_passcode(new_passcode)?;
        Ok(true)
    }

    /// Delete the passcode; a biometric-only lock stays as configured.
    pub fn remove_passcode(&mut self) -> Result<(), AuthError> {
        self.disable_passcode(AuthConfig {
            lock_enabled: self.config.lock_enabled,
            use_passcode: false,
        })?;
        tracing::info!("passcode removed");
        Ok(())
    }

    /// Delete the passcode and disable the lock entirely.
    pub fn remove_authentication(&mut self) -> Result<(), AuthError> {
        self.disable_passcode(AuthConfig::default())?;
        tracing::info!("app lock removed");
        Ok(())
    }

    /// Toggle the biometric lock without touching the passcode.
    pub fn set_lock_enabled(&mut self, enabled: bool) -> Result<(), AuthError> {
        self.save_config(AuthConfig {
            lock_enabled: enabled,
            use_passcode: self.config.use_passcode,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn grant(&mut self, method: AuthMethod) -> AuthResult {
        self.session.is_authenticated = true;
        self.session.last_error = None;
        tracing::debug!(?method, "access granted");
        AuthResult::Granted(method)
    }

    fn fail(&mut self, message: String) {
        self.session.last_error = Some(message);
    }

    fn load_record(&self) -> Result<Option<PasscodeRecord>, AuthError> {
        let raw = self
            .credentials
            .get(CREDENTIAL_SERVICE, CREDENTIAL_ACCOUNT)
            .map_err(|e| AuthError::CredentialStoreReadFailed(e.to_string()))?;
        raw.as_deref().map(PasscodeRecord::decode).transpose()
    }

    /// Order matters: read legacy, verify, write the hashed record, and only
    /// then delete the legacy entry. A failed write leaves the legacy entry
    /// in place so the user can still get in next time.
    fn migrate_legacy(&mut self, candidate: &str) -> Result<bool, AuthError> {
        let legacy = self
            .legacy
            .get_string(LEGACY_PASSCODE_KEY)
            .map_err(|e| AuthError::CredentialStoreReadFailed(e.to_string()))?;
        let Some(legacy) = legacy.filter(|p| !p.is_empty()) else {
            tracing::warn!("passcode lock enabled but no passcode is stored");
            return Ok(false);
        };
        if !passcode::constant_time_eq(legacy.as_bytes(), candidate.as_bytes()) {
            return Ok(false);
        }

        let record = PasscodeRecord::new(candidate);
        self.credentials
            .set(&record.encode(), CREDENTIAL_SERVICE, CREDENTIAL_ACCOUNT)
            .map_err(|e| AuthError::MigrationFailed(e.to_string()))?;
        self.clear_legacy();
        tracing::info!("legacy passcode migrated to hashed record");
        Ok(true)
    }

    fn clear_legacy(&self) {
        // The hashed record is authoritative once written; a leftover legacy
        // entry is never consulted again.
        if let Err(e) = self.legacy.remove_key(LEGACY_PASSCODE_KEY) {
            tracing::warn!(error = %e, "failed to delete legacy passcode entry");
        }
    }

    /// Flags are written before the credential is deleted: a lock that
    /// still asks for a passcode must always have one to check against.
    fn disable_passcode(&mut self, config: AuthConfig) -> Result<(), AuthError> {
        let previous = self.config;
        self.save_config(config)?;
        if let Err(e) = self.delete_credential() {
            if let Err(restore) = self.save_config(previous) {
                tracing::warn!(error = %restore, "failed to restore lock settings");
            }
            return Err(e);
        }
        Ok(())
    }

    fn delete_credential(&mut self) -> Result<(), AuthError> {
        self.credentials
            .delete(CREDENTIAL_SERVICE, CREDENTIAL_ACCOUNT)
            .map_err(|e| AuthError::CredentialStoreWriteFailed(e.to_string()))?;
        self.legacy
            .remove_key(LEGACY_PASSCODE_KEY)
            .map_err(|e| AuthError::CredentialStoreWriteFailed(e.to_string()))?;
        Ok(())
    }

    /// Put back the credential that was in place before a failed update.
    fn restore_credential(&self, previous: Option<&str>) {
        let restored = match previous {
            Some(raw) => self
                .credentials
                .set(raw, CREDENTIAL_SERVICE, CREDENTIAL_ACCOUNT),
            None => self.credentials.delete(CREDENTIAL_SERVICE, CREDENTIAL_ACCOUNT),
        };
        if let Err(e) = restored {
            tracing::warn!(error = %e, "failed to restore previous passcode");
        }
    }

    fn save_config(&mut self, config: AuthConfig) -> Result<(), AuthError> {
        self.settings
            .save(&config)
            .map_err(|e| AuthError::SettingsWriteFailed(e.to_string()))?;
        self.config = config;
        Ok(())
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

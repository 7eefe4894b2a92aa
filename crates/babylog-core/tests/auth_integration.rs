//! Integration tests for the app lock gate.
//!
//! Collaborators are in-memory doubles; biometrics are scripted so every
//! branch of `authenticate` is reachable.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use babylog_core::auth::{
    AuthGate, BiometricAuthenticator, CredentialStore, LegacyPreferenceStore, MemoryAuthSettings,
    MemoryCredentialStore, MemoryLegacyStore, PasscodeRecord, BIOMETRIC_REASON,
    CREDENTIAL_ACCOUNT, CREDENTIAL_SERVICE, LEGACY_PASSCODE_KEY,
};
use babylog_core::{AuthConfig, AuthError, AuthMethod, AuthResult, BiometricError};

// ============================================================================
// Test Doubles
// ============================================================================

struct ScriptedBiometrics {
    available: bool,
    outcome: Result<bool, BiometricError>,
    calls: AtomicUsize,
}

impl ScriptedBiometrics {
    fn new(available: bool, outcome: Result<bool, BiometricError>) -> Arc<Self> {
        Arc::new(Self {
            available,
            outcome,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl BiometricAuthenticator for ScriptedBiometrics {
    fn can_evaluate(&self) -> bool {
        self.available
    }

    async fn evaluate(&self, reason: &str) -> Result<bool, BiometricError> {
        assert_eq!(reason, BIOMETRIC_REASON);
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

struct Harness {
    credentials: Arc<MemoryCredentialStore>,
    legacy: Arc<MemoryLegacyStore>,
    settings: Arc<MemoryAuthSettings>,
}

impl Harness {
    fn new(lock_enabled: bool, use_passcode: bool) -> Self {
        Self {
            credentials: Arc::new(MemoryCredentialStore::new()),
            legacy: Arc::new(MemoryLegacyStore::new()),
            settings: Arc::new(MemoryAuthSettings::new(AuthConfig {
                lock_enabled,
                use_passcode,
            })),
        }
    }

    fn gate(&self, biometrics: Arc<dyn BiometricAuthenticator>) -> AuthGate {
        AuthGate::new(
            self.credentials.clone(),
            self.legacy.clone(),
            biometrics,
            self.settings.clone(),
        )
        .unwrap()
    }

    fn stored_record(&self) -> Option<PasscodeRecord> {
        self.credentials
            .get(CREDENTIAL_SERVICE, CREDENTIAL_ACCOUNT)
            .unwrap()
            .map(|raw| PasscodeRecord::decode(&raw).unwrap())
    }
}

// ============================================================================
// authenticate()
// ============================================================================

#[tokio::test]
async fn test_lock_disabled_grants_without_prompt() {
    let h = Harness::new(false, false);
    let bio = ScriptedBiometrics::new(true, Ok(false));
    let mut gate = h.gate(bio.clone());

    assert_eq!(
        gate.authenticate().await,
        AuthResult::Granted(AuthMethod::LockDisabled)
    );
    assert!(gate.is_authenticated());
    assert_eq!(bio.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_biometric_success_grants() {
    let h = Harness::new(true, true);
    let bio = ScriptedBiometrics::new(true, Ok(true));
    let mut gate = h.gate(bio.clone());

    assert_eq!(
        gate.authenticate().await,
        AuthResult::Granted(AuthMethod::Biometric)
    );
    assert!(gate.is_authenticated());
    assert_eq!(bio.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_biometric_mismatch_falls_back_to_passcode() {
    let h = Harness::new(true, true);
    let mut gate = h.gate(ScriptedBiometrics::new(true, Ok(false)));

    assert_eq!(gate.authenticate().await, AuthResult::PasscodeRequired);
    assert!(!gate.is_authenticated());
    assert!(gate.session().last_error.is_some());
}

#[tokio::test]
async fn test_biometric_cancel_without_passcode_denies() {
    let h = Harness::new(true, false);
    let mut gate = h.gate(ScriptedBiometrics::new(
        true,
        Err(BiometricError::Cancelled),
    ));

    assert_eq!(gate.authenticate().await, AuthResult::Denied);
    assert!(!gate.is_authenticated());
}

#[tokio::test]
async fn test_no_biometrics_with_passcode_requires_passcode() {
    let h = Harness::new(true, true);
    let bio = ScriptedBiometrics::new(false, Ok(true));
    let mut gate = h.gate(bio.clone());

    assert_eq!(gate.authenticate().await, AuthResult::PasscodeRequired);
    assert_eq!(bio.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_biometrics_no_passcode_fails_open() {
    let h = Harness::new(true, false);
    let mut gate = h.gate(ScriptedBiometrics::new(false, Ok(false)));

    assert_eq!(
        gate.authenticate().await,
        AuthResult::Granted(AuthMethod::NoSecondFactor)
    );
    assert!(gate.is_authenticated());
}

#[tokio::test]
async fn test_unavailable_error_treated_as_no_biometrics() {
    let h = Harness::new(true, false);
    let mut gate = h.gate(ScriptedBiometrics::new(
        true,
        Err(BiometricError::Unavailable),
    ));

    assert_eq!(
        gate.authenticate().await,
        AuthResult::Granted(AuthMethod::NoSecondFactor)
    );
}

// ============================================================================
// Passcode lifecycle
// ============================================================================

#[test]
fn test_set_and_verify_passcode() {
    let h = Harness::new(false, false);
    let mut gate = h.gate(ScriptedBiometrics::new(false, Ok(false)));
    gate.set_passcode("1234").unwrap();

    assert!(!gate.is_authenticated());
    assert!(gate.verify_passcode("1234").unwrap());
    assert!(gate.is_authenticated());

    gate.lock();
    assert!(!gate.verify_passcode("0000").unwrap());
    assert!(!gate.is_authenticated());
}

#[test]
fn test_legacy_passcode_is_migrated() {
    let h = Harness::new(true, true);
    h.legacy.insert(LEGACY_PASSCODE_KEY, "5678");
    let mut gate = h.gate(ScriptedBiometrics::new(false, Ok(false)));

    assert!(gate.verify_passcode("5678").unwrap());
    assert!(!h.legacy.contains(LEGACY_PASSCODE_KEY));
    let record = h.stored_record().expect("hashed record written");
    assert!(record.verify("5678"));

    gate.lock();
    assert!(gate.verify_passcode("5678").unwrap());
    assert!(!gate.verify_passcode("8765").unwrap());
}

#[test]
fn test_wrong_legacy_passcode_leaves_legacy_in_place() {
    let h = Harness::new(true, true);
    h.legacy.insert(LEGACY_PASSCODE_KEY, "5678");
    let mut gate = h.gate(ScriptedBiometrics::new(false, Ok(false)));

    assert!(!gate.verify_passcode("0000").unwrap());
    assert!(h.legacy.contains(LEGACY_PASSCODE_KEY));
    assert!(h.stored_record().is_none());
}

#[test]
fn test_failed_migration_write_keeps_legacy() {
    let h = Harness::new(true, true);
    h.legacy.insert(LEGACY_PASSCODE_KEY, "5678");
    h.credentials.set_fail_writes(true);
    let mut gate = h.gate(ScriptedBiometrics::new(false, Ok(false)));

    assert!(matches!(
        gate.verify_passcode("5678"),
        Err(AuthError::MigrationFailed(_))
    ));
    assert!(!gate.is_authenticated());
    assert!(h.legacy.contains(LEGACY_PASSCODE_KEY));

    h.credentials.set_fail_writes(false);
    assert!(gate.verify_passcode("5678").unwrap());
    assert!(!h.legacy.contains(LEGACY_PASSCODE_KEY));
}

#[test]
fn test_legacy_cleanup_failure_still_grants() {
    let h = Harness::new(true, true);
    h.legacy.insert(LEGACY_PASSCODE_KEY, "5678");
    h.legacy.set_fail_removes(true);
    let mut gate = h.gate(ScriptedBiometrics::new(false, Ok(false)));

    assert!(gate.verify_passcode("5678").unwrap());
    assert!(h.stored_record().is_some());
    // Hashed record wins from now on.
    assert!(h.legacy.get_string(LEGACY_PASSCODE_KEY).unwrap().is_some());
    assert!(gate.verify_passcode("5678").unwrap());
}

#[test]
fn test_inactive_gate_accepts_any_input() {
    let h = Harness::new(true, false);
    let mut gate = h.gate(ScriptedBiometrics::new(false, Ok(false)));
    assert!(gate.verify_passcode("").unwrap());
    assert!(gate.verify_passcode("anything").unwrap());
}

#[test]
fn test_reset_passcode_uses_fresh_salt() {
    let h = Harness::new(false, false);
    let mut gate = h.gate(ScriptedBiometrics::new(false, Ok(false)));
    gate.set_passcode("1234").unwrap();
    let first = h.stored_record().unwrap();
    gate.set_passcode("1234").unwrap();
    let second = h.stored_record().unwrap();

    assert_ne!(first.salt(), second.salt());
    assert!(second.verify("1234"));
}

#[test]
fn test_settings_persist_across_gates() {
    let h = Harness::new(false, false);
    {
        let mut gate = h.gate(ScriptedBiometrics::new(false, Ok(false)));
        gate.set_passcode("2468").unwrap();
    }
    let mut gate = h.gate(ScriptedBiometrics::new(false, Ok(false)));
    assert!(gate.config().lock_enabled);
    assert!(gate.config().use_passcode);
    assert!(gate.has_stored_passcode().unwrap());
    assert!(gate.verify_passcode("2468").unwrap());
}

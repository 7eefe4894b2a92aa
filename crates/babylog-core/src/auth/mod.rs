//! App lock: biometric/passcode gate and passcode credential lifecycle.

mod biometric;
mod gate;
pub mod passcode;
mod settings;
mod store;

pub use biometric::{BiometricAuthenticator, UnavailableBiometrics};
pub use gate::{
    AuthGate, AuthMethod, AuthResult, AuthSessionState, BIOMETRIC_REASON, CREDENTIAL_ACCOUNT,
    CREDENTIAL_SERVICE, LEGACY_PASSCODE_KEY,
};
pub use passcode::PasscodeRecord;
pub use settings::{AuthConfig, AuthSettingsStore, ConfigAuthSettings, MemoryAuthSettings};
pub use store::{
    CredentialStore, DatabaseLegacyStore, KeyringCredentialStore, LegacyPreferenceStore,
    MemoryCredentialStore, MemoryLegacyStore,
};

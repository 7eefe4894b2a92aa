use async_trait::async_trait;

use crate::error::BiometricError;

/// Device biometric check (Face ID, fingerprint, ...).
///
/// `evaluate` may take arbitrarily long; callers must be prepared to drop
/// the future (app backgrounded mid-prompt). A dismissed prompt reports
/// [`BiometricError::Cancelled`].
#[async_trait]
pub trait BiometricAuthenticator: Send + Sync {
    fn can_evaluate(&self) -> bool;

    async fn evaluate(&self, reason: &str) -> Result<bool, BiometricError>;
}

/// For hosts without biometric hardware (terminals, servers).
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBiometrics;

#[async_trait]
impl BiometricAuthenticator for UnavailableBiometrics {
    fn can_evaluate(&self) -> bool {
        false
    }

    async fn evaluate(&self, _reason: &str) -> Result<bool, BiometricError> {
        Err(BiometricError::Unavailable)
    }
}

//! Persisted lock flags.
//!
//! The flags are plain preferences; they live apart from the credential so
//! lightweight storage (the TOML config) can back them.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::Config;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether the app is gated at all.
    #[serde(default)]
    pub lock_enabled: bool,
    /// Whether a passcode is the secondary factor.
    #[serde(default)]
    pub use_passcode: bool,
}

pub trait AuthSettingsStore: Send + Sync {
    fn load(&self) -> Result<AuthConfig, StoreError>;

    fn save(&self, config: &AuthConfig) -> Result<(), StoreError>;
}

/// Stores the flags in the `[security]` table of a config file.
#[derive(Debug, Clone)]
pub struct ConfigAuthSettings {
    path: PathBuf,
}

impl ConfigAuthSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings backed by the default config location.
    pub fn default_location() -> Result<Self, StoreError> {
        Ok(Self::new(Config::path()?))
    }
}

impl AuthSettingsStore for ConfigAuthSettings {
    fn load(&self) -> Result<AuthConfig, StoreError> {
        Ok(Config::load_from(&self.path)?.security)
    }

    fn save(&self, config: &AuthConfig) -> Result<(), StoreError> {
        let mut full = Config::load_from(&self.path)?;
        full.security = *config;
        full.save_to(&self.path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryAuthSettings {
    config: Mutex<AuthConfig>,
    fail_writes: AtomicBool,
}

impl MemoryAuthSettings {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Mutex::new(config),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn current(&self) -> AuthConfig {
        *self.config.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AuthSettingsStore for MemoryAuthSettings {
    fn load(&self) -> Result<AuthConfig, StoreError> {
        Ok(self.current())
    }

    fn save(&self, config: &AuthConfig) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        *self.config.lock().unwrap_or_else(|e| e.into_inner()) = *config;
        Ok(())
    }
}

//! Storage ports used by the app lock, with their adapters.
//!
//! - [`CredentialStore`]: hardened secret store for the hashed passcode
//!   (OS keyring in production).
//! - [`LegacyPreferenceStore`]: the old, non-secure preference storage a
//!   plaintext passcode may still sit in. Read once, then cleared.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::StoreError;
use crate::storage::Database;

/// Opaque key-value secret store.
pub trait CredentialStore: Send + Sync {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value for `(service, account)` in one write.
    fn set(&self, value: &str, service: &str, account: &str) -> Result<(), StoreError>;

    /// Deleting a missing entry is not an error.
    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError>;
}

/// Non-secure preference storage from older versions.
pub trait LegacyPreferenceStore: Send + Sync {
    fn get_string(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn remove_key(&self, key: &str) -> Result<(), StoreError>;
}

/// Thin wrapper around the OS keyring for credential storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringCredentialStore;

impl CredentialStore for KeyringCredentialStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, StoreError> {
        let entry = keyring::Entry::new(service, account)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, value: &str, service: &str, account: &str) -> Result<(), StoreError> {
        let entry = keyring::Entry::new(service, account)?;
        entry.set_password(value)?;
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError> {
        let entry = keyring::Entry::new(service, account)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process credential store.
///
/// Used by tests and by front-ends without an OS keyring. Writes can be
/// made to fail to exercise the recovery paths.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<(String, String), String>>,
    fail_writes: AtomicBool,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set`/`delete` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .lock()
            .get(&(service.to_string(), account.to_string()))
            .cloned())
    }

    fn set(&self, value: &str, service: &str, account: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.lock()
            .insert((service.to_string(), account.to_string()), value.to_string());
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.lock()
            .remove(&(service.to_string(), account.to_string()));
        Ok(())
    }
}

/// Legacy preferences living in the SQLite `kv` table.
pub struct DatabaseLegacyStore {
    db: Mutex<Database>,
}

impl DatabaseLegacyStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Open a dedicated connection to the database at `path`.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::new(Database::open_at(path)?))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LegacyPreferenceStore for DatabaseLegacyStore {
    fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().kv_get(key)?)
    }

    fn remove_key(&self, key: &str) -> Result<(), StoreError> {
        self.lock().kv_delete(key)?;
        Ok(())
    }
}

/// In-process legacy preferences.
#[derive(Debug, Default)]
pub struct MemoryLegacyStore {
    values: Mutex<HashMap<String, String>>,
    fail_removes: AtomicBool,
}

impl MemoryLegacyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.insert(key, value);
        store
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn set_fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LegacyPreferenceStore for MemoryLegacyStore {
    fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn remove_key(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("removes disabled".into()));
        }
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        assert!(store.get("svc", "acct").unwrap().is_none());
        store.set("secret", "svc", "acct").unwrap();
        assert_eq!(store.get("svc", "acct").unwrap().as_deref(), Some("secret"));
        assert!(store.get("svc", "other").unwrap().is_none());
        store.delete("svc", "acct").unwrap();
        store.delete("svc", "acct").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn memory_store_write_failure() {
        let store = MemoryCredentialStore::new();
        store.set_fail_writes(true);
        assert!(matches!(
            store.set("x", "svc", "acct"),
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.get("svc", "acct").unwrap().is_none());
    }

    #[test]
    fn database_legacy_store_reads_and_clears_kv() {
        let db = Database::open_memory().unwrap();
        db.kv_set("passcode", "5678").unwrap();
        let legacy = DatabaseLegacyStore::new(db);
        assert_eq!(legacy.get_string("passcode").unwrap().as_deref(), Some("5678"));
        legacy.remove_key("passcode").unwrap();
        assert!(legacy.get_string("passcode").unwrap().is_none());
        legacy.remove_key("passcode").unwrap();
    }
}

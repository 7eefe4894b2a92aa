//! Core error types for babylog-core.
//!
//! Invalid timer transitions are deliberately absent from this hierarchy:
//! the timer engine ignores them and reports `None` instead of an error.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for babylog-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// App lock / passcode errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Stored row could not be decoded into a record
    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Passcode and credential lifecycle errors.
///
/// All of these are recoverable: the caller is expected to show a message
/// and let the user retry.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The secure store rejected a write; the new passcode was not saved.
    #[error("Failed to save passcode to the credential store: {0}")]
    CredentialStoreWriteFailed(String),

    /// The secure store could not be read.
    #[error("Failed to read the credential store: {0}")]
    CredentialStoreReadFailed(String),

    /// A legacy passcode matched but could not be re-stored securely.
    /// The legacy entry is left in place.
    #[error("Passcode migration failed: {0}")]
    MigrationFailed(String),

    /// Passcode shorter than the minimum length.
    #[error("Passcode must be at least {min} characters")]
    PasscodeTooShort { min: usize },

    /// Stored credential could not be decoded.
    #[error("Stored passcode record is corrupt: {0}")]
    CorruptCredential(String),

    /// Lock settings could not be persisted.
    #[error("Failed to save lock settings: {0}")]
    SettingsWriteFailed(String),
}

/// Failures reported by the storage ports the app lock depends on.
#[derive(Error, Debug)]
pub enum StoreError {
    /// OS keyring failure
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Backing database failure
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Backing config file failure
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Store refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Biometric verification failures. Never fatal; the gate falls through to
/// the passcode path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BiometricError {
    /// No biometric hardware or no enrolled identity.
    #[error("Biometric authentication is unavailable")]
    Unavailable,

    /// The biometric check ran and did not match.
    #[error("Biometric authentication failed: {0}")]
    Failed(String),

    /// The prompt was dismissed by the user or the OS.
    #[error("Biometric prompt was cancelled")]
    Cancelled,
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end ({end}) must not be before start ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// A timer session was saved before it was stopped
    #[error("Timer must be stopped before it can be saved")]
    TimerNotStopped,

    /// Referenced baby does not exist
    #[error("Unknown baby: {0}")]
    UnknownBaby(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

//! Salted passcode hashing.
//!
//! A record is `SHA256(salt || passcode)` with a fresh 16-byte salt, stored
//! as one JSON string so a single credential-store write replaces it whole.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AuthError;

pub const SALT_BYTES: usize = 16;
pub const HASH_BYTES: usize = 32;
pub const MIN_PASSCODE_LEN: usize = 4;

const RECORD_VERSION: u8 = 1;

#[derive(Clone, PartialEq, Eq)]
pub struct PasscodeRecord {
    salt: [u8; SALT_BYTES],
    hash: [u8; HASH_BYTES],
}

#[derive(Serialize, Deserialize)]
struct StoredRecord {
    v: u8,
    salt: String,
    hash: String,
}

impl PasscodeRecord {
    /// Hash `passcode` under a fresh random salt.
    pub fn new(passcode: &str) -> Self {
        let mut salt = [0u8; SALT_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut salt);
        Self::with_salt(passcode, salt)
    }

    pub fn with_salt(passcode: &str, salt: [u8; SALT_BYTES]) -> Self {
        Self {
            salt,
            hash: hash_passcode(&salt, passcode),
        }
    }

    pub fn salt(&self) -> &[u8; SALT_BYTES] {
        &self.salt
    }

    pub fn verify(&self, candidate: &str) -> bool {
        constant_time_eq(&self.hash, &hash_passcode(&self.salt, candidate))
    }

    pub fn encode(&self) -> String {
        let stored = StoredRecord {
            v: RECORD_VERSION,
            salt: hex::encode(self.salt),
            hash: hex::encode(self.hash),
        };
        // Plain struct of strings; serialization cannot fail.
        serde_json::to_string(&stored).unwrap_or_default()
    }

    pub fn decode(raw: &str) -> Result<Self, AuthError> {
        let stored: StoredRecord =
            serde_json::from_str(raw).map_err(|e| AuthError::CorruptCredential(e.to_string()))?;
        if stored.v != RECORD_VERSION {
            return Err(AuthError::CorruptCredential(format!(
                "unsupported record version {}",
                stored.v
            )));
        }
        Ok(Self {
            salt: decode_fixed(&stored.salt, "salt")?,
            hash: decode_fixed(&stored.hash, "hash")?,
        })
    }
}

impl std::fmt::Debug for PasscodeRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasscodeRecord")
            .field("salt", &hex::encode(self.salt))
            .field("hash", &"<redacted>")
            .finish()
    }
}

/// Whether `passcode` satisfies the minimum length, counted in characters.
pub fn is_acceptable(passcode: &str) -> bool {
    passcode.chars().count() >= MIN_PASSCODE_LEN
}

fn hash_passcode(salt: &[u8], passcode: &str) -> [u8; HASH_BYTES] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(passcode.as_bytes());
    let mut out = [0u8; HASH_BYTES];
    out.copy_from_slice(&hasher.finalize());
    out
}

fn decode_fixed<const N: usize>(hex_str: &str, field: &str) -> Result<[u8; N], AuthError> {
    let bytes =
        hex::decode(hex_str).map_err(|e| AuthError::CorruptCredential(format!("{field}: {e}")))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        AuthError::CorruptCredential(format!("{field}: expected {N} bytes, got {}", b.len()))
    })
}

/// Constant-time byte comparison to prevent timing attacks.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

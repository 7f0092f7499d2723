//! Per-paste content key storage
//!
//! Exactly one key per content id. A paste starts life under an
//! *ephemeral* id minted on this device (`tmp-<uuid>`) and, once the
//! service accepts it, its key is moved to the *durable* id the service
//! assigned. The key itself never changes.
//!
//! Records are the key's 32 bytes, standard base64 encoded.

mod fs;
mod memory;
mod provider;

pub use fs::FsKeyStore;
pub use memory::MemoryKeyStore;
pub use provider::{KeyStoreProvider, ProviderError};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use uuid::Uuid;

use crate::crypto::ContentKey;

/// Prefix of client-minted ids
pub const EPHEMERAL_PREFIX: &str = "tmp-";

/// Mint a fresh ephemeral id
pub fn ephemeral_id() -> String {
    format!("{}{}", EPHEMERAL_PREFIX, Uuid::new_v4())
}

pub fn is_ephemeral_id(id: &str) -> bool {
    id.starts_with(EPHEMERAL_PREFIX)
}

#[derive(Debug, thiserror::Error)]
pub enum KeyStoreError {
    #[error("invalid key id {0:?}")]
    InvalidId(String),
    #[error("key not found for {0}")]
    KeyNotFound(String),
    #[error("a key already exists for {0}")]
    AlreadyExists(String),
    #[error("stored key for {0} is not valid base64")]
    InvalidKeyEncoding(String),
    #[error("stored key for {id} has length {len}, expected 32")]
    InvalidKeyLength { id: String, len: usize },
    #[error("crypto fault: {0}")]
    CryptoFault(String),
    #[error("key storage error: {0}")]
    Storage(#[source] ProviderError),
}

/// Result of a successful [`ContentKeyStore::move_key`]
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The key is under the new id and the old record is gone
    Moved,
    /// The key is durable under the new id but the old record could not be
    ///  removed. The duplicate is left for manual cleanup.
    SourceRetained { reason: String },
}

/// Id-addressed content keys over a [`KeyStoreProvider`]
#[derive(Debug, Clone)]
pub struct ContentKeyStore<P> {
    provider: P,
}

impl<P: KeyStoreProvider> ContentKeyStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Create and persist a new random key under `id`.
    ///
    /// Never overwrites: fails with `AlreadyExists` if `id` already has a key.
    pub fn generate(&self, id: &str) -> Result<ContentKey, KeyStoreError> {
        validate_id(id)?;
        let key = ContentKey::generate().map_err(|e| KeyStoreError::CryptoFault(e.to_string()))?;
        self.insert(id, &key)?;
        tracing::debug!(id, "generated content key");
        Ok(key)
    }

    /// Load the key stored under `id`
    pub fn get(&self, id: &str) -> Result<ContentKey, KeyStoreError> {
        validate_id(id)?;
        let record = self
            .provider
            .load(id)
            .map_err(KeyStoreError::Storage)?
            .ok_or_else(|| KeyStoreError::KeyNotFound(id.to_string()))?;
        decode_record(id, &record)
    }

    /// Remove the key under `id`; a missing key is not an error
    pub fn delete(&self, id: &str) -> Result<(), KeyStoreError> {
        validate_id(id)?;
        self.provider.remove(id).map_err(KeyStoreError::Storage)
    }

    /// Re-address the key under `old_id` to `new_id`.
    ///
    /// The new record is written (and durable) before the old one is
    /// touched. If reading `old_id` or writing `new_id` fails nothing has
    /// changed. If only the final removal fails the move still succeeds
    /// with [`MoveOutcome::SourceRetained`]: a leaked duplicate is
    /// preferable to losing the key under the id the service knows.
    ///
    /// Retrying a move whose removal failed is safe: an existing record
    /// under `new_id` holding the *same* key counts as written. A
    /// different key there is `AlreadyExists`.
    pub fn move_key(&self, old_id: &str, new_id: &str) -> Result<MoveOutcome, KeyStoreError> {
        validate_id(new_id)?;
        let key = self.get(old_id)?;
        if old_id == new_id {
            return Ok(MoveOutcome::Moved);
        }

        match self.insert(new_id, &key) {
            Ok(()) => {}
            Err(KeyStoreError::AlreadyExists(_)) => {
                if self.get(new_id)? != key {
                    return Err(KeyStoreError::AlreadyExists(new_id.to_string()));
                }
                tracing::debug!(new_id, "key already present under new id");
            }
            Err(e) => return Err(e),
        }

        match self.provider.remove(old_id) {
            Ok(()) => {
                tracing::debug!(old_id, new_id, "moved content key");
                Ok(MoveOutcome::Moved)
            }
            Err(e) => {
                tracing::warn!(
                    old_id,
                    new_id,
                    "content key copied but old record could not be removed: {}",
                    e
                );
                Ok(MoveOutcome::SourceRetained {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Every id with a stored key
    pub fn ids(&self) -> Result<Vec<String>, KeyStoreError> {
        self.provider.ids().map_err(KeyStoreError::Storage)
    }

    fn insert(&self, id: &str, key: &ContentKey) -> Result<(), KeyStoreError> {
        let record = STANDARD.encode(key.bytes());
        self.provider
            .insert_new(id, record.as_bytes())
            .map_err(|e| match e {
                ProviderError::AlreadyExists => KeyStoreError::AlreadyExists(id.to_string()),
                e => KeyStoreError::Storage(e),
            })
    }
}

/// Ids become file names, so only a conservative alphabet is accepted
fn validate_id(id: &str) -> Result<(), KeyStoreError> {
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(KeyStoreError::InvalidId(id.to_string()))
    }
}

fn decode_record(id: &str, record: &[u8]) -> Result<ContentKey, KeyStoreError> {
    let text = std::str::from_utf8(record)
        .map_err(|_| KeyStoreError::InvalidKeyEncoding(id.to_string()))?;
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|_| KeyStoreError::InvalidKeyEncoding(id.to_string()))?;
    ContentKey::try_from(bytes.as_slice()).map_err(|e| KeyStoreError::InvalidKeyLength {
        id: id.to_string(),
        len: e.0,
    })
}

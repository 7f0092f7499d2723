//! The user's long-lived identity
//!
//! An [`Identity`] is an Ed25519 keypair plus the account id the service
//! handed out at registration. It is created once, persisted through a
//! [`CredentialStore`], and loaded on every launch after that.

mod store;

pub use store::{
    CredentialStore, CredentialStoreError, FileCredentialStore, IdentityRecord,
    MemoryCredentialStore,
};

use std::fmt;

use crate::crypto::{KeyError, PublicKey, SecretKey, Signature};

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("no identity found, please register first")]
    NotRegistered,
    #[error("stored identity is corrupt: {0}")]
    CorruptIdentity(String),
    #[error("identity has no account id yet")]
    Incomplete,
    #[error("failed to generate identity key: {0}")]
    Key(#[from] KeyError),
    #[error("credential store error: {0}")]
    Store(#[source] CredentialStoreError),
}

/// Signing identity
///
/// The public key is always derived from the secret key rather than stored
/// alongside it, so the two can never disagree in memory.
#[derive(Clone)]
pub struct Identity {
    account_id: Option<String>,
    secret_key: SecretKey,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("account_id", &self.account_id)
            .field("public_key", &self.public_key().to_base64())
            .finish()
    }
}

impl Identity {
    pub fn new(secret_key: SecretKey, account_id: Option<String>) -> Self {
        Self {
            account_id,
            secret_key,
        }
    }

    /// Fresh keypair, not yet registered
    pub fn generate() -> Result<Self, KeyError> {
        Ok(Self::new(SecretKey::generate()?, None))
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn public_key(&self) -> PublicKey {
        self.secret_key.public()
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn sign(&self, msg: &[u8]) -> Signature {
        self.secret_key.sign(msg)
    }

    pub fn to_record(&self) -> IdentityRecord {
        IdentityRecord {
            user_id: self.account_id.clone(),
            public_key: self.public_key().to_base64(),
            private_key: self.secret_key.to_keypair_base64(),
        }
    }

    /// Decode a stored record, checking that the stored public key is the
    /// one the secret key derives
    pub fn from_record(record: &IdentityRecord) -> Result<Self, IdentityError> {
        let corrupt = |e: KeyError| IdentityError::CorruptIdentity(e.to_string());

        let secret_key = SecretKey::from_base64(&record.private_key).map_err(corrupt)?;
        let public_key = PublicKey::from_base64(&record.public_key).map_err(corrupt)?;
        if secret_key.public() != public_key {
            return Err(IdentityError::CorruptIdentity(
                "public key does not match private key".to_string(),
            ));
        }

        let account_id = record.user_id.clone().filter(|id| !id.trim().is_empty());
        Ok(Self::new(secret_key, account_id))
    }
}

/// Loads and creates identities through a [`CredentialStore`]
#[derive(Debug, Clone)]
pub struct IdentityManager<S> {
    store: S,
}

impl<S: CredentialStore> IdentityManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the persisted identity
    pub fn load(&self) -> Result<Identity, IdentityError> {
        let record = self
            .store
            .load_identity()
            .map_err(|e| match e {
                CredentialStoreError::Malformed(reason) => IdentityError::CorruptIdentity(reason),
                e => IdentityError::Store(e),
            })?
            .ok_or(IdentityError::NotRegistered)?;
        Identity::from_record(&record)
    }

    /// Generate a new keypair. Nothing is persisted; see [`IdentityManager::save`].
    pub fn create(&self) -> Result<Identity, IdentityError> {
        let identity = Identity::generate()?;
        tracing::debug!(public_key = %identity.public_key(), "generated identity keypair");
        Ok(identity)
    }

    /// Persist a registered identity. An identity without an account id is
    /// refused, as a half-finished registration is not worth keeping.
    pub fn save(&self, identity: &Identity) -> Result<(), IdentityError> {
        if identity.account_id().is_none() {
            return Err(IdentityError::Incomplete);
        }
        self.store
            .save_identity(&identity.to_record())
            .map_err(IdentityError::Store)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_unregistered() {
        let manager = IdentityManager::new(MemoryCredentialStore::new());
        assert!(matches!(manager.load(), Err(IdentityError::NotRegistered)));
    }

    #[test]
    fn test_create_does_not_persist() {
        let manager = IdentityManager::new(MemoryCredentialStore::new());
        let identity = manager.create().unwrap();
        assert!(identity.account_id().is_none());
        assert!(matches!(manager.load(), Err(IdentityError::NotRegistered)));
    }

    #[test]
    fn test_save_and_load() {
        let manager = IdentityManager::new(MemoryCredentialStore::new());
        let identity = manager.create().unwrap().with_account_id("acct-7");
        manager.save(&identity).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.account_id(), Some("acct-7"));
        assert_eq!(loaded.public_key(), identity.public_key());
        assert_eq!(
            loaded.secret_key().to_bytes(),
            identity.secret_key().to_bytes()
        );
    }

    #[test]
    fn test_save_requires_account_id() {
        let manager = IdentityManager::new(MemoryCredentialStore::new());
        let identity = manager.create().unwrap();
        assert!(matches!(manager.save(&identity), Err(IdentityError::Incomplete)));
    }

    #[test]
    fn test_mismatched_public_key_is_corrupt() {
        let identity = Identity::generate().unwrap().with_account_id("a");
        let mut record = identity.to_record();
        record.public_key = SecretKey::generate().unwrap().public().to_base64();

        let manager = IdentityManager::new(MemoryCredentialStore::with_record(record));
        assert!(matches!(manager.load(), Err(IdentityError::CorruptIdentity(_))));
    }

    #[test]
    fn test_garbage_keys_are_corrupt() {
        let record = IdentityRecord {
            user_id: Some("a".to_string()),
            public_key: "???".to_string(),
            private_key: "also not base64".to_string(),
        };
        let manager = IdentityManager::new(MemoryCredentialStore::with_record(record));
        assert!(matches!(manager.load(), Err(IdentityError::CorruptIdentity(_))));
    }

    #[test]
    fn test_seed_only_private_key_loads() {
        use base64::{engine::general_purpose::STANDARD, Engine as _};

        let key = SecretKey::generate().unwrap();
        let record = IdentityRecord {
            user_id: Some("a".to_string()),
            public_key: key.public().to_base64(),
            private_key: STANDARD.encode(key.to_bytes()),
        };
        let identity = Identity::from_record(&record).unwrap();
        assert_eq!(identity.public_key(), key.public());
    }

    #[test]
    fn test_debug_hides_secret() {
        let identity = Identity::generate().unwrap();
        let debug = format!("{:?}", identity);
        assert!(!debug.contains(&identity.secret_key().to_keypair_base64()));
    }
}

//! Shared test utilities for paste workflow integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::crypto::{AesGcmCipher, Cipher, ContentKey, SecretError};
use common::identity::Identity;
use common::key_store::{ContentKeyStore, KeyStoreProvider, MemoryKeyStore, ProviderError};
use common::service::{CreatePasteResponse, PasteRequest, PasteService};
use common::workflow::PasteCrypto;

#[derive(Debug, thiserror::Error)]
#[error("mock service unavailable")]
pub struct MockServiceError;

/// In-process stand-in for the paste service
///
/// Records every request it receives and answers with a fixed id.
#[derive(Debug, Default)]
pub struct MockPasteService {
    pub next_id: String,
    pub fail: bool,
    pub received: Mutex<Vec<(PasteRequest, String)>>,
}

impl MockPasteService {
    pub fn returning(id: &str) -> Self {
        Self {
            next_id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<(PasteRequest, String)> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl PasteService for MockPasteService {
    type Error = MockServiceError;

    async fn create_paste(
        &self,
        request: &PasteRequest,
        token: &str,
    ) -> Result<CreatePasteResponse, Self::Error> {
        self.received
            .lock()
            .unwrap()
            .push((request.clone(), token.to_string()));
        if self.fail {
            return Err(MockServiceError);
        }
        Ok(CreatePasteResponse {
            id: self.next_id.clone(),
            url: format!("http://localhost:8081/pastes/{}", self.next_id),
        })
    }
}

/// AES-GCM cipher that counts how often it is asked to decrypt
#[derive(Debug, Clone, Default)]
pub struct CountingCipher {
    pub decrypts: Arc<AtomicUsize>,
}

impl CountingCipher {
    pub fn decrypt_count(&self) -> usize {
        self.decrypts.load(Ordering::SeqCst)
    }
}

impl Cipher for CountingCipher {
    fn encrypt(&self, key: &ContentKey, plaintext: &[u8]) -> Result<Vec<u8>, SecretError> {
        AesGcmCipher.encrypt(key, plaintext)
    }

    fn decrypt(&self, key: &ContentKey, sealed: &[u8]) -> Result<Vec<u8>, SecretError> {
        self.decrypts.fetch_add(1, Ordering::SeqCst);
        AesGcmCipher.decrypt(key, sealed)
    }
}

/// Memory provider whose `remove` always fails
#[derive(Debug, Clone, Default)]
pub struct StickyProvider {
    pub inner: MemoryKeyStore,
}

impl KeyStoreProvider for StickyProvider {
    fn load(&self, id: &str) -> Result<Option<Vec<u8>>, ProviderError> {
        self.inner.load(id)
    }

    fn insert_new(&self, id: &str, record: &[u8]) -> Result<(), ProviderError> {
        self.inner.insert_new(id, record)
    }

    fn remove(&self, _id: &str) -> Result<(), ProviderError> {
        Err(ProviderError::Internal("device is read-only".to_string()))
    }

    fn ids(&self) -> Result<Vec<String>, ProviderError> {
        self.inner.ids()
    }
}

/// Memory provider that refuses every write
#[derive(Debug, Clone, Default)]
pub struct ReadOnlyProvider {
    pub inner: MemoryKeyStore,
}

impl KeyStoreProvider for ReadOnlyProvider {
    fn load(&self, id: &str) -> Result<Option<Vec<u8>>, ProviderError> {
        self.inner.load(id)
    }

    fn insert_new(&self, _id: &str, _record: &[u8]) -> Result<(), ProviderError> {
        Err(ProviderError::Internal("no space left on device".to_string()))
    }

    fn remove(&self, id: &str) -> Result<(), ProviderError> {
        self.inner.remove(id)
    }

    fn ids(&self) -> Result<Vec<String>, ProviderError> {
        self.inner.ids()
    }
}

pub fn registered_identity() -> Identity {
    Identity::generate().unwrap().with_account_id("acct-1")
}

/// A memory-backed crypto context with a counting cipher
pub fn setup_crypto() -> (PasteCrypto<MemoryKeyStore, CountingCipher>, CountingCipher) {
    let cipher = CountingCipher::default();
    let crypto = PasteCrypto::with_cipher(
        ContentKeyStore::new(MemoryKeyStore::new()),
        cipher.clone(),
        registered_identity(),
    );
    (crypto, cipher)
}

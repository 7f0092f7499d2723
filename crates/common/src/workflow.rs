//! Paste encryption flows
//!
//! **Publishing** a paste walks `Composing -> Sealed -> Submitted -> Reconciled`:
//! 1. a fresh ephemeral id is minted and a key generated under it,
//! 2. the payload is encrypted and the *ciphertext* signed,
//! 3. the service accepts the paste and returns its durable id,
//! 4. the key is moved from the ephemeral id to the durable id.
//!
//! Each step needs the previous step's output, so the order cannot be
//! changed by callers. If a task is dropped before step 4 the ephemeral key
//! stays on disk; it is the only copy of a key for data the service may
//! already hold.
//!
//! **Revealing** a paste walks `Fetched -> Verified -> Decrypted -> Parsed`.
//! The signature is checked before the key store or the cipher is touched.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::crypto::{AesGcmCipher, Cipher, SecretError, Signature};
use crate::identity::Identity;
use crate::key_store::{self, ContentKeyStore, KeyStoreError, KeyStoreProvider, MoveOutcome};
use crate::paste::{EncryptedContent, Payload};
use crate::service::{PasteRequest, PasteService};

#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    #[error("expiry must be at least one second")]
    InvalidExpiry,
    #[error("failed to serialize payload: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),
    #[error("failed to encrypt payload: {0}")]
    Cipher(#[from] SecretError),
}

#[derive(Debug, thiserror::Error)]
pub enum RevealError {
    #[error("signature does not match ciphertext")]
    SignatureMismatch,
    #[error("no local key for paste {0}")]
    KeyNotFound(String),
    #[error(transparent)]
    KeyStore(KeyStoreError),
    #[error("authentication failed")]
    AuthenticationFailed,
    /// The plaintext authenticated but is not a paste payload. The raw bytes
    ///  are kept for diagnostics.
    #[error("decrypted payload is malformed")]
    PayloadCorrupt { raw: Vec<u8> },
}

/// The paste is stored remotely but its key is still under the ephemeral id
#[derive(Debug, thiserror::Error)]
#[error("paste {durable_id} was stored but its key is still under {ephemeral_id}: {source}")]
pub struct KeyReconciliationFailed {
    pub ephemeral_id: String,
    pub durable_id: String,
    #[source]
    pub source: KeyStoreError,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Prepare(#[from] PrepareError),
    #[error("failed to submit paste (key kept under {ephemeral_id}): {source}")]
    Submit {
        ephemeral_id: String,
        #[source]
        source: E,
    },
}

/// A sealed and signed paste, not yet submitted
#[derive(Debug, Clone)]
pub struct SealedPaste {
    ephemeral_id: String,
    ciphertext: Vec<u8>,
    signature: Signature,
    request: PasteRequest,
}

impl SealedPaste {
    pub fn ephemeral_id(&self) -> &str {
        &self.ephemeral_id
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The transport form of this paste
    pub fn request(&self) -> &PasteRequest {
        &self.request
    }

    /// Hand the paste to the service
    pub async fn submit<S>(&self, service: &S, token: &str) -> Result<SubmittedPaste, S::Error>
    where
        S: PasteService + ?Sized,
    {
        let response = service.create_paste(&self.request, token).await?;
        Ok(SubmittedPaste {
            ephemeral_id: self.ephemeral_id.clone(),
            durable_id: response.id,
            url: response.url,
        })
    }
}

/// A paste the service accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedPaste {
    pub ephemeral_id: String,
    pub durable_id: String,
    pub url: String,
}

/// Outcome of [`PasteCrypto::publish`]
#[derive(Debug)]
pub struct Published {
    pub durable_id: String,
    pub url: String,
    pub ephemeral_id: String,
    /// Set when the paste was stored but its key could not be moved.
    ///  Revealing it will fail until the key is recovered.
    pub warning: Option<KeyReconciliationFailed>,
}

/// Seals pastes for submission and opens fetched ones
#[derive(Debug)]
pub struct PasteCrypto<P, C = AesGcmCipher> {
    keys: ContentKeyStore<P>,
    cipher: C,
    identity: Identity,
}

impl<P: KeyStoreProvider> PasteCrypto<P> {
    pub fn new(keys: ContentKeyStore<P>, identity: Identity) -> Self {
        Self::with_cipher(keys, AesGcmCipher, identity)
    }
}

impl<P: KeyStoreProvider, C: Cipher> PasteCrypto<P, C> {
    pub fn with_cipher(keys: ContentKeyStore<P>, cipher: C, identity: Identity) -> Self {
        Self {
            keys,
            cipher,
            identity,
        }
    }

    pub fn key_store(&self) -> &ContentKeyStore<P> {
        &self.keys
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Generate a key under a fresh ephemeral id, then encrypt and sign
    pub fn prepare_submission(
        &self,
        title: &str,
        body: &str,
        expires_in: Duration,
    ) -> Result<SealedPaste, PrepareError> {
        if expires_in.as_secs() == 0 {
            return Err(PrepareError::InvalidExpiry);
        }

        let plaintext = Payload::new(title, body).to_bytes()?;
        let ephemeral_id = key_store::ephemeral_id();
        let key = self.keys.generate(&ephemeral_id)?;

        let ciphertext = self.cipher.encrypt(&key, &plaintext)?;
        let signature = self.identity.sign(&ciphertext);

        let request = PasteRequest {
            ciphertext: STANDARD.encode(&ciphertext),
            signature: STANDARD.encode(signature.to_bytes()),
            public_key: self.identity.public_key().to_base64(),
            expires_in: expires_in.as_secs(),
        };

        tracing::debug!(ephemeral_id = %ephemeral_id, "sealed paste");
        Ok(SealedPaste {
            ephemeral_id,
            ciphertext,
            signature,
            request,
        })
    }

    /// Move a submitted paste's key from its ephemeral id to its durable id
    pub fn reconcile(
        &self,
        ephemeral_id: &str,
        durable_id: &str,
    ) -> Result<(), KeyReconciliationFailed> {
        match self.keys.move_key(ephemeral_id, durable_id) {
            Ok(MoveOutcome::Moved) => Ok(()),
            Ok(MoveOutcome::SourceRetained { reason }) => {
                tracing::warn!(
                    ephemeral_id,
                    durable_id,
                    "key reconciled, ephemeral record left behind: {}",
                    reason
                );
                Ok(())
            }
            Err(source) => {
                tracing::warn!(
                    ephemeral_id,
                    durable_id,
                    "key reconciliation failed: {}",
                    source
                );
                Err(KeyReconciliationFailed {
                    ephemeral_id: ephemeral_id.to_string(),
                    durable_id: durable_id.to_string(),
                    source,
                })
            }
        }
    }

    /// Seal, submit and reconcile in one go.
    ///
    /// A failed reconcile does not fail the publish: the paste is already
    /// stored remotely, so it is reported in [`Published::warning`].
    pub async fn publish<S>(
        &self,
        title: &str,
        body: &str,
        expires_in: Duration,
        service: &S,
        token: &str,
    ) -> Result<Published, PublishError<S::Error>>
    where
        S: PasteService + ?Sized,
    {
        let sealed = self.prepare_submission(title, body, expires_in)?;
        let submitted = sealed
            .submit(service, token)
            .await
            .map_err(|source| PublishError::Submit {
                ephemeral_id: sealed.ephemeral_id().to_string(),
                source,
            })?;

        let warning = self
            .reconcile(&submitted.ephemeral_id, &submitted.durable_id)
            .err();

        tracing::info!(durable_id = %submitted.durable_id, "published paste");
        Ok(Published {
            durable_id: submitted.durable_id,
            url: submitted.url,
            ephemeral_id: submitted.ephemeral_id,
            warning,
        })
    }

    /// Verify, decrypt and parse a fetched paste
    pub fn reveal(
        &self,
        content: &EncryptedContent,
        durable_id: &str,
    ) -> Result<Payload, RevealError> {
        if !content.signer.verify(&content.ciphertext, &content.signature) {
            tracing::debug!(durable_id, "rejected paste with bad signature");
            return Err(RevealError::SignatureMismatch);
        }

        let key = self.keys.get(durable_id).map_err(|e| match e {
            KeyStoreError::KeyNotFound(id) => RevealError::KeyNotFound(id),
            e => RevealError::KeyStore(e),
        })?;

        let plaintext = self
            .cipher
            .decrypt(&key, &content.ciphertext)
            .map_err(|_| RevealError::AuthenticationFailed)?;

        match Payload::from_bytes(&plaintext) {
            Ok(payload) => Ok(payload),
            Err(_) => Err(RevealError::PayloadCorrupt { raw: plaintext }),
        }
    }
}

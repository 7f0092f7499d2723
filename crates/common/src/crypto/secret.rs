//! Content encryption using AES-256-GCM
//!
//! Every paste is sealed under its own [`ContentKey`]. The key lives in the
//! key store under the paste's id for the whole life of the paste; nothing
//! here generates a key that is not then stored.

use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};

/// Size of the AES-GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of the content key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;
/// Size of the AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Errors that can occur during encryption/decryption
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretError {
    #[error("crypto fault: {0}")]
    CryptoFault(String),
    /// Wrong key, truncated input or any altered byte. Deliberately carries no detail.
    #[error("authentication failed")]
    AuthenticationFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid content key length, expected 32, got {0}")]
pub struct InvalidKeyLength(pub usize);

/// A 256-bit symmetric key for a single paste
///
/// The sealed format is `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
/// A fresh random nonce is drawn for every call to [`ContentKey::encrypt`].
///
/// # Examples
///
/// ```ignore
/// let key = ContentKey::generate()?;
/// let sealed = key.encrypt(b"sensitive data")?;
/// assert_eq!(key.decrypt(&sealed)?, b"sensitive data");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ContentKey([u8; KEY_SIZE]);

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentKey(..)")
    }
}

impl From<[u8; KEY_SIZE]> for ContentKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        ContentKey(bytes)
    }
}

impl TryFrom<&[u8]> for ContentKey {
    type Error = InvalidKeyLength;
    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; KEY_SIZE] = data.try_into().map_err(|_| InvalidKeyLength(data.len()))?;
        Ok(bytes.into())
    }
}

impl ContentKey {
    /// Generate a new random key from the OS random source
    pub fn generate() -> Result<Self, SecretError> {
        let mut buff = [0; KEY_SIZE];
        getrandom::getrandom(&mut buff)
            .map_err(|e| SecretError::CryptoFault(format!("failed to generate key: {}", e)))?;
        Ok(Self(buff))
    }

    /// Get a reference to the key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Seal `data` with AES-256-GCM and no associated data.
    ///
    /// # Errors
    ///
    /// Only fails if the system RNG cannot produce a nonce.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes)
            .map_err(|e| SecretError::CryptoFault(format!("failed to generate nonce: {}", e)))?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0));
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), data)
            .map_err(|_| SecretError::CryptoFault("encrypt error".to_string()))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    /// Open data produced by [`ContentKey::encrypt`].
    ///
    /// The tag is checked before any plaintext is returned.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        if data.len() < NONCE_SIZE + TAG_SIZE {
            return Err(SecretError::AuthenticationFailed);
        }

        let (nonce, sealed) = data.split_at(NONCE_SIZE);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0));
        cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| SecretError::AuthenticationFailed)
    }
}

use super::secret::{ContentKey, SecretError};

/// Authenticated encryption over a [`ContentKey`]
///
/// The workflow goes through this seam rather than calling
/// [`ContentKey::encrypt`] directly so callers can wrap or instrument the engine.
pub trait Cipher: Send + Sync {
    fn encrypt(&self, key: &ContentKey, plaintext: &[u8]) -> Result<Vec<u8>, SecretError>;

    /// Must return [`SecretError::AuthenticationFailed`] for any input that
    /// does not authenticate under `key`, and no plaintext in that case.
    fn decrypt(&self, key: &ContentKey, ciphertext: &[u8]) -> Result<Vec<u8>, SecretError>;
}

/// AES-256-GCM with a random 96-bit nonce prefixed to the output
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmCipher;

impl Cipher for AesGcmCipher {
    fn encrypt(&self, key: &ContentKey, plaintext: &[u8]) -> Result<Vec<u8>, SecretError> {
        key.encrypt(plaintext)
    }

    fn decrypt(&self, key: &ContentKey, ciphertext: &[u8]) -> Result<Vec<u8>, SecretError> {
        key.decrypt(ciphertext)
    }
}

impl<C: Cipher + ?Sized> Cipher for &C {
    fn encrypt(&self, key: &ContentKey, plaintext: &[u8]) -> Result<Vec<u8>, SecretError> {
        (**self).encrypt(key, plaintext)
    }

    fn decrypt(&self, key: &ContentKey, ciphertext: &[u8]) -> Result<Vec<u8>, SecretError> {
        (**self).decrypt(key, ciphertext)
    }
}

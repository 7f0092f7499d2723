use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

/// Size of an Ed25519 secret seed in bytes
pub const PRIVATE_KEY_SIZE: usize = 32;
/// Size of the `seed || public` keypair encoding in bytes
pub const KEYPAIR_SIZE: usize = 64;
/// Size of an Ed25519 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;
/// Size of an Ed25519 signature in bytes
pub const SIGNATURE_SIZE: usize = 64;

/// Errors that can occur while decoding key material
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("invalid {kind} size, expected {expected}, got {got}")]
    InvalidSize {
        kind: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{0} is not valid base64")]
    Base64(&'static str),
    #[error("public key is not a valid ed25519 point")]
    InvalidPoint,
    #[error("keypair public half does not match its secret seed")]
    KeypairMismatch,
    #[error("system randomness unavailable: {0}")]
    Entropy(getrandom::Error),
}

/// Public key identifying the author of a paste
///
/// A thin wrapper around an Ed25519 verifying key. This is the only half of
/// the identity that is ever transmitted, always base64-encoded.
///
/// # Examples
///
/// ```ignore
/// let secret_key = SecretKey::generate()?;
/// let public_key = secret_key.public();
///
/// let b64 = public_key.to_base64();
/// let recovered = PublicKey::from_base64(&b64)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(VerifyingKey);

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; PUBLIC_KEY_SIZE] = bytes.try_into().map_err(|_| KeyError::InvalidSize {
            kind: "public key",
            expected: PUBLIC_KEY_SIZE,
            got: bytes.len(),
        })?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPoint)?;
        Ok(Self(key))
    }
}

impl PublicKey {
    /// Parse a public key from standard, padded base64
    pub fn from_base64(b64: &str) -> Result<Self, KeyError> {
        let bytes = STANDARD
            .decode(b64.trim())
            .map_err(|_| KeyError::Base64("public key"))?;
        Self::try_from(bytes.as_slice())
    }

    /// Convert public key to raw bytes
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }

    /// Encode the public key the way it travels over the wire
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Verify an Ed25519 signature over the exact message bytes.
    ///
    /// Uses strict verification, so small-order keys and
    /// non-canonical signatures are rejected rather than accepted.
    pub fn verify(&self, msg: &[u8], signature: &Signature) -> bool {
        self.0.verify_strict(msg, signature).is_ok()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// Secret key for identity and content signing
///
/// Keep this on the device. It is persisted by the credential store in its
/// 64-byte `seed || public` form and is never part of any request.
#[derive(Clone)]
pub struct SecretKey(SigningKey);

impl From<[u8; PRIVATE_KEY_SIZE]> for SecretKey {
    fn from(seed: [u8; PRIVATE_KEY_SIZE]) -> Self {
        Self(SigningKey::from_bytes(&seed))
    }
}

/// Accepts either a 32-byte seed or a 64-byte `seed || public` keypair.
/// The keypair form is checked for consistency.
impl TryFrom<&[u8]> for SecretKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        match bytes.len() {
            PRIVATE_KEY_SIZE => {
                let mut seed = [0u8; PRIVATE_KEY_SIZE];
                seed.copy_from_slice(bytes);
                Ok(Self::from(seed))
            }
            KEYPAIR_SIZE => {
                let mut keypair = [0u8; KEYPAIR_SIZE];
                keypair.copy_from_slice(bytes);
                SigningKey::from_keypair_bytes(&keypair)
                    .map(Self)
                    .map_err(|_| KeyError::KeypairMismatch)
            }
            got => Err(KeyError::InvalidSize {
                kind: "private key",
                expected: KEYPAIR_SIZE,
                got,
            }),
        }
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretKey")
            .field(&self.public().to_base64())
            .finish()
    }
}

impl SecretKey {
    /// Generate a new secret key from the OS random source
    pub fn generate() -> Result<Self, KeyError> {
        let mut seed = [0u8; PRIVATE_KEY_SIZE];
        getrandom::getrandom(&mut seed).map_err(KeyError::Entropy)?;
        Ok(Self::from(seed))
    }

    /// Parse a secret key from base64 (seed or keypair form)
    pub fn from_base64(b64: &str) -> Result<Self, KeyError> {
        let bytes = STANDARD
            .decode(b64.trim())
            .map_err(|_| KeyError::Base64("private key"))?;
        Self::try_from(bytes.as_slice())
    }

    /// Derive the public key from this secret key
    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// The 32-byte secret seed
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_SIZE] {
        self.0.to_bytes()
    }

    /// The 64-byte `seed || public` encoding used at rest
    pub fn to_keypair_bytes(&self) -> [u8; KEYPAIR_SIZE] {
        self.0.to_keypair_bytes()
    }

    pub fn to_keypair_base64(&self) -> String {
        STANDARD.encode(self.to_keypair_bytes())
    }

    /// Sign a message with this secret key using Ed25519.
    ///
    /// Deterministic: the same key and message always produce the same signature.
    pub fn sign(&self, msg: &[u8]) -> Signature {
        self.0.sign(msg)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let private_key = SecretKey::generate().unwrap();
        let public_key = private_key.public();

        let recovered_private = SecretKey::from_base64(&private_key.to_keypair_base64()).unwrap();
        assert_eq!(private_key.to_bytes(), recovered_private.to_bytes());

        let recovered_public = PublicKey::from_base64(&public_key.to_base64()).unwrap();
        assert_eq!(public_key, recovered_public);
    }

    #[test]
    fn test_seed_and_keypair_forms_agree() {
        let key = SecretKey::generate().unwrap();
        let from_seed = SecretKey::try_from(key.to_bytes().as_slice()).unwrap();
        let from_pair = SecretKey::try_from(key.to_keypair_bytes().as_slice()).unwrap();
        assert_eq!(from_seed.public(), from_pair.public());
    }

    #[test]
    fn test_keypair_with_foreign_public_half_is_rejected() {
        let key = SecretKey::generate().unwrap();
        let other = SecretKey::generate().unwrap();
        let mut pair = key.to_keypair_bytes();
        pair[PRIVATE_KEY_SIZE..].copy_from_slice(&other.public().to_bytes());

        assert!(matches!(
            SecretKey::try_from(pair.as_slice()),
            Err(KeyError::KeypairMismatch)
        ));
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(matches!(
            SecretKey::try_from([0u8; 16].as_slice()),
            Err(KeyError::InvalidSize { got: 16, .. })
        ));
        assert!(matches!(
            PublicKey::try_from([0u8; 31].as_slice()),
            Err(KeyError::InvalidSize { got: 31, .. })
        ));
        assert!(matches!(
            PublicKey::from_base64("not base64!"),
            Err(KeyError::Base64(_))
        ));
    }

    #[test]
    fn test_sign_and_verify() {
        let secret_key = SecretKey::generate().unwrap();
        let public_key = secret_key.public();
        let message = b"hello, world!";

        let signature = secret_key.sign(message);
        assert!(public_key.verify(message, &signature));

        // deterministic
        assert_eq!(signature, secret_key.sign(message));

        assert!(!public_key.verify(b"hello, world?", &signature));

        let other_key = SecretKey::generate().unwrap().public();
        assert!(!other_key.verify(message, &signature));
    }

    #[test]
    fn test_debug_does_not_leak_seed() {
        let key = SecretKey::from([7u8; PRIVATE_KEY_SIZE]);
        let debug = format!("{:?}", key);
        assert!(!debug.contains(&STANDARD.encode([7u8; PRIVATE_KEY_SIZE])));
        assert!(debug.contains(&key.public().to_base64()));
    }
}

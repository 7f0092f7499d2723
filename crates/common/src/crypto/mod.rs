//! Cryptographic primitives for DropKey
//!
//! - **Identity & Authentication**: Ed25519 keypairs. The secret half never
//!   leaves the device; the public half is sent base64-encoded.
//! - **Content Encryption**: every paste has its own AES-256-GCM
//!   [`ContentKey`], addressed by the paste's id in the key store.
//!
//! # Ciphertext format
//!
//! `nonce (12 bytes) || sealed payload || tag (16 bytes)`, no associated data.
//! Signatures are always computed over these exact bytes.

mod cipher;
mod keys;
mod secret;
pub mod signature;

pub use cipher::{AesGcmCipher, Cipher};
pub use ed25519_dalek::Signature;
pub use keys::{
    KeyError, PublicKey, SecretKey, KEYPAIR_SIZE, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE,
    SIGNATURE_SIZE,
};
pub use secret::{ContentKey, InvalidKeyLength, SecretError, KEY_SIZE, NONCE_SIZE, TAG_SIZE};

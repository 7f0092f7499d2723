//! Sign/verify over raw bytes
//!
//! Byte-level entry points for callers that hold keys and signatures as
//! plain buffers (decoded wire fields). Verification never errors: anything
//! malformed simply does not verify.

use super::keys::{PublicKey, SecretKey};
use ed25519_dalek::Signature;

pub fn sign(secret_key: &SecretKey, message: &[u8]) -> Signature {
    secret_key.sign(message)
}

/// Returns `false` for a wrong key, a wrong message, or inputs of the wrong length.
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let Ok(public_key) = PublicKey::try_from(public_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    public_key.verify(message, &signature)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_verify_raw_bytes() {
        let key = SecretKey::generate().unwrap();
        let public = key.public().to_bytes();
        let sig = sign(&key, b"ciphertext").to_bytes();

        assert!(verify(&public, b"ciphertext", &sig));
        assert!(!verify(&public, b"ciphertexT", &sig));
    }

    #[test]
    fn test_malformed_lengths_return_false() {
        let key = SecretKey::generate().unwrap();
        let public = key.public().to_bytes();
        let sig = sign(&key, b"m").to_bytes();

        assert!(!verify(&public[..31], b"m", &sig));
        assert!(!verify(&public, b"m", &sig[..63]));
        assert!(!verify(&[], b"m", &[]));
    }
}

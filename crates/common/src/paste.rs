use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::crypto::{PublicKey, Signature};

/// The plaintext sealed inside a paste's ciphertext
///
/// Serialized as `{"title": ..., "paste": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub title: String,
    #[serde(rename = "paste")]
    pub body: String,
}

impl Payload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// A fetched paste, decoded from transport form but not yet verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedContent {
    /// `nonce || sealed payload || tag`, exactly as signed
    pub ciphertext: Vec<u8>,
    pub signature: Signature,
    pub signer: PublicKey,
    pub expires_at: OffsetDateTime,
}

impl EncryptedContent {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

//! Records exchanged with the paste service, and the service interface
//!
//! Field names follow the service's JSON. Binary fields are standard
//! base64. Nothing here ever carries a secret key or a content key.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::crypto::{PublicKey, Signature};
use crate::paste::EncryptedContent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUserResponse {
    pub id: String,
}

/// Signed login challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    /// Account id
    pub id: String,
    /// Base64 signature over the raw (unencoded) challenge bytes
    pub signature: String,
    /// Base64 of the challenge text
    pub challenge: String,
    pub public_key: String,
}

impl AuthRequest {
    /// The challenge text as it was signed
    pub fn challenge_text(&self) -> Result<String, RecordError> {
        let bytes = decode("challenge", &self.challenge)?;
        String::from_utf8(bytes).map_err(|_| RecordError::Field("challenge"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
}

/// A sealed, signed paste ready to submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteRequest {
    pub ciphertext: String,
    pub signature: String,
    pub public_key: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePasteResponse {
    pub id: String,
    #[serde(default)]
    pub url: String,
}

/// A paste as the service returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteRecord {
    #[serde(rename = "ID", alias = "id")]
    pub id: String,
    pub ciphertext: String,
    pub signature: String,
    pub public_key: String,
    #[serde(rename = "expires_in", with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{0} is not valid base64")]
    Base64(&'static str),
    #[error("{0} is malformed")]
    Field(&'static str),
}

fn decode(field: &'static str, value: &str) -> Result<Vec<u8>, RecordError> {
    STANDARD
        .decode(value.trim())
        .map_err(|_| RecordError::Base64(field))
}

impl TryFrom<&PasteRecord> for EncryptedContent {
    type Error = RecordError;
    fn try_from(record: &PasteRecord) -> Result<Self, Self::Error> {
        let ciphertext = decode("ciphertext", &record.ciphertext)?;
        let signature = Signature::from_slice(&decode("signature", &record.signature)?)
            .map_err(|_| RecordError::Field("signature"))?;
        let signer = PublicKey::from_base64(&record.public_key)
            .map_err(|_| RecordError::Field("public_key"))?;

        Ok(Self {
            ciphertext,
            signature,
            signer,
            expires_at: record.expires_at,
        })
    }
}

/// The remote service that stores sealed pastes
///
/// Injected wherever a flow needs it; nothing in this crate holds a global
/// client.
#[async_trait]
pub trait PasteService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Submit a sealed paste. Returns the durable id the service assigned.
    async fn create_paste(
        &self,
        request: &PasteRequest,
        token: &str,
    ) -> Result<CreatePasteResponse, Self::Error>;
}

/**
 * Challenge-response login: a fresh timestamp
 *  challenge signed by the identity key.
 */
pub mod auth;
/**
 * Cryptographic types and operations.
 *  - Ed25519 identity keys and signatures
 *  - Per-paste AES-256-GCM content keys
 */
pub mod crypto;
/**
 * The user's long-lived identity and the
 *  credential store it is persisted through.
 */
pub mod identity;
/**
 * Durable id -> content key storage with
 *  pluggable backends (filesystem, memory).
 */
pub mod key_store;
/**
 * Plaintext and encrypted paste shapes.
 */
pub mod paste;
/**
 * Transport-neutral request/response records and
 *  the paste service collaborator interface.
 */
pub mod service;
/**
 * Orchestration of the seal/submit/reconcile
 *  and verify/decrypt/parse flows.
 */
pub mod workflow;

pub mod prelude {
    pub use crate::auth::{AuthChallengeBuilder, Clock, SystemClock};
    pub use crate::crypto::{AesGcmCipher, Cipher, ContentKey, PublicKey, SecretKey, Signature};
    pub use crate::identity::{
        CredentialStore, FileCredentialStore, Identity, IdentityError, IdentityManager,
    };
    pub use crate::key_store::{ContentKeyStore, FsKeyStore, KeyStoreError, MemoryKeyStore};
    pub use crate::paste::{EncryptedContent, Payload};
    pub use crate::service::{AuthRequest, PasteRequest, PasteService};
    pub use crate::workflow::{PasteCrypto, Published, RevealError};
}

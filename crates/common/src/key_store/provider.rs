use std::fmt::Debug;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// `insert_new` found a record already present under the id
    #[error("record already exists")]
    AlreadyExists,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("key store provider error: {0}")]
    Internal(String),
}

/// Raw storage behind a [`super::ContentKeyStore`]
///
/// Providers store opaque encoded records by id and know nothing about
/// keys. Ids have already been validated by the store (ASCII alphanumerics,
/// `-` and `_`) before any provider method is called.
///
/// Callers are expected to serialize mutations of any one id; providers only
/// need to stay memory safe under concurrent use, not linearizable per id.
pub trait KeyStoreProvider: Send + Sync + Debug {
    /// Read the record stored under `id`, `None` if there is none
    fn load(&self, id: &str) -> Result<Option<Vec<u8>>, ProviderError>;

    /// Store a record under an id that must not exist yet.
    ///
    /// Should fail with the following errors to be considered correct:
    /// * `Err(ProviderError::AlreadyExists)` - a record is already stored under `id`
    ///
    /// When this returns `Ok` the record must be readable under `id` and its
    /// contents synced to storage.
    fn insert_new(&self, id: &str, record: &[u8]) -> Result<(), ProviderError>;

    /// Remove the record under `id`. Removing a missing record is not an error.
    fn remove(&self, id: &str) -> Result<(), ProviderError>;

    /// All ids with a stored record, sorted
    fn ids(&self) -> Result<Vec<String>, ProviderError>;
}

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::provider::{KeyStoreProvider, ProviderError};

/// In-memory key store provider
///
/// Clones share the same map, which lets tests keep a handle on the
/// records a workflow is writing.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyStore {
    inner: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<E: std::fmt::Display>(e: E) -> ProviderError {
        ProviderError::Internal(format!("memory key store lock poisoned: {}", e))
    }
}

impl KeyStoreProvider for MemoryKeyStore {
    fn load(&self, id: &str) -> Result<Option<Vec<u8>>, ProviderError> {
        let inner = self.inner.read().map_err(Self::poisoned)?;
        Ok(inner.get(id).cloned())
    }

    fn insert_new(&self, id: &str, record: &[u8]) -> Result<(), ProviderError> {
        let mut inner = self.inner.write().map_err(Self::poisoned)?;
        if inner.contains_key(id) {
            return Err(ProviderError::AlreadyExists);
        }
        inner.insert(id.to_string(), record.to_vec());
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<(), ProviderError> {
        let mut inner = self.inner.write().map_err(Self::poisoned)?;
        inner.remove(id);
        Ok(())
    }

    fn ids(&self) -> Result<Vec<String>, ProviderError> {
        let inner = self.inner.read().map_err(Self::poisoned)?;
        Ok(inner.keys().cloned().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_insert_new_refuses_overwrite() {
        let store = MemoryKeyStore::new();
        store.insert_new("a", b"one").unwrap();
        assert!(matches!(
            store.insert_new("a", b"two"),
            Err(ProviderError::AlreadyExists)
        ));
        assert_eq!(store.load("a").unwrap(), Some(b"one".to_vec()));
    }

    #[test]
    fn test_clones_share_records() {
        let store = MemoryKeyStore::new();
        let handle = store.clone();
        store.insert_new("b", b"x").unwrap();
        store.insert_new("a", b"y").unwrap();
        assert_eq!(
            handle.ids().unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );

        handle.remove("a").unwrap();
        handle.remove("a").unwrap();
        assert_eq!(store.load("a").unwrap(), None);
    }
}

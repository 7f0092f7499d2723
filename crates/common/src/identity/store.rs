use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// The identity as it sits at rest
///
/// Field names match the `config.json` earlier DropKey clients wrote, so an
/// existing registration file can be copied over as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Base64 of the 32-byte Ed25519 public key
    pub public_key: String,
    /// Base64 of the 64-byte `seed || public` keypair (32-byte seeds are accepted on load)
    pub private_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed credential record: {0}")]
    Malformed(String),
}

/// Where the identity is persisted
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` means nothing has been saved yet
    fn load_identity(&self) -> Result<Option<IdentityRecord>, CredentialStoreError>;

    fn save_identity(&self, record: &IdentityRecord) -> Result<(), CredentialStoreError>;
}

/// JSON file credential store
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load_identity(&self) -> Result<Option<IdentityRecord>, CredentialStoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(CredentialStoreError::Malformed("credential file is empty".to_string()));
        }

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| CredentialStoreError::Malformed(e.to_string()))
    }

    fn save_identity(&self, record: &IdentityRecord) -> Result<(), CredentialStoreError> {
        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| CredentialStoreError::Malformed(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // A leftover temp file may carry looser permissions than the mode below
        let tmp = self.path.with_extension("json.tmp");
        match fs::remove_file(&tmp) {
            Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&tmp)?;
        file.write_all(&json)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory credential store for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    record: Arc<RwLock<Option<IdentityRecord>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: IdentityRecord) -> Self {
        Self {
            record: Arc::new(RwLock::new(Some(record))),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load_identity(&self) -> Result<Option<IdentityRecord>, CredentialStoreError> {
        let record = self
            .record
            .read()
            .map_err(|e| CredentialStoreError::Malformed(e.to_string()))?;
        Ok(record.clone())
    }

    fn save_identity(&self, record: &IdentityRecord) -> Result<(), CredentialStoreError> {
        let mut slot = self
            .record
            .write()
            .map_err(|e| CredentialStoreError::Malformed(e.to_string()))?;
        *slot = Some(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    fn record() -> IdentityRecord {
        IdentityRecord {
            user_id: Some("user-1".to_string()),
            public_key: "cHVi".to_string(),
            private_key: "cHJpdg==".to_string(),
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("nested").join("identity.json"));

        assert_eq!(store.load_identity().unwrap(), None);
        store.save_identity(&record()).unwrap();
        assert_eq!(store.load_identity().unwrap(), Some(record()));
    }

    #[test]
    fn test_file_store_reads_legacy_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"user_id": "abc", "public_key": "cHVi", "private_key": "cHJpdg=="}"#,
        )
        .unwrap();

        let loaded = FileCredentialStore::new(path)
            .load_identity()
            .unwrap()
            .unwrap();
        assert_eq!(loaded.user_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_file_store_empty_and_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("identity.json");
        let store = FileCredentialStore::new(&path);

        fs::write(&path, "\n").unwrap();
        assert!(matches!(
            store.load_identity(),
            Err(CredentialStoreError::Malformed(_))
        ));

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            store.load_identity(),
            Err(CredentialStoreError::Malformed(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("identity.json"));
        store.save_identity(&record()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_stale_temp_file_does_not_widen_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("identity.json"));
        let stale = temp_dir.path().join("identity.json.tmp");
        fs::write(&stale, "left over from a crashed save").unwrap();
        fs::set_permissions(&stale, fs::Permissions::from_mode(0o644)).unwrap();

        store.save_identity(&record()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert!(!stale.exists());
        assert_eq!(store.load_identity().unwrap(), Some(record()));
    }
}

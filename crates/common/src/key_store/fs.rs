use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::provider::{KeyStoreProvider, ProviderError};

const KEY_FILE_EXTENSION: &str = "key";

/// One file per key under a directory chosen by the caller
///
/// Layout: `<dir>/<id>.key`, containing the base64 record. The directory is
/// created `0700` and key files `0600` on unix.
///
/// New records are written to a hidden temp file, synced, then hard-linked
/// into place. The link fails if the target exists, which gives
/// `insert_new` its no-overwrite guarantee, and a crash mid-write never
/// leaves a truncated file under the final name.
#[derive(Debug, Clone)]
pub struct FsKeyStore {
    dir: PathBuf,
}

impl FsKeyStore {
    /// Open (and create if needed) a key directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ProviderError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o700))?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding the record for `id`
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, KEY_FILE_EXTENSION))
    }

    fn create_private(path: &Path) -> std::io::Result<File> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options.open(path)
    }

    fn sync_dir(&self) -> std::io::Result<()> {
        #[cfg(unix)]
        File::open(&self.dir)?.sync_all()?;
        Ok(())
    }
}

impl KeyStoreProvider for FsKeyStore {
    fn load(&self, id: &str) -> Result<Option<Vec<u8>>, ProviderError> {
        match fs::read(self.path_for(id)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_new(&self, id: &str, record: &[u8]) -> Result<(), ProviderError> {
        let target = self.path_for(id);
        if target.exists() {
            return Err(ProviderError::AlreadyExists);
        }

        let tmp = self.dir.join(format!(".{}.{}.tmp", id, Uuid::new_v4()));
        let written = Self::create_private(&tmp).and_then(|mut file| {
            file.write_all(record)?;
            file.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        let linked = fs::hard_link(&tmp, &target);
        if let Err(e) = fs::remove_file(&tmp) {
            tracing::warn!("failed to remove temp key file {}: {}", tmp.display(), e);
        }

        settle_link(id, linked, || self.sync_dir())
    }

    fn remove(&self, id: &str) -> Result<(), ProviderError> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn ids(&self) -> Result<Vec<String>, ProviderError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(KEY_FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if !stem.starts_with('.') {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Once the link succeeded the record is stored under its final name with
/// synced contents. A failed directory sync after that is only logged.
fn settle_link(
    id: &str,
    linked: std::io::Result<()>,
    sync_dir: impl FnOnce() -> std::io::Result<()>,
) -> Result<(), ProviderError> {
    match linked {
        Ok(()) => {
            if let Err(e) = sync_dir() {
                tracing::warn!(id, "key record stored but directory sync failed: {}", e);
            }
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(ProviderError::AlreadyExists),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_insert_load_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsKeyStore::open(temp_dir.path().join("keys")).unwrap();

        assert_eq!(store.load("42").unwrap(), None);
        store.insert_new("42", b"record").unwrap();
        assert_eq!(store.load("42").unwrap(), Some(b"record".to_vec()));
        assert_eq!(fs::read(store.path_for("42")).unwrap(), b"record");

        store.remove("42").unwrap();
        store.remove("42").unwrap();
        assert_eq!(store.load("42").unwrap(), None);
    }

    #[test]
    fn test_insert_new_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsKeyStore::open(temp_dir.path()).unwrap();

        store.insert_new("tmp-1", b"first").unwrap();
        assert!(matches!(
            store.insert_new("tmp-1", b"second"),
            Err(ProviderError::AlreadyExists)
        ));
        assert_eq!(store.load("tmp-1").unwrap(), Some(b"first".to_vec()));
    }

    #[test]
    fn test_ids_skip_temp_and_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsKeyStore::open(temp_dir.path()).unwrap();

        store.insert_new("b", b"x").unwrap();
        store.insert_new("a", b"y").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "hi").unwrap();
        fs::write(temp_dir.path().join(".c.key"), "hidden").unwrap();

        assert_eq!(store.ids().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("keys");
        let store = FsKeyStore::open(&dir).unwrap();
        store.insert_new("k", b"x").unwrap();

        let dir_mode = fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        let file = store.path_for("k");
        let file_mode = fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700);
        assert_eq!(file_mode, 0o600);
    }

    #[test]
    fn test_directory_sync_failure_after_link_still_stores() {
        let failing_sync = || Err(std::io::Error::other("EIO"));
        assert!(settle_link("42", Ok(()), failing_sync).is_ok());

        let taken = Err(std::io::Error::from(ErrorKind::AlreadyExists));
        assert!(matches!(
            settle_link("42", taken, || Ok(())),
            Err(ProviderError::AlreadyExists)
        ));
    }
}

use std::str::FromStr;
use std::time::Duration;
use std::{fs, path::PathBuf};

use common::identity::{FileCredentialStore, Identity, IdentityError, IdentityManager};
use common::key_store::{ContentKeyStore, FsKeyStore, ProviderError};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use url::Url;

pub const APP_NAME: &str = "dropkey";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const IDENTITY_FILE_NAME: &str = "identity.json";
pub const KEYS_DIR_NAME: &str = "keys";

pub const DEFAULT_REMOTE: &str = "http://localhost:8081";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base url of the paste service
    #[serde(default = "default_remote")]
    pub remote: Url,
    /// Default log level, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Per-request timeout when talking to the service
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

pub fn default_remote() -> Url {
    Url::parse(DEFAULT_REMOTE).expect("hardcoded URL must parse")
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_request_timeout_secs() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> Result<LevelFilter, StateError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| StateError::InvalidLogLevel(self.log_level.clone()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the dropkey directory (~/.dropkey)
    pub dropkey_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Path to the stored identity
    pub identity_path: PathBuf,
    /// Directory holding one file per content key
    pub keys_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the dropkey directory path (custom or default ~/.dropkey)
    pub fn dropkey_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new dropkey state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let dropkey_dir = Self::dropkey_dir(custom_path)?;

        if dropkey_dir.join(CONFIG_FILE_NAME).exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&dropkey_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dropkey_dir, fs::Permissions::from_mode(0o700))?;
        }

        let keys_path = dropkey_dir.join(KEYS_DIR_NAME);
        FsKeyStore::open(&keys_path)?;

        let config = config.unwrap_or_default();
        config.log_level()?;
        let config_path = dropkey_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        Ok(Self {
            identity_path: dropkey_dir.join(IDENTITY_FILE_NAME),
            dropkey_dir,
            config_path,
            keys_path,
            config,
        })
    }

    /// Load existing state from the dropkey directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let dropkey_dir = Self::dropkey_dir(custom_path)?;

        let config_path = dropkey_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::NotInitialized);
        }

        let keys_path = dropkey_dir.join(KEYS_DIR_NAME);
        if !keys_path.is_dir() {
            return Err(StateError::MissingFile(format!("{}/", KEYS_DIR_NAME)));
        }

        let config: AppConfig = toml::from_str(&fs::read_to_string(&config_path)?)?;

        Ok(Self {
            identity_path: dropkey_dir.join(IDENTITY_FILE_NAME),
            dropkey_dir,
            config_path,
            keys_path,
            config,
        })
    }

    pub fn identity_manager(&self) -> IdentityManager<FileCredentialStore> {
        IdentityManager::new(FileCredentialStore::new(&self.identity_path))
    }

    /// Load the registered identity
    pub fn load_identity(&self) -> Result<Identity, StateError> {
        Ok(self.identity_manager().load()?)
    }

    pub fn key_store(&self) -> Result<ContentKeyStore<FsKeyStore>, StateError> {
        Ok(ContentKeyStore::new(FsKeyStore::open(&self.keys_path)?))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("dropkey directory not initialized. Run 'dropkey init' first")]
    NotInitialized,

    #[error("dropkey directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid log level {0:?}")]
    InvalidLogLevel(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("key store error: {0}")]
    KeyStore(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

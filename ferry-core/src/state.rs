//! Persisted client state
//!
//! The console keeps its session in a flat string key-value store: the
//! control-plane login, the object-storage connection settings and the
//! `authenticated` flag the router guard consults. Stores are shared
//! between the facade and the views, so they use interior mutability.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

/// Keys used in the persisted state
pub mod keys {
    pub const USER: &str = "user";
    pub const PASSWORD: &str = "password";
    pub const ENDPOINT: &str = "endpoint";
    pub const PORT: &str = "port";
    pub const USE_SSL: &str = "useSSL";
    pub const ACCESS_KEY: &str = "accessKey";
    pub const SECRET_KEY: &str = "secretKey";
    pub const AUTHENTICATED: &str = "authenticated";
}

/// Value of the `authenticated` key once a login has been accepted
pub const AUTHENTICATED_FLAG: &str = "true";

/// Errors raised while reading or writing the persisted state
#[derive(Debug, Error)]
pub enum StateError {
    #[error("missing state key '{0}'")]
    MissingKey(&'static str),

    #[error("invalid value for state key '{key}': {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("state file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key-value store holding the console session
pub trait StateStore: Send + Sync {
    /// Returns the value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StateError>;

    /// Removes `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), StateError>;
}

/// Whether the store carries the flag set by a successful login
pub fn is_authenticated(store: &dyn StateStore) -> bool {
    store.get(keys::AUTHENTICATED).as_deref() == Some(AUTHENTICATED_FLAG)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// In-memory store
// =============================================================================

/// Store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StateError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

// =============================================================================
// File-backed store
// =============================================================================

/// Store persisted as a JSON object on disk
///
/// The whole file is rewritten after every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StateError> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// `<config dir>/ferry/state.json`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ferry").join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StateError> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Object-storage connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct StorageCredentials {
    pub endpoint: String,
    pub port: u16,
    pub use_ssl: bool,
    pub access_key: String,
    pub secret_key: String,
}

impl StorageCredentials {
    /// Endpoint URL the storage client talks to
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.endpoint, self.port)
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("endpoint", &self.endpoint)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

/// Everything the facade needs to reach the control plane and the object store
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub storage: StorageCredentials,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .field("storage", &self.storage)
            .finish()
    }
}

impl Credentials {
    /// Reads the credentials from the persisted state
    ///
    /// Values are not validated beyond being present; `useSSL` defaults to
    /// true when absent.
    pub fn load(store: &dyn StateStore) -> Result<Self, StateError> {
        let required = |key: &'static str| store.get(key).ok_or(StateError::MissingKey(key));

        let port_raw = required(keys::PORT)?;
        let port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|_| StateError::InvalidValue {
                key: keys::PORT,
                value: port_raw.clone(),
            })?;

        let use_ssl = match store.get(keys::USE_SSL) {
            None => true,
            Some(raw) => match raw.trim() {
                "true" => true,
                "false" => false,
                _ => {
                    return Err(StateError::InvalidValue {
                        key: keys::USE_SSL,
                        value: raw,
                    });
                }
            },
        };

        Ok(Self {
            user: required(keys::USER)?,
            password: required(keys::PASSWORD)?,
            storage: StorageCredentials {
                endpoint: required(keys::ENDPOINT)?,
                port,
                use_ssl,
                access_key: required(keys::ACCESS_KEY)?,
                secret_key: required(keys::SECRET_KEY)?,
            },
        })
    }

    /// Writes the credentials into the persisted state
    pub fn save(&self, store: &dyn StateStore) -> Result<(), StateError> {
        store.set(keys::USER, &self.user)?;
        store.set(keys::PASSWORD, &self.password)?;
        store.set(keys::ENDPOINT, &self.storage.endpoint)?;
        store.set(keys::PORT, &self.storage.port.to_string())?;
        store.set(keys::USE_SSL, if self.storage.use_ssl { "true" } else { "false" })?;
        store.set(keys::ACCESS_KEY, &self.storage.access_key)?;
        store.set(keys::SECRET_KEY, &self.storage.secret_key)?;
        Ok(())
    }
}

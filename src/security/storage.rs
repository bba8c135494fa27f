use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

/// Durable key/value storage for session fields.
pub trait CredentialStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Write several keys at once. Either all of them land or none do.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Unavailable(String),
}

/// JSON-object file holding one string per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.essay-judge/session.json`
    pub fn default_location() -> Result<Self, StorageError> {
        let home = dirs::home_dir()
            .ok_or_else(|| StorageError::Unavailable("cannot find home directory".into()))?;
        Ok(Self::new(home.join(".essay-judge").join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path).map_err(|e| StorageError::Io(e.to_string()))?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
            }
        }
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| StorageError::Io(e.to_string()))?;

        // The file carries a bearer token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = std::fs::set_permissions(&self.path, perms) {
                warn!(path = %self.path.display(), error = %e, "could not restrict session file permissions");
            }
        }

        debug!(path = %self.path.display(), keys = entries.len(), "session file written");
        Ok(())
    }
}

impl CredentialStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut stored = self.load()?;
        for (key, value) in entries {
            stored.insert(key.to_string(), value.to_string());
        }
        self.save(&stored)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// Process-local storage; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.entries.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        }
    }
}

impl CredentialStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut stored = self.entries();
        for (key, value) in entries {
            stored.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

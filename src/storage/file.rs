//! File-backed store
//!
//! Persists override slots as a flat JSON object on disk

use super::Storage;
use crate::utils::error::AppResult;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// Environment variable overriding the store location
pub const STORAGE_PATH_ENV: &str = "QUOTA_MANAGER_STORAGE";

/// JSON file store
///
/// The whole file is loaded at open and rewritten on every mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open a store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();

        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store file: {:?}", path))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse store file: {:?}", path))?
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened store {:?} with {} entries", path, entries.len());

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Open the store at its default location
    ///
    /// Uses `QUOTA_MANAGER_STORAGE` when set, otherwise
    /// `~/.config/quota-manager/storage.json`, falling back to `./storage.json`
    /// when no home directory can be determined.
    pub fn open_default() -> AppResult<Self> {
        Self::open(Self::default_path())
    }

    /// Default store location
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(STORAGE_PATH_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        match dirs::home_dir() {
            Some(home) => home.join(".config").join("quota-manager").join("storage.json"),
            None => PathBuf::from("storage.json"),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!("Persisted {} entries to {:?}", entries.len(), self.path);
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());

        // Memory only changes once the file has been written
        self.persist(&updated)?;
        *entries = updated;
        info!("Stored value for key '{}'", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(key) {
            return Ok(());
        }

        let mut updated = entries.clone();
        updated.remove(key);
        self.persist(&updated)?;
        *entries = updated;
        info!("Removed key '{}'", key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path().join("nested").join("store.json")).unwrap();
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn test_open_existing_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"api_base_url": "http://quota.internal:8099", "token": "t-1"}"#)
            .unwrap();

        let storage = FileStorage::open(file.path()).unwrap();
        assert_eq!(storage.get("api_base_url"), Some("http://quota.internal:8099".to_string()));
        assert_eq!(storage.get("token"), Some("t-1".to_string()));
    }

    #[test]
    fn test_open_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();

        let result = FileStorage::open(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_set_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set("app_page_size", "25").unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("app_page_size"), Some("25".to_string()));

        reopened.remove("app_page_size").unwrap();
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("app_page_size"), None);
    }

    #[test]
    fn test_failed_write_leaves_entries_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let storage = FileStorage::open(&path).unwrap();
        storage.set("token", "old").unwrap();

        // Parent is a regular file, so every write fails
        let blocker = NamedTempFile::new().unwrap();
        let storage = FileStorage {
            path: blocker.path().join("store.json"),
            entries: RwLock::new(storage.entries.into_inner().unwrap()),
        };

        assert!(storage.set("token", "new").is_err());
        assert_eq!(storage.get("token"), Some("old".to_string()));

        assert!(storage.remove("token").is_err());
        assert_eq!(storage.get("token"), Some("old".to_string()));
    }
}

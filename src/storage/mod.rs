//! Persisted key/value store
//!
//! String-keyed override slots read by the configuration resolver and the
//! HTTP client (API endpoint overrides, page size, auth token, ...).

pub mod file;

use crate::utils::error::AppResult;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{PoisonError, RwLock};

pub use file::FileStorage;

/// String-keyed persisted store
pub trait Storage: Send + Sync + Debug {
    /// Read a value; `None` when the key is absent
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a value; removing an absent key is not an error
    fn remove(&self, key: &str) -> AppResult<()>;

    /// All keys currently stored, sorted
    fn keys(&self) -> Vec<String>;
}

/// In-memory store, used for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

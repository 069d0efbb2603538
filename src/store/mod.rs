//! Configuration store
//!
//! The signing record is kept in an external key-value store and read once
//! per request. This module defines the store trait and two backends:
//! - `FileStore`: one file per key in a directory (`<key>.json` or `<key>`)
//! - `MemoryStore`: an in-process map, used for inline records and tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::{Config, SigningConfig, StoreKind};
use crate::error::{ConfigError, RewriteError, StoreError};

/// Read-only key-value store holding configuration records
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Get the raw value stored under `key`
    /// Returns None if the key does not exist
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}

/// Fetch and parse the signing record stored under `key`
///
/// A missing key, a store failure and an unparseable record all map to
/// [`RewriteError::ConfigUnavailable`].
pub async fn fetch_signing_config(
    store: &dyn ConfigStore,
    key: &str,
) -> Result<SigningConfig, RewriteError> {
    let raw = store
        .get(key)
        .await
        .map_err(|e| RewriteError::config_unavailable(e.to_string()))?
        .ok_or_else(|| RewriteError::config_unavailable(format!("no record under '{}'", key)))?;

    SigningConfig::from_json(&raw)
        .map_err(|e| RewriteError::config_unavailable(format!("invalid record: {}", e)))
}

/// Build the store described by the process configuration
pub fn from_config(config: &Config) -> Result<Box<dyn ConfigStore>, ConfigError> {
    match config.store.kind {
        StoreKind::File => {
            let path = config
                .store
                .path
                .as_deref()
                .ok_or_else(|| ConfigError::Invalid("store.path is required".to_string()))?;
            Ok(Box::new(FileStore::new(path)))
        }
        StoreKind::Memory => {
            let record = config
                .store
                .record
                .as_ref()
                .ok_or_else(|| ConfigError::Invalid("store.record is required".to_string()))?;
            let json = serde_json::to_string(record)
                .map_err(|e| ConfigError::Invalid(format!("store.record: {}", e)))?;
            Ok(Box::new(
                MemoryStore::new().with_entry(config.store.config_key.clone(), json),
            ))
        }
    }
}

/// Directory-backed store
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn candidates(&self, key: &str) -> [PathBuf; 2] {
        [
            self.root.join(format!("{}.json", key)),
            self.root.join(key),
        ]
    }
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StoreError::Unavailable(format!("invalid key '{}'", key)));
        }

        for path in self.candidates(key) {
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => return Ok(Some(contents)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(None)
    }
}

/// In-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }
}

// SPDX-License-Identifier: AGPL-3.0
// Rentboard Core - Durable key-value storage
//
// The core only needs get/set of small JSON blobs. Frontends pick the medium:
// a JSON file per key in the config directory, or memory for ephemeral runs.

use crate::types::AppError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Get/set access to durable local storage
pub trait SessionStorage: Send + Sync {
    /// Read the raw value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Replace the value stored under `key`. Must be durable when it returns.
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// File-based storage: one `<key>.json` file per key
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    /// Storage rooted at the platform config directory
    pub fn new() -> Result<Self, AppError> {
        let dir = config_dir()?;
        tracing::info!("Session storage directory: {:?}", dir);
        Ok(Self { dir })
    }

    /// Storage rooted at an explicit directory, created if missing
    pub fn in_dir(dir: impl AsRef<Path>) -> Result<Self, AppError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::FileIo(format!("Failed to create storage dir: {}", e)))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| AppError::PersistenceRead(format!("Failed to read {}: {}", key, e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        fs::write(self.path_for(key), value)
            .map_err(|e| AppError::FileIo(format!("Failed to write {}: {}", key, e)))
    }
}

/// In-memory storage for tests and runs that should leave no trace
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a single entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        storage
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The platform config directory for Rentboard, created if missing
pub(crate) fn config_dir() -> Result<PathBuf, AppError> {
    let config_dir = directories::ProjectDirs::from("by", "rentboard", "rentboard")
        .ok_or_else(|| AppError::FileIo("Could not determine config directory".to_string()))?
        .config_dir()
        .to_path_buf();

    // Ensure the directory exists
    fs::create_dir_all(&config_dir)
        .map_err(|e| AppError::FileIo(format!("Failed to create config dir: {}", e)))?;

    Ok(config_dir)
}

// SPDX-License-Identifier: AGPL-3.0
// Rentboard Core - Settings persistence
//
// Settings are stored in a local JSON file next to the session state.

use crate::storage::config_dir;
use crate::types::{AppError, BrowserSettings};
use std::fs;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

/// In-memory cache of settings, persisted to disk on changes
pub struct SettingsStore {
    settings: RwLock<BrowserSettings>,
    file_path: PathBuf,
}

impl SettingsStore {
    /// Create a new settings store, loading from the config directory if available
    pub fn new() -> Result<Self, AppError> {
        Self::at(config_dir()?.join("settings.json"))
    }

    /// Create a settings store backed by an explicit file
    pub fn at(file_path: PathBuf) -> Result<Self, AppError> {
        tracing::info!("Settings file path: {:?}", file_path);

        let settings = if file_path.exists() {
            tracing::info!("Loading settings from disk");
            let content = fs::read_to_string(&file_path)
                .map_err(|e| AppError::FileIo(format!("Failed to read settings: {}", e)))?;

            serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse settings, using defaults: {}", e);
                BrowserSettings::default()
            })
        } else {
            tracing::info!("No settings file found, using defaults");
            BrowserSettings::default()
        };

        let store = Self {
            settings: RwLock::new(settings),
            file_path,
        };

        // Persist default settings if file doesn't exist
        if !store.file_path.exists() {
            tracing::info!("Creating initial settings file");
            store.persist()?;
        }

        Ok(store)
    }

    /// Persist settings to disk
    fn persist(&self) -> Result<(), AppError> {
        let settings = self.settings.read().unwrap_or_else(PoisonError::into_inner);

        let content = serde_json::to_string_pretty(&*settings)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize settings: {}", e)))?;

        fs::write(&self.file_path, content)
            .map_err(|e| AppError::FileIo(format!("Failed to write settings: {}", e)))?;

        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> BrowserSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validate, replace and persist the settings
    pub fn update(&self, new_settings: BrowserSettings) -> Result<(), AppError> {
        new_settings.validate()?;

        tracing::info!(
            "Updating settings, api: {}, page size: {}, user: {:?}",
            new_settings.api_base_url,
            new_settings.page_size,
            new_settings.user_id
        );
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = new_settings;

        self.persist().map_err(|e| {
            tracing::error!("Failed to persist settings: {}", e);
            e
        })
    }

    /// Change a single key and persist, returning the new settings.
    ///
    /// Nothing changes when the value does not parse or validate.
    pub fn set(&self, key: &str, value: &str) -> Result<BrowserSettings, AppError> {
        let mut settings = self.get();
        settings.set(key, value)?;
        self.update(settings.clone())?;
        Ok(settings)
    }
}
